pub mod assistants;
pub mod cache;
pub mod chat;
pub mod cli;
pub mod config;
pub mod dns;
pub mod error;
pub mod files;
pub mod hackernews;
pub mod llm;
pub mod pipeline;
pub mod pubmed;
pub mod resume;
pub mod scanner;
pub mod session;
pub mod shell;
pub mod workflow;
pub mod youtube;

// Re-export commonly used types
pub use config::Config;
pub use error::{AgentError, Result};
pub use llm::{LLMClient, ModelGateway, Toolset};
pub use pipeline::{IdeaPipeline, IdeaState};
