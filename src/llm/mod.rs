pub mod client;
pub mod gateway;
pub mod tools;

pub use client::LLMClient;
pub use gateway::{ModelGateway, Toolset};
