use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub mod domain;
pub mod files;
pub mod hackernews;
pub mod pubmed;
pub mod shell;
pub mod time;
pub mod web_search;

/// 一次Agent运行中带副作用的工具调用计数，各工具克隆共享同一个计数器
#[derive(Debug, Clone, Default)]
pub struct ToolActivity(Arc<AtomicUsize>);

impl ToolActivity {
    pub fn record(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_idle(&self) -> bool {
        self.count() == 0
    }
}
