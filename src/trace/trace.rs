use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub stage: String,

    pub field_index: Option<usize>,
    pub strategy: Option<String>,

    pub count: Option<usize>,
    pub detail: Option<String>,
}

impl TraceEvent {
    pub fn now(stage: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_millis(),
            stage: stage.to_string(),
            field_index: None,
            strategy: None,
            count: None,
            detail: None,
        }
    }

    pub fn with_field(mut self, index: usize) -> Self {
        self.field_index = Some(index);
        self
    }

    pub fn with_strategy(mut self, strategy: impl ToString) -> Self {
        self.strategy = Some(strategy.to_string());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}
