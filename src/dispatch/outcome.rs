use std::time::Duration;

use reqwest::Method;
use tracing::{Level, event};

#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub method: Method,
    pub path: String,
    pub attempts: u8,
    pub refreshed: bool,
    pub success: bool,
    pub elapsed: Duration,
}

impl RequestOutcome {
    pub fn log(&self) {
        event!(
            Level::DEBUG,
            method = %self.method,
            path = %self.path,
            attempts = self.attempts,
            refreshed = self.refreshed,
            success = self.success,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "request.outcome"
        );
    }
}
