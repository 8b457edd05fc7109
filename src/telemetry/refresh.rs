use jiff::Timestamp;
use tracing::{Level, event};
use uuid::Uuid;

use crate::errors::Error;
use crate::token::TokenResponse;

/// Structured events for one token refresh, correlated by `attempt_id`.
#[derive(Clone, Debug)]
pub struct RefreshTelemetry {
    attempt_id: Uuid,
    context: String,
    started_at: Timestamp,
}

impl RefreshTelemetry {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            context: context.into(),
            started_at: Timestamp::now(),
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn emit_start(&self, ttl: i64) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = %self.started_at,
            ttl,
            "refresh.start"
        );
    }

    pub fn emit_success(&self, token: &TokenResponse) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            elapsed_ms = self.elapsed_ms(),
            expires_in = token.expires_in,
            application = %token.application,
            token_len = token.access_token.len(),
            "refresh.success"
        );
    }

    pub fn emit_failure(&self, error: &Error) {
        event!(
            Level::ERROR,
            attempt_id = %self.attempt_id,
            context = %self.context,
            elapsed_ms = self.elapsed_ms(),
            error = %error,
            "refresh.failure"
        );
    }

    fn elapsed_ms(&self) -> i64 {
        Timestamp::now()
            .duration_since(self.started_at)
            .as_millis() as i64
    }
}
