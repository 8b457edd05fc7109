use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

/// Deduplicates concurrent executions of the same keyed operation.
///
/// The first caller for a key becomes the leader and runs its operation; callers
/// arriving while it runs wait for, and receive a clone of, the leader's output.
/// The entry is dropped once the operation completes, so the next caller for that
/// key starts a fresh execution.
///
/// If the leader is cancelled before finishing, one of the waiting callers runs its
/// own operation instead; at no point do two operations for one key run at once.
pub struct SingleFlight<T> {
    calls: Mutex<HashMap<String, Arc<OnceCell<T>>>>,
}

impl<T: Clone> SingleFlight<T> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub async fn run<F, Fut>(&self, key: &str, op: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let call = {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            let entry = calls
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()));
            // A finished call may linger until its leader removes it; never join one.
            if entry.initialized() {
                *entry = Arc::new(OnceCell::new());
            }
            Arc::clone(entry)
        };

        let output = call.get_or_init(op).await.clone();

        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        if calls
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, &call))
        {
            calls.remove(key);
        }
        output
    }

    /// Number of keys with an operation currently registered.
    pub fn in_flight(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<T: Clone> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}
