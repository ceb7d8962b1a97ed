use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Single-use OAuth `state` values with an expiry. Process-local; several
/// instances behind a load balancer need a shared store instead.
#[derive(Clone)]
pub struct OAuthStateStore {
    ttl: Duration,
    states: Arc<RwLock<HashMap<String, Instant>>>,
}

impl OAuthStateStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            states: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Mint a fresh state, dropping any that have expired
    pub async fn issue(&self) -> String {
        let state = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let mut states = self.states.write().await;

        let before = states.len();
        states.retain(|_, issued| issued.elapsed() < self.ttl);
        if states.len() < before {
            debug!("Purged {} expired OAuth states", before - states.len());
        }

        states.insert(state.clone(), Instant::now());
        state
    }

    /// True once per issued, unexpired state
    pub async fn consume(&self, state: &str) -> bool {
        let mut states = self.states.write().await;
        match states.remove(state) {
            Some(issued) => issued.elapsed() < self.ttl,
            None => false,
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }
}
