//! Periodic eviction of expired challenges and sessions.
//!
//! The sweeper shares the store mutexes with the request paths, so it can
//! never race a consume or validate into a double-free. It is purely a
//! memory bound: expiry is independently re-checked at read time, so a
//! missed or delayed sweep cannot cause incorrect acceptance.

use crate::nonce_store::NonceStore;
use crate::session_store::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use vigil_types::Timestamp;

/// Background task evicting expired entries on a fixed period.
pub struct CleanupSweeper {
    nonces: Arc<NonceStore>,
    sessions: Arc<SessionStore>,
    interval: Duration,
}

impl CleanupSweeper {
    pub fn new(nonces: Arc<NonceStore>, sessions: Arc<SessionStore>, interval: Duration) -> Self {
        Self {
            nonces,
            sessions,
            interval,
        }
    }

    /// One sweep pass. Returns (challenges evicted, sessions evicted).
    pub fn sweep_once(&self, now: Timestamp) -> (usize, usize) {
        (self.nonces.sweep(now), self.sessions.sweep(now))
    }

    /// Run until the shutdown channel fires.
    pub fn spawn(self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately; harmless on empty stores.
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let (challenges, sessions) = self.sweep_once(Timestamp::now());
                        if challenges + sessions > 0 {
                            tracing::debug!(challenges, sessions, "evicted expired entries");
                        }
                    }
                    _ = shutdown.recv() => {
                        tracing::debug!("cleanup sweeper stopping");
                        break;
                    }
                }
            }
        })
    }
}
