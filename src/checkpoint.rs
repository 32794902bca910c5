//! Per-session snapshots so a failed run can be resumed.
//!
//! Only unfinished runs are kept. The store is bounded; once full, the
//! oldest snapshot is evicted to make room.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::pipeline::Stage;
use crate::types::PipelineState;

pub const DEFAULT_CAPACITY: usize = 1024;

/// The state after the last completed stage and the stage to run next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub next: Stage,
    pub state: PipelineState,
}

#[derive(Debug, Default)]
struct Slots {
    seq: u64,
    entries: HashMap<String, (u64, Checkpoint)>,
}

#[derive(Debug)]
pub struct Checkpoints {
    capacity: usize,
    inner: Mutex<Slots>,
}

impl Default for Checkpoints {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Checkpoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), inner: Mutex::new(Slots::default()) }
    }

    pub async fn save(&self, session_id: &str, next: Stage, state: &PipelineState) {
        let mut slots = self.inner.lock().await;
        slots.seq += 1;
        let seq = slots.seq;
        let cp = Checkpoint { next, state: state.clone() };
        slots.entries.insert(session_id.to_string(), (seq, cp));

        while slots.entries.len() > self.capacity {
            let oldest = slots
                .entries
                .iter()
                .min_by_key(|(_, (seq, _))| *seq)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    slots.entries.remove(&id);
                }
                None => break,
            }
        }
    }

    pub async fn get(&self, session_id: &str) -> Option<Checkpoint> {
        self.inner.lock().await.entries.get(session_id).map(|(_, cp)| cp.clone())
    }

    pub async fn remove(&self, session_id: &str) -> Option<Checkpoint> {
        self.inner.lock().await.entries.remove(session_id).map(|(_, cp)| cp)
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }
}
