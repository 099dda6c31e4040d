//! Delayed spawn scheduling
//!
//! [`DelayQueue`] is an in-process implementation of the host's delayed
//! callback facility, driven by the same elapsed time as the update loop.

use std::time::Duration;

use crate::host::DelayScheduler;
use crate::sprite::ContextId;

/// A spawn whose condition already passed, waiting for its delay to elapse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayedSpawn {
    pub context: ContextId,
}

#[derive(Debug)]
struct Pending {
    due_ms: f64,
    spawn: DelayedSpawn,
}

/// Queue of delayed spawns ordered by due time
#[derive(Debug, Default)]
pub struct DelayQueue {
    now_ms: f64,
    pending: Vec<Pending>,
}

impl DelayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance game time and drain the spawns that are now due, earliest first
    pub fn advance(&mut self, elapsed: Duration) -> Vec<DelayedSpawn> {
        self.now_ms += elapsed.as_nanos() as f64 / 1_000_000.0;
        let now = self.now_ms;

        let mut due: Vec<Pending> = Vec::new();
        self.pending.retain(|p| {
            if p.due_ms <= now {
                due.push(Pending {
                    due_ms: p.due_ms,
                    spawn: p.spawn,
                });
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        due.into_iter().map(|p| p.spawn).collect()
    }

    /// Drop pending spawns for a context that is going away
    pub fn cancel(&mut self, context: ContextId) {
        self.pending.retain(|p| p.spawn.context != context);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl DelayScheduler for DelayQueue {
    fn schedule_after(&mut self, delay_ms: u32, spawn: DelayedSpawn) {
        self.pending.push(Pending {
            due_ms: self.now_ms + delay_ms as f64,
            spawn,
        });
    }
}
