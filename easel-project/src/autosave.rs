//! Debounced autosave.
//!
//! Edits arrive far faster than anyone wants to hit storage. [`Autosave`]
//! holds at most one pending payload; each new request replaces it and
//! pushes the deadline out by the debounce window. Only the last payload of
//! a burst reaches the store.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, error, trace, warn};
use uuid::Uuid;

use easel_history::{SavePayload, SaveSink};

use crate::ProjectStore;

/// Source of "now" for the debounce timer.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutosaveConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Deliver a pending save when the editor closes instead of dropping it.
    #[serde(default = "default_flush_on_close")]
    pub flush_on_close: bool,
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_flush_on_close() -> bool {
    true
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            flush_on_close: default_flush_on_close(),
        }
    }
}

impl AutosaveConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug)]
struct PendingSave {
    payload: SavePayload,
    deadline: Instant,
}

pub struct Autosave<S: ProjectStore, K: Clock = SystemClock> {
    project_id: Uuid,
    store: S,
    clock: K,
    window: Duration,
    pending: Option<PendingSave>,
    delivered: u64,
}

impl<S: ProjectStore, K: Clock> Autosave<S, K> {
    pub fn new(project_id: Uuid, store: S, clock: K, config: &AutosaveConfig) -> Self {
        debug!(project = %project_id, window_ms = config.debounce_ms, "Autosave ready");
        Self {
            project_id,
            store,
            clock,
            window: config.window(),
            pending: None,
            delivered: 0,
        }
    }

    /// Queue `payload`, replacing whatever was pending, and restart the window.
    pub fn request(&mut self, payload: SavePayload) {
        let deadline = self.clock.now() + self.window;
        if self.pending.is_some() {
            trace!("Replacing pending save");
        }
        self.pending = Some(PendingSave { payload, deadline });
    }

    /// Deliver the pending payload if its window has elapsed.
    ///
    /// A failed delivery stays pending and is retried one window later.
    pub fn poll(&mut self) -> anyhow::Result<bool> {
        let due = matches!(&self.pending, Some(p) if self.clock.now() >= p.deadline);
        if !due {
            return Ok(false);
        }
        self.deliver()
    }

    /// Deliver the pending payload now, if any.
    pub fn flush(&mut self) -> anyhow::Result<bool> {
        self.deliver()
    }

    /// Drop the pending payload without saving it.
    pub fn cancel(&mut self) -> bool {
        let had = self.pending.take().is_some();
        if had {
            debug!("Pending save cancelled");
        }
        had
    }

    fn deliver(&mut self) -> anyhow::Result<bool> {
        let Some(pending) = self.pending.take() else {
            return Ok(false);
        };

        match self.store.update_project(self.project_id, &pending.payload) {
            Ok(()) => {
                self.delivered += 1;
                debug!(project = %self.project_id, delivered = self.delivered, "Project saved");
                Ok(true)
            }
            Err(err) => {
                error!(project = %self.project_id, "Autosave failed: {:#}", err);
                self.pending = Some(PendingSave {
                    payload: pending.payload,
                    deadline: self.clock.now() + self.window,
                });
                Err(err)
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_payload(&self) -> Option<&SavePayload> {
        self.pending.as_ref().map(|p| &p.payload)
    }

    /// Number of payloads that reached the store.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }
}

impl<S: ProjectStore, K: Clock> SaveSink for Autosave<S, K> {
    fn save(&mut self, payload: SavePayload) {
        self.request(payload);
    }
}

impl<S: ProjectStore, K: Clock> Drop for Autosave<S, K> {
    fn drop(&mut self) {
        if self.pending.is_some() {
            warn!(project = %self.project_id, "Dropping autosave with an unsaved edit");
        }
    }
}
