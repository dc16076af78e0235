//! Autosave scheduling — debounce and heartbeat countdowns in ticks.
//!
//! Three triggers converge on the same save operation: a debounced save
//! after any currency change, an unconditional periodic heartbeat, and
//! the visibility/unload flush wired up in `main`. The first two live
//! here as plain tick arithmetic so the protocol is testable without a
//! browser. Triggers may race; that is fine because every save carries
//! the full snapshot and the server keeps the last write.

/// Game ticks per real-time second.
pub const TICKS_PER_SEC: u32 = 10;

/// Rapid clicks coalesce into one save ~400 ms after the last change.
pub const DEBOUNCE_TICKS: u32 = 4;

/// Safety net against debounce starvation: save every 5 seconds no
/// matter what.
pub const HEARTBEAT_TICKS: u32 = 5 * TICKS_PER_SEC;

#[derive(Debug)]
pub struct AutosaveScheduler {
    /// Ticks until the debounced save fires; `None` when not armed.
    debounce_left: Option<u32>,
    /// Ticks until the next heartbeat save.
    heartbeat_left: u32,
}

impl AutosaveScheduler {
    pub fn new() -> Self {
        Self {
            debounce_left: None,
            heartbeat_left: HEARTBEAT_TICKS,
        }
    }

    /// Arm (or re-arm) the debounce window after a state change. A change
    /// landing inside an already armed window pushes the save out again.
    pub fn note_change(&mut self) {
        self.debounce_left = Some(DEBOUNCE_TICKS);
    }

    pub fn debounce_armed(&self) -> bool {
        self.debounce_left.is_some()
    }

    /// Advance by `delta_ticks`. Returns `true` when a save should be
    /// dispatched now; firing disarms the debounce and restarts the
    /// heartbeat so at most one save is requested per window.
    pub fn tick(&mut self, delta_ticks: u32) -> bool {
        if delta_ticks == 0 {
            return false;
        }

        let debounce_fired = match self.debounce_left {
            Some(left) => {
                let left = left.saturating_sub(delta_ticks);
                self.debounce_left = Some(left);
                left == 0
            }
            None => false,
        };
        self.heartbeat_left = self.heartbeat_left.saturating_sub(delta_ticks);
        let heartbeat_fired = self.heartbeat_left == 0;

        if debounce_fired || heartbeat_fired {
            self.debounce_left = None;
            self.heartbeat_left = HEARTBEAT_TICKS;
            return true;
        }
        false
    }
}

impl Default for AutosaveScheduler {
    fn default() -> Self {
        Self::new()
    }
}
