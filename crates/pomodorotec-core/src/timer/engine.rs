//! Phase engine implementation.
//!
//! The phase engine is a clock-free state machine. It does not own a tick
//! source: whoever drives it (see [`PhaseScheduler`](super::PhaseScheduler))
//! calls `tick()` once per second while the engine is running.
//!
//! ## State Transitions
//!
//! ```text
//! (Focus | Break) x (Running | Paused)
//!
//! Focus/Running --expiry--> Break/Running --expiry--> Focus/Running ...
//! ```
//!
//! There is no idle state between phases: expiry immediately starts the
//! opposite phase and keeps counting down.
//!
//! ## Usage
//!
//! ```
//! use pomodorotec_core::timer::{Phase, PhaseEngine};
//!
//! let mut engine = PhaseEngine::new();
//! engine.start_focus();
//! for _ in 0..1500 {
//!     engine.tick();
//! }
//! assert_eq!(engine.phase(), Phase::Break);
//! ```

use serde::{Deserialize, Serialize};

use super::phase::{format_remaining, Phase, PhaseDurations};
use crate::events::{Event, StartCause};

/// Read-only view of the engine handed to renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    pub phase: Phase,
    pub remaining_secs: u64,
    /// `remaining_secs` as `MM:SS`.
    pub remaining_text: String,
    pub total_secs: u64,
    pub running: bool,
    pub skip_visible: bool,
}

/// Core phase state machine.
///
/// Only reachable through its commands, so the bounds below always hold.
#[derive(Debug, Clone)]
pub struct PhaseEngine {
    durations: PhaseDurations,
    phase: Phase,
    /// Always within `[0, durations.of(phase)]`.
    remaining_secs: u64,
    running: bool,
    /// Cached `phase == Break`, rewritten on every phase change.
    skip_visible: bool,
}

impl PhaseEngine {
    /// Create an engine with the default 25:00 / 05:00 durations.
    ///
    /// Starts paused in `Focus` with the full focus duration.
    pub fn new() -> Self {
        Self::with_durations(PhaseDurations::default())
    }

    pub fn with_durations(durations: PhaseDurations) -> Self {
        Self {
            durations,
            phase: Phase::Focus,
            remaining_secs: durations.focus_secs,
            running: false,
            skip_visible: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn remaining_text(&self) -> String {
        format_remaining(self.remaining_secs)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn skip_visible(&self) -> bool {
        self.skip_visible
    }

    pub fn durations(&self) -> PhaseDurations {
        self.durations
    }

    pub fn total_secs(&self) -> u64 {
        self.durations.of(self.phase)
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            remaining_text: self.remaining_text(),
            total_secs: self.total_secs(),
            running: self.running,
            skip_visible: self.skip_visible,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Force a fresh, running focus session. Always emits `PhaseStarted`.
    pub fn start_focus(&mut self) -> Event {
        self.begin(Phase::Focus, StartCause::Started)
    }

    /// Valid in any state; behaves like `start_focus` but reports the skip.
    pub fn skip_break(&mut self) -> Event {
        self.begin(Phase::Focus, StartCause::Skipped)
    }

    /// Stop ticking, keeping `remaining` frozen. No-op when already paused.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(Event::TimerPaused {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: chrono::Utc::now(),
        })
    }

    /// Continue from the frozen remaining value. No-op when already running.
    pub fn resume(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        Some(Event::TimerResumed {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: chrono::Utc::now(),
        })
    }

    /// Pause when running, resume otherwise.
    pub fn toggle_pause(&mut self) -> Option<Event> {
        if self.running {
            self.pause()
        } else {
            self.resume()
        }
    }

    /// Back to the initial paused focus state.
    pub fn reset(&mut self) -> Event {
        self.running = false;
        self.enter(Phase::Focus);
        Event::TimerReset {
            at: chrono::Utc::now(),
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `Some(PhaseStarted)` when the countdown expired and the
    /// opposite phase began. A tick on a paused engine changes nothing.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return Some(self.begin(self.phase.opposite(), StartCause::Expired));
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn begin(&mut self, phase: Phase, cause: StartCause) -> Event {
        self.enter(phase);
        self.running = true;
        Event::phase_started(phase, cause)
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.remaining_secs = self.durations.of(phase);
        self.skip_visible = phase == Phase::Break;
    }
}

impl Default for PhaseEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_ticks(engine: &mut PhaseEngine, n: u64) -> Vec<Event> {
        (0..n).filter_map(|_| engine.tick()).collect()
    }

    #[test]
    fn new_engine_is_paused_focus() {
        let engine = PhaseEngine::new();
        assert_eq!(engine.phase(), Phase::Focus);
        assert_eq!(engine.remaining_secs(), 1500);
        assert!(!engine.is_running());
        assert!(!engine.skip_visible());
        assert_eq!(engine.remaining_text(), "25:00");
    }

    #[test]
    fn start_focus_resets_and_runs() {
        let mut engine = PhaseEngine::new();
        engine.start_focus();
        run_ticks(&mut engine, 100);
        let event = engine.start_focus();

        assert_eq!(event.started_phase(), Some(Phase::Focus));
        assert_eq!(engine.remaining_secs(), 1500);
        assert!(engine.is_running());
        assert!(!engine.skip_visible());
    }

    #[test]
    fn start_pause_resume() {
        let mut engine = PhaseEngine::new();
        engine.start_focus();
        run_ticks(&mut engine, 42);

        assert!(engine.pause().is_some());
        assert!(!engine.is_running());
        assert!(engine.pause().is_none());

        // Frozen while paused.
        run_ticks(&mut engine, 10);
        assert_eq!(engine.remaining_secs(), 1500 - 42);

        assert!(engine.resume().is_some());
        assert!(engine.is_running());
        assert!(engine.resume().is_none());
        assert_eq!(engine.remaining_secs(), 1500 - 42);
        assert_eq!(engine.phase(), Phase::Focus);
    }

    #[test]
    fn resume_from_initial_state_counts_down_focus() {
        let mut engine = PhaseEngine::new();
        assert!(engine.resume().is_some());
        engine.tick();
        assert_eq!(engine.remaining_secs(), 1499);
    }

    #[test]
    fn toggle_pause_flips_running() {
        let mut engine = PhaseEngine::new();
        engine.start_focus();
        assert!(matches!(engine.toggle_pause(), Some(Event::TimerPaused { .. })));
        assert!(matches!(engine.toggle_pause(), Some(Event::TimerResumed { .. })));
        assert!(engine.is_running());
    }

    #[test]
    fn focus_expiry_starts_break() {
        let mut engine = PhaseEngine::new();
        engine.start_focus();
        let events = run_ticks(&mut engine, 1500);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].started_phase(), Some(Phase::Break));
        assert_eq!(engine.phase(), Phase::Break);
        assert_eq!(engine.remaining_secs(), 300);
        assert_eq!(engine.remaining_text(), "05:00");
        assert!(engine.is_running());
        assert!(engine.skip_visible());
    }

    #[test]
    fn break_expiry_starts_focus() {
        let mut engine = PhaseEngine::new();
        engine.start_focus();
        run_ticks(&mut engine, 1500);
        let events = run_ticks(&mut engine, 300);

        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::PhaseStarted { phase, cause, .. } => {
                assert_eq!(*phase, Phase::Focus);
                assert_eq!(*cause, StartCause::Expired);
            }
            other => panic!("Expected PhaseStarted, got {other:?}"),
        }
        assert_eq!(engine.remaining_secs(), 1500);
        assert!(engine.is_running());
        assert!(!engine.skip_visible());
    }

    #[test]
    fn one_tick_before_expiry_stays_in_phase() {
        let mut engine = PhaseEngine::new();
        engine.start_focus();
        assert!(run_ticks(&mut engine, 1499).is_empty());
        assert_eq!(engine.phase(), Phase::Focus);
        assert_eq!(engine.remaining_text(), "00:01");
    }

    #[test]
    fn reset_goes_to_initial_state() {
        let mut engine = PhaseEngine::new();
        engine.start_focus();
        run_ticks(&mut engine, 1600);
        assert_eq!(engine.phase(), Phase::Break);

        assert!(matches!(engine.reset(), Event::TimerReset { .. }));
        assert_eq!(engine.phase(), Phase::Focus);
        assert_eq!(engine.remaining_secs(), 1500);
        assert!(!engine.is_running());
        assert!(!engine.skip_visible());

        // Stray ticks after a reset do nothing.
        assert!(run_ticks(&mut engine, 5).is_empty());
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn skip_break_during_break_starts_focus() {
        let mut engine = PhaseEngine::new();
        engine.start_focus();
        run_ticks(&mut engine, 1510);
        engine.pause();

        match engine.skip_break() {
            Event::PhaseStarted { phase, cause, .. } => {
                assert_eq!(phase, Phase::Focus);
                assert_eq!(cause, StartCause::Skipped);
            }
            other => panic!("Expected PhaseStarted, got {other:?}"),
        }
        assert_eq!(engine.snapshot(), {
            let mut fresh = PhaseEngine::new();
            fresh.start_focus();
            fresh.snapshot()
        });
    }

    #[test]
    fn skip_break_during_focus_is_start_focus() {
        let mut engine = PhaseEngine::new();
        engine.start_focus();
        run_ticks(&mut engine, 30);
        engine.skip_break();
        assert_eq!(engine.phase(), Phase::Focus);
        assert_eq!(engine.remaining_secs(), 1500);
        assert!(engine.is_running());
    }

    #[test]
    fn custom_durations_drive_the_cycle() {
        let mut engine = PhaseEngine::with_durations(PhaseDurations {
            focus_secs: 3,
            break_secs: 2,
        });
        engine.start_focus();
        let phases: Vec<Phase> = run_ticks(&mut engine, 10)
            .iter()
            .filter_map(Event::started_phase)
            .collect();
        assert_eq!(
            phases,
            vec![Phase::Break, Phase::Focus, Phase::Break, Phase::Focus]
        );
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut engine = PhaseEngine::new();
        engine.start_focus();
        engine.tick();
        let snap = engine.snapshot();
        assert_eq!(snap.phase, Phase::Focus);
        assert_eq!(snap.remaining_secs, 1499);
        assert_eq!(snap.remaining_text, "24:59");
        assert_eq!(snap.total_secs, 1500);
        assert!(snap.running);
        assert!(!snap.skip_visible);
    }
}
