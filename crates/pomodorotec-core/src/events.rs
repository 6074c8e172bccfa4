use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Why a phase started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartCause {
    /// Explicit `start_focus`.
    Started,
    /// The previous phase counted down to zero.
    Expired,
    /// `skip_break` was invoked.
    Skipped,
}

/// Every state change in the scheduler produces an Event.
/// Renderers watch snapshots; the notification collaborator subscribes to these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PhaseStarted {
        phase: Phase,
        title: String,
        body: String,
        cause: StartCause,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn phase_started(phase: Phase, cause: StartCause) -> Self {
        Event::PhaseStarted {
            phase,
            title: phase.start_title().to_string(),
            body: phase.start_body().to_string(),
            cause,
            at: Utc::now(),
        }
    }

    /// The phase announced by a `PhaseStarted` event.
    pub fn started_phase(&self) -> Option<Phase> {
        match self {
            Event::PhaseStarted { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}
