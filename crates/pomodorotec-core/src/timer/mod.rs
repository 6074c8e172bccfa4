mod engine;
mod phase;
mod scheduler;

pub use engine::{PhaseEngine, SchedulerSnapshot};
pub use phase::{format_remaining, Phase, PhaseDurations, BREAK_SECS, FOCUS_SECS};
pub use scheduler::{PhaseScheduler, TICK_PERIOD};
