//! # Pomodorotec Core Library
//!
//! This library provides the core of the Pomodorotec focus timer: a scheduler
//! that alternates between a 25-minute focus phase and a 5-minute break,
//! forever, until paused or reset.
//!
//! ## Architecture
//!
//! - **Phase Engine**: A clock-free state machine; each `tick()` is one second
//! - **Phase Scheduler**: A tokio driver owning the single tick source and
//!   publishing events and state snapshots
//! - **Notifications**: Content for phase starts and the `Notifier` seam
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`PhaseScheduler`]: Cloneable handle passed to every collaborator
//! - [`PhaseEngine`]: The state machine it drives
//! - [`Command`]: External actions, parsed from their wire names
//! - [`Notifier`]: Trait for rendering phase-start notifications
//! - [`Config`]: Application configuration management

pub mod command;
pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod timer;

pub use command::Command;
pub use error::{CommandError, ConfigError, CoreError, NotifyError};
pub use events::{Event, StartCause};
pub use notify::{spawn_notifier, Notification, NotificationAction, Notifier, TracingNotifier};
pub use storage::Config;
pub use timer::{Phase, PhaseDurations, PhaseEngine, PhaseScheduler, SchedulerSnapshot};
