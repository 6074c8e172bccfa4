//! Notification content and the collaborator seam that renders it.
//!
//! The scheduler only decides *that* a notification is due and *what* it
//! says. Rendering belongs to a [`Notifier`]; whatever it reports, scheduler
//! state is never touched.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::error::NotifyError;
use crate::events::Event;
use crate::timer::{Phase, PhaseScheduler};

/// A button offered on the notification. Activating it dispatches `command`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub label: String,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub phase: Phase,
    pub title: String,
    pub body: String,
    /// Short line shown under the expanded body.
    pub summary: String,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    pub fn for_phase(phase: Phase) -> Self {
        let summary = match phase {
            Phase::Focus => "Sesión de concentración",
            Phase::Break => "Tiempo de descanso",
        };

        let mut actions = vec![NotificationAction {
            label: "Pausar".into(),
            command: Command::Pause,
        }];
        if phase == Phase::Break {
            actions.push(NotificationAction {
                label: "Saltar descanso".into(),
                command: Command::SkipBreak,
            });
        }

        Self {
            phase,
            title: phase.start_title().to_string(),
            body: phase.start_body().to_string(),
            summary: summary.to_string(),
            actions,
        }
    }

    /// Build the notification due for an event, if any.
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::PhaseStarted {
                phase, title, body, ..
            } => {
                let mut notification = Self::for_phase(*phase);
                notification.title = title.clone();
                notification.body = body.clone();
                Some(notification)
            }
            _ => None,
        }
    }

    /// Look up the action with the given label.
    pub fn action(&self, label: &str) -> Option<&NotificationAction> {
        self.actions.iter().find(|a| a.label == label)
    }
}

/// Renders notifications for the user.
pub trait Notifier: Send + Sync + 'static {
    /// # Errors
    ///
    /// Implementations report rendering failures; callers log and move on.
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log.
#[derive(Debug, Clone)]
pub struct TracingNotifier {
    enabled: bool,
}

impl TracingNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if !self.enabled {
            return Err(NotifyError::Disabled);
        }
        let actions: Vec<&str> = notification
            .actions
            .iter()
            .map(|a| a.label.as_str())
            .collect();
        info!(
            phase = %notification.phase,
            summary = %notification.summary,
            ?actions,
            "{}: {}",
            notification.title,
            notification.body
        );
        Ok(())
    }
}

/// Forward every phase start from `scheduler` to `notifier`.
///
/// Runs on the scheduler's runtime until its event channel closes, so it may
/// be called from a thread outside that runtime.
pub fn spawn_notifier<N: Notifier>(scheduler: &PhaseScheduler, notifier: N) -> JoinHandle<()> {
    let mut events = scheduler.subscribe();
    scheduler.runtime().spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let Some(notification) = Notification::from_event(&event) else {
                        continue;
                    };
                    if let Err(e) = notifier.notify(&notification) {
                        warn!(phase = %notification.phase, "notification not shown: {e}");
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    warn!(skipped = n, "notifier lagged behind scheduler events");
                }
                Err(RecvError::Closed) => {
                    debug!("notifier stopping: event channel closed");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::StartCause;

    #[test]
    fn focus_notification_offers_pause_only() {
        let n = Notification::for_phase(Phase::Focus);
        assert_eq!(n.title, "Inicio de Concentración");
        assert_eq!(n.body, "La sesión de concentración ha comenzado.");
        assert_eq!(n.summary, "Sesión de concentración");
        assert_eq!(n.actions.len(), 1);
        assert_eq!(n.action("Pausar").map(|a| a.command), Some(Command::Pause));
        assert!(n.action("Saltar descanso").is_none());
    }

    #[test]
    fn break_notification_offers_skip() {
        let n = Notification::for_phase(Phase::Break);
        assert_eq!(n.title, "Inicio de Descanso");
        assert_eq!(n.summary, "Tiempo de descanso");
        assert_eq!(
            n.action("Saltar descanso").map(|a| a.command),
            Some(Command::SkipBreak)
        );
    }

    #[test]
    fn only_phase_starts_produce_notifications() {
        let started = Event::phase_started(Phase::Break, StartCause::Expired);
        assert_eq!(
            Notification::from_event(&started),
            Some(Notification::for_phase(Phase::Break))
        );

        let reset = Event::TimerReset {
            at: chrono::Utc::now(),
        };
        assert!(Notification::from_event(&reset).is_none());
    }

    #[test]
    fn disabled_tracing_notifier_reports_disabled() {
        let n = Notification::for_phase(Phase::Focus);
        assert!(matches!(
            TracingNotifier::new(false).notify(&n),
            Err(NotifyError::Disabled)
        ));
        assert!(TracingNotifier::new(true).notify(&n).is_ok());
    }
}
