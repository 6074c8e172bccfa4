//! Commands accepted from collaborators.
//!
//! Transport does not matter here: a button, a notification action or a line
//! on stdin all end up as a [`Command`] handed to
//! [`PhaseScheduler::dispatch`](crate::timer::PhaseScheduler::dispatch).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    StartFocus,
    Pause,
    Resume,
    TogglePause,
    Reset,
    SkipBreak,
}

impl Command {
    /// Canonical action name used on the wire.
    pub fn action_name(self) -> &'static str {
        match self {
            Command::StartFocus => "START_FOCUS",
            Command::Pause => "PAUSE",
            Command::Resume => "RESUME",
            Command::TogglePause => "TOGGLE",
            Command::Reset => "RESET",
            Command::SkipBreak => "SKIP_BREAK",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.action_name())
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();

        match normalized.as_str() {
            "START_FOCUS" | "START" | "FOCUS" => Ok(Command::StartFocus),
            // Legacy notification action; it only ever stopped the timer.
            "PAUSE" | "PAUSE_TIMER" | "STOP" => Ok(Command::Pause),
            "RESUME" | "CONTINUE" => Ok(Command::Resume),
            "TOGGLE" | "TOGGLE_PAUSE" | "PAUSE_RESUME" => Ok(Command::TogglePause),
            "RESET" => Ok(Command::Reset),
            "SKIP_BREAK" | "SKIP" => Ok(Command::SkipBreak),
            _ => Err(CommandError::Unknown(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_action_names() {
        assert_eq!("START_FOCUS".parse(), Ok(Command::StartFocus));
        assert_eq!("PAUSE".parse(), Ok(Command::Pause));
        assert_eq!("SKIP_BREAK".parse(), Ok(Command::SkipBreak));
    }

    #[test]
    fn legacy_pause_timer_only_pauses() {
        assert_eq!("PAUSE_TIMER".parse(), Ok(Command::Pause));
    }

    #[test]
    fn parsing_ignores_case_and_separators() {
        assert_eq!("skip-break".parse(), Ok(Command::SkipBreak));
        assert_eq!(" start focus ".parse(), Ok(Command::StartFocus));
        assert_eq!("Toggle".parse(), Ok(Command::TogglePause));
        assert_eq!("skip".parse(), Ok(Command::SkipBreak));
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            "snooze".parse::<Command>(),
            Err(CommandError::Unknown("snooze".into()))
        );
        assert!("".parse::<Command>().is_err());
    }

    #[test]
    fn action_names_parse_back() {
        for cmd in [
            Command::StartFocus,
            Command::Pause,
            Command::Resume,
            Command::TogglePause,
            Command::Reset,
            Command::SkipBreak,
        ] {
            assert_eq!(cmd.action_name().parse(), Ok(cmd));
        }
    }
}
