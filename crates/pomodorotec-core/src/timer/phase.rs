use serde::{Deserialize, Serialize};

/// Default focus length: 25:00.
pub const FOCUS_SECS: u64 = 25 * 60;
/// Default break length: 05:00.
pub const BREAK_SECS: u64 = 5 * 60;

/// The two session kinds the scheduler alternates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Focus,
    Break,
}

impl Phase {
    /// The phase that follows this one on expiry.
    pub fn opposite(self) -> Self {
        match self {
            Phase::Focus => Phase::Break,
            Phase::Break => Phase::Focus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::Break => "Break",
        }
    }

    /// Notification title announcing the start of this phase.
    pub fn start_title(self) -> &'static str {
        match self {
            Phase::Focus => "Inicio de Concentración",
            Phase::Break => "Inicio de Descanso",
        }
    }

    /// Notification body announcing the start of this phase.
    pub fn start_body(self) -> &'static str {
        match self {
            Phase::Focus => "La sesión de concentración ha comenzado.",
            Phase::Break => "La sesión de descanso ha comenzado.",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Full length of each phase, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub focus_secs: u64,
    pub break_secs: u64,
}

impl PhaseDurations {
    pub fn of(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Focus => self.focus_secs,
            Phase::Break => self.break_secs,
        }
    }
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            focus_secs: FOCUS_SECS,
            break_secs: BREAK_SECS,
        }
    }
}

/// Render a second count as zero-padded `MM:SS`.
///
/// Minutes are not wrapped into hours, so 6000s renders as `100:00`.
pub fn format_remaining(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_alternates() {
        assert_eq!(Phase::Focus.opposite(), Phase::Break);
        assert_eq!(Phase::Break.opposite(), Phase::Focus);
    }

    #[test]
    fn default_durations() {
        let d = PhaseDurations::default();
        assert_eq!(d.of(Phase::Focus), 1500);
        assert_eq!(d.of(Phase::Break), 300);
    }

    #[test]
    fn format_pads_minutes_and_seconds() {
        assert_eq!(format_remaining(1500), "25:00");
        assert_eq!(format_remaining(300), "05:00");
        assert_eq!(format_remaining(1499), "24:59");
        assert_eq!(format_remaining(61), "01:01");
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(6000), "100:00");
    }

    #[test]
    fn phase_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Phase::Break).unwrap(), "\"break\"");
    }
}
