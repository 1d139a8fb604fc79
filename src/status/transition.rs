use std::str::FromStr;

use crate::error::ValidationError;

pub const EMERGENCY_MODE: &str = "SC Emergency Mode";
pub const MEETING_MODE: &str = "FES Meeting Mode";

/// The four operator-facing mode changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionCommand {
    ActivateEmergency,
    DeactivateEmergency,
    ActivateMeeting,
    DeactivateMeeting,
}

impl TransitionCommand {
    pub const ALL: [TransitionCommand; 4] = [
        TransitionCommand::ActivateEmergency,
        TransitionCommand::DeactivateEmergency,
        TransitionCommand::ActivateMeeting,
        TransitionCommand::DeactivateMeeting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionCommand::ActivateEmergency => "Activate SC Emergency Mode",
            TransitionCommand::DeactivateEmergency => "Deactivate SC Emergency Mode",
            TransitionCommand::ActivateMeeting => "Activate FES Meeting Mode",
            TransitionCommand::DeactivateMeeting => "Deactivate FES Meeting Mode",
        }
    }

    /// Ordered `(logical key, value)` writes for this command.
    ///
    /// Only the two activations clear the other mode; a deactivation leaves it alone.
    pub fn updates(&self) -> &'static [(&'static str, bool)] {
        match self {
            TransitionCommand::ActivateEmergency => &[(EMERGENCY_MODE, true), (MEETING_MODE, false)],
            TransitionCommand::DeactivateEmergency => &[(EMERGENCY_MODE, false)],
            TransitionCommand::ActivateMeeting => &[(EMERGENCY_MODE, false), (MEETING_MODE, true)],
            TransitionCommand::DeactivateMeeting => &[(MEETING_MODE, false)],
        }
    }
}

impl FromStr for TransitionCommand {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|command| command.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidCommand(s.to_string()))
    }
}

impl std::fmt::Display for TransitionCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_parse_to_their_command() {
        for command in TransitionCommand::ALL {
            assert_eq!(command.as_str().parse::<TransitionCommand>(), Ok(command));
        }
    }

    #[test]
    fn parsing_is_exact() {
        for input in [
            "",
            "activate sc emergency mode",
            "Activate SC Emergency Mode ",
            "Activate Emergency Mode",
            "Toggle FES Meeting Mode",
        ] {
            assert_eq!(
                input.parse::<TransitionCommand>(),
                Err(ValidationError::InvalidCommand(input.to_string()))
            );
        }
    }

    #[test]
    fn activations_never_leave_both_modes_on() {
        for command in [
            TransitionCommand::ActivateEmergency,
            TransitionCommand::ActivateMeeting,
        ] {
            let on = command.updates().iter().filter(|(_, v)| *v).count();
            assert_eq!(on, 1, "{command} must enable exactly one mode");
            assert_eq!(command.updates().len(), 2);
        }
    }

    #[test]
    fn deactivations_touch_only_their_own_mode() {
        assert_eq!(
            TransitionCommand::DeactivateEmergency.updates(),
            &[(EMERGENCY_MODE, false)]
        );
        assert_eq!(
            TransitionCommand::DeactivateMeeting.updates(),
            &[(MEETING_MODE, false)]
        );
    }
}
