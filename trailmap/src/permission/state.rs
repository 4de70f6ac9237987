//! Tri-state permission status.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Location permission status as seen by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PermissionState {
    /// Not asked yet (or not checked yet).
    #[default]
    Undetermined,
    /// Location access allowed.
    Granted,
    /// Location access refused, restricted, or the service failed.
    Denied,
}

impl PermissionState {
    /// Get the lowercase name used in config and CLI arguments.
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionState::Undetermined => "undetermined",
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
        }
    }

    /// Check if location operations are allowed.
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }

    /// Check if the status is final (the OS will not prompt again).
    pub fn is_resolved(&self) -> bool {
        !matches!(self, PermissionState::Undetermined)
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error parsing a [`PermissionState`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown permission state '{0}' (expected undetermined, granted or denied)")]
pub struct ParsePermissionStateError(pub String);

impl FromStr for PermissionState {
    type Err = ParsePermissionStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "undetermined" => Ok(PermissionState::Undetermined),
            "granted" => Ok(PermissionState::Granted),
            "denied" => Ok(PermissionState::Denied),
            _ => Err(ParsePermissionStateError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_undetermined() {
        assert_eq!(PermissionState::default(), PermissionState::Undetermined);
    }

    #[test]
    fn test_display_and_parse_agree() {
        for state in [
            PermissionState::Undetermined,
            PermissionState::Granted,
            PermissionState::Denied,
        ] {
            assert_eq!(state.to_string().parse::<PermissionState>(), Ok(state));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("GRANTED".parse(), Ok(PermissionState::Granted));
        assert_eq!(" Denied ".parse(), Ok(PermissionState::Denied));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "blocked".parse::<PermissionState>().unwrap_err();
        assert!(err.to_string().contains("blocked"));
    }

    #[test]
    fn test_predicates() {
        assert!(PermissionState::Granted.is_granted());
        assert!(!PermissionState::Denied.is_granted());
        assert!(!PermissionState::Undetermined.is_resolved());
        assert!(PermissionState::Denied.is_resolved());
    }
}
