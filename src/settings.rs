// Typed driver settings
//
// The host owns presentation and write access; the driver owns the defaults
// and exposes its settings as an explicit registration list. Pre-connect
// settings must be set before `connect`, post-connect settings are produced
// by the driver and read-only for the host.

use serde::{Deserialize, Serialize};

/// Errors raised when a host writes a setting it is not allowed to
#[derive(Debug, thiserror::Error)]
pub enum SettingError {
    #[error("setting '{name}' is read-only")]
    ReadOnly { name: &'static str },

    #[error("'{value}' is not an allowed value for setting '{name}'")]
    InvalidChoice { name: &'static str, value: String },

    #[error("setting '{name}' expects a {expected} value")]
    WrongType {
        name: &'static str,
        expected: &'static str,
    },
}

/// When a setting becomes meaningful in the driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingPhase {
    PreConnect,
    PostConnect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Str(String),
    Int(i64),
}

impl std::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingValue::Str(s) => write!(f, "{}", s),
            SettingValue::Int(i) => write!(f, "{}", i),
        }
    }
}

/// A named, typed configuration value with a declared lifecycle phase and an
/// optional restricted-choice list
#[derive(Debug, Clone, Serialize)]
pub struct DriverSetting {
    pub name: &'static str,
    pub phase: SettingPhase,
    pub read_only: bool,
    pub choices: Option<Vec<String>>,
    value: SettingValue,
}

impl DriverSetting {
    /// A host-writable string setting restricted to the given choices
    pub fn string(name: &'static str, default: &str, choices: &[&str]) -> Self {
        Self {
            name,
            phase: SettingPhase::PreConnect,
            read_only: false,
            choices: Some(choices.iter().map(|c| c.to_string()).collect()),
            value: SettingValue::Str(default.to_string()),
        }
    }

    /// A read-only integer setting the driver populates after connecting
    pub fn integer_read_only(name: &'static str, default: i64) -> Self {
        Self {
            name,
            phase: SettingPhase::PostConnect,
            read_only: true,
            choices: None,
            value: SettingValue::Int(default),
        }
    }

    pub fn value(&self) -> &SettingValue {
        &self.value
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            SettingValue::Str(s) => Some(s),
            SettingValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.value {
            SettingValue::Int(i) => Some(i),
            SettingValue::Str(_) => None,
        }
    }

    /// Host-side write: rejects read-only settings, type mismatches and
    /// values outside the restricted-choice list
    pub fn set(&mut self, value: SettingValue) -> Result<(), SettingError> {
        if self.read_only {
            return Err(SettingError::ReadOnly { name: self.name });
        }
        match (&self.value, &value) {
            (SettingValue::Str(_), SettingValue::Str(_)) => {}
            (SettingValue::Int(_), SettingValue::Int(_)) => {}
            (SettingValue::Str(_), _) => {
                return Err(SettingError::WrongType {
                    name: self.name,
                    expected: "string",
                });
            }
            (SettingValue::Int(_), _) => {
                return Err(SettingError::WrongType {
                    name: self.name,
                    expected: "integer",
                });
            }
        }
        if let (Some(choices), SettingValue::Str(s)) = (&self.choices, &value) {
            if !choices.iter().any(|c| c == s) {
                return Err(SettingError::InvalidChoice {
                    name: self.name,
                    value: s.clone(),
                });
            }
        }
        self.value = value;
        Ok(())
    }

    /// Driver-side write, used to publish post-connect values. Bypasses the
    /// read-only flag; never exposed to the host.
    pub(crate) fn force(&mut self, value: SettingValue) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_rejects_host_writes() {
        let mut setting = DriverSetting::integer_read_only("Number of Axes", 0);
        let result = setting.set(SettingValue::Int(4));
        assert!(matches!(result, Err(SettingError::ReadOnly { .. })));
        assert_eq!(setting.as_int(), Some(0));
    }

    #[test]
    fn test_restricted_choices() {
        let mut setting = DriverSetting::string("Address", "COM11", &["COM11", "COM12"]);

        assert!(setting.set(SettingValue::Str("COM12".to_string())).is_ok());
        assert_eq!(setting.as_str(), Some("COM12"));

        let result = setting.set(SettingValue::Str("COM99".to_string()));
        assert!(matches!(result, Err(SettingError::InvalidChoice { .. })));
        assert_eq!(setting.as_str(), Some("COM12"));
    }

    #[test]
    fn test_type_mismatch() {
        let mut setting = DriverSetting::string("Address", "COM11", &["COM11"]);
        let result = setting.set(SettingValue::Int(3));
        assert!(matches!(result, Err(SettingError::WrongType { .. })));
    }

    #[test]
    fn test_force_bypasses_read_only() {
        let mut setting = DriverSetting::integer_read_only("Number of Axes", 0);
        setting.force(SettingValue::Int(4));
        assert_eq!(setting.as_int(), Some(4));
    }

    #[test]
    fn test_snapshot_serializes_for_hosts() {
        let setting = DriverSetting::string("Address", "COM11", &["COM11", "COM12"]);
        let json = serde_json::to_string(&setting).unwrap();
        assert!(json.contains("\"name\":\"Address\""));
        assert!(json.contains("\"value\":\"COM11\""));
        assert!(json.contains("\"phase\":\"pre_connect\""));
    }
}
