// ASCII line protocol for the motion controller
//
// Every command is one newline-terminated line; the device answers with one
// line. Axis-addressed commands carry one token per axis, the axis letter
// immediately followed by the value:
//
//   V00 X120 Y80.5
//   G00?            ->  X1.0 Y2.0 Z3.0 W4.0
//
// Replies starting with "Error" signal a device-side failure; the rest of
// the line is free-form diagnostic text.

use crate::config::AXIS_NAMES;
use crate::motion::controller::AxisValues;

/// Command verbs understood by the controller
pub const CMD_SET_VELOCITY: &str = "V00";
pub const CMD_SET_ACCELERATION: &str = "A00";
pub const CMD_MOVE_RELATIVE: &str = "G01";
pub const CMD_MOVE_ABSOLUTE: &str = "G00";
pub const CMD_HOME: &str = "G28";
pub const QUERY_POSITIONS: &str = "G00?";
pub const QUERY_STATUS: &str = "Status?";
pub const QUERY_ENDSTOP_MIN: &str = "E00-?";
pub const QUERY_ENDSTOP_MAX: &str = "E00+?";

/// Status reply while any axis is in motion
pub const REPLY_MOVING: &str = "Moving";

const ERROR_PREFIX: &str = "Error";

/// Error types for driver operations
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("device returned error message: '{0}'")]
    Device(String),

    #[error("malformed reply '{reply}': {reason}")]
    MalformedReply { reply: String, reason: String },

    #[error("axis index {0} out of range")]
    UnknownAxis(usize),

    #[error("not connected to a device")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, DriverError>;

fn axis_letter(axis: usize) -> Result<&'static str> {
    AXIS_NAMES
        .get(axis)
        .copied()
        .ok_or(DriverError::UnknownAxis(axis))
}

fn is_axis_letter(c: char) -> bool {
    AXIS_NAMES.iter().any(|name| name.starts_with(c))
}

/// Build an axis-addressed command line: `"<command> <LETTER><value> ..."`.
///
/// Values are printed with the default `f64` formatting; one token is
/// emitted per map entry, in the order the map yields them.
pub fn format_axis_command(command: &str, axis_vals: &AxisValues) -> Result<String> {
    let mut line = String::from(command);
    for (&axis, &value) in axis_vals {
        line.push(' ');
        line.push_str(axis_letter(axis)?);
        line.push_str(&value.to_string());
    }
    Ok(line)
}

/// Build the homing command: `"G28 <space-joined axis letters>"`.
pub fn format_home_command(axes: &[usize]) -> Result<String> {
    let mut line = String::from(CMD_HOME);
    for &axis in axes {
        line.push(' ');
        line.push_str(axis_letter(axis)?);
    }
    Ok(line)
}

/// Check a reply for the device error marker, passing it through unchanged
/// otherwise. This is the sole error-detection mechanism in the protocol.
pub fn check_for_error(reply: String) -> Result<String> {
    if reply.starts_with(ERROR_PREFIX) {
        return Err(DriverError::Device(reply));
    }
    Ok(reply)
}

/// Parse a per-axis reply (`"X1.0 Y2.0 Z3.0 W4.0"`) into values in axis
/// table order. The axis letters are stripped, the remainder must parse as
/// a float.
pub fn parse_axis_reply(reply: &str) -> Result<Vec<f64>> {
    if reply.trim().is_empty() {
        return Err(DriverError::MalformedReply {
            reply: reply.to_string(),
            reason: "empty reply".to_string(),
        });
    }
    reply
        .split_whitespace()
        .map(|token| {
            token
                .trim_matches(is_axis_letter)
                .parse::<f64>()
                .map_err(|_| DriverError::MalformedReply {
                    reply: reply.to_string(),
                    reason: format!("token '{}' is not numeric", token),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_axis_command() {
        let mut vals = AxisValues::new();
        vals.insert(0, 10.0);
        vals.insert(2, -2.5);

        let line = format_axis_command(CMD_SET_VELOCITY, &vals).unwrap();
        assert_eq!(line, "V00 X10 Z-2.5");
    }

    #[test]
    fn test_format_axis_command_all_axes() {
        let mut vals = AxisValues::new();
        for axis in 0..4 {
            vals.insert(axis, axis as f64 + 0.5);
        }

        let line = format_axis_command(CMD_MOVE_ABSOLUTE, &vals).unwrap();
        assert_eq!(line, "G00 X0.5 Y1.5 Z2.5 W3.5");
    }

    #[test]
    fn test_format_axis_command_round_trips() {
        // The letter/value pairing must be a faithful inverse of the map
        let mut vals = AxisValues::new();
        vals.insert(1, 42.25);
        vals.insert(3, -0.125);

        let line = format_axis_command(CMD_SET_ACCELERATION, &vals).unwrap();
        let mut tokens = line.split_whitespace();
        assert_eq!(tokens.next(), Some(CMD_SET_ACCELERATION));

        for token in tokens {
            let letter = &token[..1];
            let axis = AXIS_NAMES.iter().position(|n| *n == letter).unwrap();
            let value: f64 = token[1..].parse().unwrap();
            assert_eq!(vals.get(&axis), Some(&value));
        }
    }

    #[test]
    fn test_format_axis_command_unknown_axis() {
        let mut vals = AxisValues::new();
        vals.insert(7, 1.0);

        let result = format_axis_command(CMD_SET_VELOCITY, &vals);
        assert!(matches!(result, Err(DriverError::UnknownAxis(7))));
    }

    #[test]
    fn test_format_home_command() {
        assert_eq!(format_home_command(&[0, 2]).unwrap(), "G28 X Z");
        assert_eq!(format_home_command(&[]).unwrap(), "G28");
    }

    #[test]
    fn test_check_for_error_passes_normal_replies() {
        assert_eq!(check_for_error("ok".to_string()).unwrap(), "ok");
        assert_eq!(check_for_error(String::new()).unwrap(), "");
    }

    #[test]
    fn test_check_for_error_detects_error_prefix() {
        let result = check_for_error("Error no device".to_string());
        match result {
            Err(DriverError::Device(reply)) => assert_eq!(reply, "Error no device"),
            other => panic!("expected Device error, got {:?}", other),
        }

        // The bare marker is still an error
        assert!(matches!(
            check_for_error("Error".to_string()),
            Err(DriverError::Device(_))
        ));
    }

    #[test]
    fn test_parse_axis_reply() {
        let values = parse_axis_reply("X1.0 Y2.0 Z3.0 W4.0").unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_parse_axis_reply_negative_values() {
        let values = parse_axis_reply("X-10.5 Y0 Z3").unwrap();
        assert_eq!(values, vec![-10.5, 0.0, 3.0]);
    }

    #[test]
    fn test_parse_axis_reply_rejects_non_numeric() {
        let result = parse_axis_reply("X1.0 Yabc");
        assert!(matches!(result, Err(DriverError::MalformedReply { .. })));
    }

    #[test]
    fn test_parse_axis_reply_rejects_empty() {
        // A timed-out read yields an empty string; it must fail, not parse
        let result = parse_axis_reply("");
        assert!(matches!(result, Err(DriverError::MalformedReply { .. })));
    }
}
