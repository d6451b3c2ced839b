// Fixed driver defaults: port selection, serial timing, axis table
use std::time::Duration;

// Serial port the controller usually shows up on, plus the ports a host is
// allowed to select instead
pub const DEFAULT_ADDRESS: &str = "COM11";
pub const ADDRESS_CHOICES: [&str; 3] = ["COM11", "COM12", "COM13"];

pub const BAUD_RATE: u32 = 9600;

// Short timeout so a silent device fails fast instead of hanging the caller
pub const REPLY_TIMEOUT: Duration = Duration::from_millis(200);

// Axis table is fixed for this controller, not discovered from the device
pub const AXIS_NAMES: [&str; 4] = ["X", "Y", "Z", "W"];
pub const AXIS_UNIT: &str = "mm";
