// Serial driver for G-code style motion controllers
//
// Provides:
// - MotionController, the capability contract a host application programs against
// - SerialMotionDriver, a line-protocol implementation over a serial port
// - Typed driver settings with pre/post-connect phases

pub mod config;
pub mod motion;
pub mod settings;

pub use motion::{AxisValues, DriverError, MotionController, SerialMotionDriver};
