// Motion control module
//
// Provides:
// - The motion-controller capability contract hosts program against
// - The ASCII line protocol spoken by the controller
// - A serial-port transport and the concrete driver built on it

mod driver;
pub mod controller;
pub mod protocol;
pub mod transport;

pub use controller::{AxisValues, MotionController};
pub use driver::SerialMotionDriver;
pub use protocol::{DriverError, Result};
pub use transport::{LineTransport, SerialLineTransport};
