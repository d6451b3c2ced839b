// Serial motion-controller driver
//
// Implements the MotionController contract over the line protocol. Owns its
// transport exclusively; not thread-safe, callers must serialize access.

use tracing::{debug, info, warn};

use crate::config::{ADDRESS_CHOICES, AXIS_NAMES, AXIS_UNIT, DEFAULT_ADDRESS};
use crate::motion::controller::{AxisValues, MotionController};
use crate::motion::protocol::{
    self, CMD_MOVE_ABSOLUTE, CMD_MOVE_RELATIVE, CMD_SET_ACCELERATION, CMD_SET_VELOCITY,
    DriverError, QUERY_ENDSTOP_MAX, QUERY_ENDSTOP_MIN, QUERY_POSITIONS, QUERY_STATUS,
    REPLY_MOVING, Result,
};
use crate::motion::transport::{LineTransport, SerialLineTransport};
use crate::settings::{DriverSetting, SettingError, SettingValue};

pub struct SerialMotionDriver {
    address: DriverSetting,
    number_of_axes: DriverSetting,
    port: Option<Box<dyn LineTransport>>,
}

impl SerialMotionDriver {
    pub fn new() -> Self {
        Self {
            address: DriverSetting::string("Address", DEFAULT_ADDRESS, &ADDRESS_CHOICES),
            number_of_axes: DriverSetting::integer_read_only("Number of Axes", 0),
            port: None,
        }
    }

    /// Registration list the host reads: the pre-connect address first, then
    /// the post-connect axis count.
    pub fn settings(&self) -> [&DriverSetting; 2] {
        [&self.address, &self.number_of_axes]
    }

    /// Select the serial port to use on the next connect. Restricted to the
    /// fixed choice list.
    pub fn set_address(&mut self, address: &str) -> std::result::Result<(), SettingError> {
        self.address.set(SettingValue::Str(address.to_string()))
    }

    pub fn address(&self) -> &str {
        // Constructed as a string setting; the variant never changes
        self.address.as_str().unwrap_or(DEFAULT_ADDRESS)
    }

    /// Axis count reported by the post-connect setting (0 while disconnected)
    pub fn number_of_axes(&self) -> i64 {
        self.number_of_axes.as_int().unwrap_or(0)
    }

    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    /// Attach an already-open transport and run the connect handshake.
    /// `connect` uses this with a real serial port; simulated devices and
    /// tests can inject their own transport.
    pub fn connect_with_transport(&mut self, transport: Box<dyn LineTransport>) -> Result<()> {
        self.port = Some(transport);

        // Position query doubles as a liveness probe; a silent or erroring
        // device fails the connect and the port is closed again
        if let Err(e) = self.query_axis_values(QUERY_POSITIONS) {
            warn!("Liveness probe failed, closing port: {}", e);
            self.port = None;
            return Err(e);
        }

        self.number_of_axes
            .force(SettingValue::Int(AXIS_NAMES.len() as i64));
        info!("Connected, {} axes available", AXIS_NAMES.len());
        Ok(())
    }

    fn transport(&mut self) -> Result<&mut (dyn LineTransport + 'static)> {
        self.port.as_deref_mut().ok_or(DriverError::NotConnected)
    }

    /// One write/read/error-check round against the device
    fn exchange(&mut self, line: &str) -> Result<String> {
        let port = self.transport()?;
        port.write_line(line)?;
        protocol::check_for_error(port.read_line()?)
    }

    /// Exchange where only the error check matters
    fn command(&mut self, line: &str) -> Result<()> {
        self.exchange(line).map(|_| ())
    }

    fn query_axis_values(&mut self, query: &str) -> Result<Vec<f64>> {
        let reply = self.exchange(query)?;
        protocol::parse_axis_reply(&reply)
    }
}

impl Default for SerialMotionDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionController for SerialMotionDriver {
    fn connect(&mut self) -> Result<()> {
        let address = self.address().to_string();
        info!("Opening motion controller on {}", address);
        let transport = SerialLineTransport::open(&address)?;
        self.connect_with_transport(Box::new(transport))
    }

    fn disconnect(&mut self) -> Result<()> {
        // Reset the axis count before the port goes away so settings readers
        // never see a connected count on a closed link
        self.number_of_axes.force(SettingValue::Int(0));
        self.port = None;
        info!("Disconnected");
        Ok(())
    }

    fn axis_display_names(&self) -> &'static [&'static str] {
        &AXIS_NAMES
    }

    fn axis_units(&self) -> Vec<&'static str> {
        vec![AXIS_UNIT; AXIS_NAMES.len()]
    }

    fn set_velocity(&mut self, velocities: &AxisValues) -> Result<()> {
        let line = protocol::format_axis_command(CMD_SET_VELOCITY, velocities)?;
        self.command(&line)
    }

    fn set_acceleration(&mut self, accelerations: &AxisValues) -> Result<()> {
        let line = protocol::format_axis_command(CMD_SET_ACCELERATION, accelerations)?;
        self.command(&line)
    }

    fn move_relative(&mut self, distances: &AxisValues) -> Result<()> {
        debug!("Relative move: {:?}", distances);
        let line = protocol::format_axis_command(CMD_MOVE_RELATIVE, distances)?;
        self.command(&line)
    }

    fn move_absolute(&mut self, positions: &AxisValues) -> Result<()> {
        debug!("Absolute move: {:?}", positions);
        let line = protocol::format_axis_command(CMD_MOVE_ABSOLUTE, positions)?;
        self.command(&line)
    }

    fn home(&mut self, axes: &[usize]) -> Result<AxisValues> {
        info!("Homing axes {:?}", axes);
        let line = protocol::format_home_command(axes)?;
        self.command(&line)?;

        // The device is not read back after homing; report the homed
        // position as 0.0 for each requested axis
        Ok(axes.iter().map(|&axis| (axis, 0.0)).collect())
    }

    fn current_positions(&mut self) -> Result<Vec<f64>> {
        self.query_axis_values(QUERY_POSITIONS)
    }

    fn is_moving(&mut self) -> Result<bool> {
        let reply = self.exchange(QUERY_STATUS)?;
        Ok(reply == REPLY_MOVING)
    }

    fn endstop_minimums(&mut self) -> Result<Vec<f64>> {
        self.query_axis_values(QUERY_ENDSTOP_MIN)
    }

    fn endstop_maximums(&mut self) -> Result<Vec<f64>> {
        self.query_axis_values(QUERY_ENDSTOP_MAX)
    }
}
