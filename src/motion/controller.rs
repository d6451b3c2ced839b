// Motion-controller capability contract
//
// Any device driver usable by the host implements this trait. The driver is
// not thread-safe: every operation blocks for at most one write and one read
// on the underlying transport, and callers must serialize access.

use std::collections::BTreeMap;

use crate::motion::protocol::Result;

/// Per-axis values keyed by axis index (position, velocity, acceleration or
/// offset depending on the operation)
pub type AxisValues = BTreeMap<usize, f64>;

pub trait MotionController {
    /// Open the device link. Settings declared pre-connect must be populated
    /// before this is called; post-connect settings are valid afterwards.
    fn connect(&mut self) -> Result<()>;

    /// Close the device link and reset post-connect settings.
    fn disconnect(&mut self) -> Result<()>;

    /// One-letter display name per axis, in axis-index order.
    fn axis_display_names(&self) -> &'static [&'static str];

    /// Unit string per axis, in axis-index order.
    fn axis_units(&self) -> Vec<&'static str>;

    /// Set per-axis velocities.
    fn set_velocity(&mut self, velocities: &AxisValues) -> Result<()>;

    /// Set per-axis accelerations.
    fn set_acceleration(&mut self, accelerations: &AxisValues) -> Result<()>;

    /// Move each given axis by a relative distance.
    fn move_relative(&mut self, distances: &AxisValues) -> Result<()>;

    /// Move each given axis to an absolute position.
    fn move_absolute(&mut self, positions: &AxisValues) -> Result<()>;

    /// Home the given axes. Returns the assumed post-home position (0.0) per
    /// requested axis; the device is not read back.
    fn home(&mut self, axes: &[usize]) -> Result<AxisValues>;

    /// Current position per axis, in axis-index order.
    fn current_positions(&mut self) -> Result<Vec<f64>>;

    /// Whether any axis is currently in motion.
    fn is_moving(&mut self) -> Result<bool>;

    /// Minimum endstop position per axis, in axis-index order.
    fn endstop_minimums(&mut self) -> Result<Vec<f64>>;

    /// Maximum endstop position per axis, in axis-index order.
    fn endstop_maximums(&mut self) -> Result<Vec<f64>>;
}
