//! Mutable simulation state of one emulated camera.

use std::fmt;
use std::time::Instant;

/// Travel limit shared by every axis, in device units.
pub const AXIS_LIMIT: i32 = 0xE500;

/// One continuous degree of freedom.
///
/// `position` and `speed` are kept inside their ranges by clamping on every
/// mutation; commands never fail because a value is out of range.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    position: f64,
    speed: i32,
    position_min: i32,
    position_max: i32,
    speed_min: i32,
    speed_max: i32,
}

impl Axis {
    /// Create a stopped axis at the position closest to zero.
    pub fn new(position_range: (i32, i32), speed_range: (i32, i32)) -> Self {
        let (position_min, position_max) = position_range;
        let (speed_min, speed_max) = speed_range;
        let mut axis = Self {
            position: 0.0,
            speed: 0,
            position_min,
            position_max,
            speed_min,
            speed_max,
        };
        axis.set_position(0.0);
        axis.set_speed(0);
        axis
    }

    /// Position in device units, including any fractional travel.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Position as placed on the wire (truncated toward zero).
    pub fn wire_position(&self) -> i64 {
        self.position.trunc() as i64
    }

    /// Speed in device units per second.
    pub fn speed(&self) -> i32 {
        self.speed
    }

    pub fn position_range(&self) -> (i32, i32) {
        (self.position_min, self.position_max)
    }

    pub fn speed_range(&self) -> (i32, i32) {
        (self.speed_min, self.speed_max)
    }

    pub fn set_position(&mut self, position: f64) {
        self.position = position.clamp(f64::from(self.position_min), f64::from(self.position_max));
    }

    pub fn set_speed(&mut self, speed: i32) {
        self.speed = speed.clamp(self.speed_min, self.speed_max);
    }

    /// Stop and return to the origin.
    pub fn home(&mut self) {
        self.set_position(0.0);
        self.set_speed(0);
    }

    /// Move at the current speed for `seconds`.
    pub fn advance(&mut self, seconds: f64) {
        self.set_position(self.position + f64::from(self.speed) * seconds);
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:8.1}{:+03}", self.position, self.speed)
    }
}

/// Full state of an emulated camera.
///
/// Created with defaults when a connection opens and dropped when it closes.
/// The scalar settings are plain data: handlers store them and inquiries
/// echo them back.
#[derive(Debug, Clone)]
pub struct DeviceState {
    pub pan: Axis,
    pub tilt: Axis,
    pub zoom: Axis,
    pub focus: Axis,
    pub zoom_near_limit: i32,

    pub power: bool,
    pub r_gain: u8,
    pub b_gain: u8,
    pub wb_mode: u8,
    pub aperture_gain: u8,
    pub exposure_mode: u8,
    pub shutter_pos: u8,
    pub iris_pos: u8,
    pub gain_pos: u8,
    pub bright_pos: u8,
    pub exposure_comp_pos: u8,
    pub picture_effect_mode: u8,
    pub camera_id: u16,
    pub pal_system: bool,
    pub gamma: u8,
    pub high_sensitivity: bool,
    pub nr_level: u8,
    pub chroma_suppress: u8,
    pub gain_limit: u8,
    pub digital_zoom_pos: u8,
    pub af_activation_time: u8,
    pub af_interval_time: u8,
    pub defog: bool,
    pub color_hue: u8,

    last_update: Instant,
}

impl DeviceState {
    /// Power-on defaults, with the motion clock starting at `now`.
    pub fn new(now: Instant) -> Self {
        let symmetric = (-AXIS_LIMIT, AXIS_LIMIT);
        let forward = (0, AXIS_LIMIT);
        Self {
            pan: Axis::new(symmetric, symmetric),
            tilt: Axis::new(symmetric, symmetric),
            zoom: Axis::new(forward, symmetric),
            focus: Axis::new(forward, symmetric),
            zoom_near_limit: 0,
            power: true,
            r_gain: 0,
            b_gain: 0,
            wb_mode: 0,
            aperture_gain: 0,
            exposure_mode: 0,
            shutter_pos: 0,
            iris_pos: 0,
            gain_pos: 0,
            bright_pos: 0,
            exposure_comp_pos: 0,
            picture_effect_mode: 0,
            camera_id: 0xFEDC,
            pal_system: true,
            gamma: 0,
            high_sensitivity: false,
            nr_level: 0,
            chroma_suppress: 0,
            gain_limit: 0,
            digital_zoom_pos: 0,
            af_activation_time: 5,
            af_interval_time: 7,
            defog: false,
            color_hue: 9,
            last_update: now,
        }
    }

    /// When the motion model was last brought up to date.
    pub fn last_update(&self) -> Instant {
        self.last_update
    }

    pub(crate) fn set_last_update(&mut self, now: Instant) {
        self.last_update = now;
    }

    pub fn axes_mut(&mut self) -> [&mut Axis; 4] {
        [
            &mut self.pan,
            &mut self.tilt,
            &mut self.zoom,
            &mut self.focus,
        ]
    }

    /// Compact one-line view of the four axes for logging.
    pub fn axes_summary(&self) -> AxesSummary<'_> {
        AxesSummary(self)
    }
}

/// `Display` adapter returned by [`DeviceState::axes_summary`].
pub struct AxesSummary<'a>(&'a DeviceState);

impl fmt::Display for AxesSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        write!(f, "[{}, {}, {}, {}]", s.pan, s.tilt, s.zoom, s.focus)
    }
}
