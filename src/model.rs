use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ServoError;

/// Drive state of a servo. `Run` holds the motor at the stored position,
/// `Float` removes drive (the driver is told pulse 0, its own neutral).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Run,
    Float,
}

impl Command {
    /// Derives the drive state from a driver's raw pulse reading. A nonzero
    /// pulse is taken to mean the motor is being actively driven; this cannot
    /// distinguish "left running" from "floating at a previously commanded
    /// position" (the raw reading alone does not carry that information).
    pub fn from_raw_pulse(raw: i32) -> Self {
        if raw != 0 {
            Command::Run
        } else {
            Command::Float
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Run => write!(f, "run"),
            Command::Float => write!(f, "float"),
        }
    }
}

impl FromStr for Command {
    type Err = ServoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "run" => Ok(Command::Run),
            "float" => Ok(Command::Float),
            _ => Err(ServoError::InvalidArgument),
        }
    }
}

/// `Inverted` negates the requested percentage before scaling, so -100 maps
/// to the maximum pulse and 100 to the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Normal,
    Inverted,
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Normal => write!(f, "normal"),
            Polarity::Inverted => write!(f, "inverted"),
        }
    }
}

impl FromStr for Polarity {
    type Err = ServoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Polarity::Normal),
            "inverted" => Ok(Polarity::Inverted),
            _ => Err(ServoError::InvalidArgument),
        }
    }
}

pub const MIN_PULSE_MS_RANGE: RangeInclusive<i32> = 300..=700;
pub const MID_PULSE_MS_RANGE: RangeInclusive<i32> = 1300..=1700;
pub const MAX_PULSE_MS_RANGE: RangeInclusive<i32> = 2300..=2700;

pub const POSITION_RANGE: RangeInclusive<i32> = -100..=100;

/// Pulse calibration in milliseconds. `min_pulse_ms` drives the servo to the
/// minimum (counter-clockwise) position, `mid_pulse_ms` to the mid position
/// and `max_pulse_ms` to the maximum (clockwise) position.
///
/// Each field is validated only against its own range; the setters do not
/// check `min < mid < max` across fields, so a caller can produce a config
/// the scaling cannot make sense of. Keeping the fields ordered is the
/// caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseConfig {
    pub min_pulse_ms: i32,
    pub mid_pulse_ms: i32,
    pub max_pulse_ms: i32,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            min_pulse_ms: 600,
            mid_pulse_ms: 1500,
            max_pulse_ms: 2400,
        }
    }
}
