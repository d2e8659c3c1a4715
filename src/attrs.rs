use crate::error::ServoError;
use crate::model::{Command, Polarity};
use crate::motor::ServoMotor;

/// The named, string-encoded accessors a motor exposes: `name` and
/// `port_name` are read-only, the rest read/write. `rate` may be
/// unsupported by the underlying driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoAttribute {
    Name,
    PortName,
    MinPulseMs,
    MidPulseMs,
    MaxPulseMs,
    Command,
    Polarity,
    Position,
    Rate,
}

impl ServoAttribute {
    pub const ALL: [ServoAttribute; 9] = [
        ServoAttribute::Name,
        ServoAttribute::PortName,
        ServoAttribute::MinPulseMs,
        ServoAttribute::MidPulseMs,
        ServoAttribute::MaxPulseMs,
        ServoAttribute::Command,
        ServoAttribute::Polarity,
        ServoAttribute::Position,
        ServoAttribute::Rate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ServoAttribute::Name => "name",
            ServoAttribute::PortName => "port_name",
            ServoAttribute::MinPulseMs => "min_pulse_ms",
            ServoAttribute::MidPulseMs => "mid_pulse_ms",
            ServoAttribute::MaxPulseMs => "max_pulse_ms",
            ServoAttribute::Command => "command",
            ServoAttribute::Polarity => "polarity",
            ServoAttribute::Position => "position",
            ServoAttribute::Rate => "rate",
        }
    }

    pub fn is_writable(self) -> bool {
        !matches!(self, ServoAttribute::Name | ServoAttribute::PortName)
    }
}

fn parse_int(text: &str) -> Result<i32, ServoError> {
    text.trim().parse().map_err(|_| ServoError::InvalidArgument)
}

/// Reads an attribute as its string encoding.
pub fn show(motor: &ServoMotor, attr: ServoAttribute) -> Result<String, ServoError> {
    match attr {
        // snapshot() doubles as the released check for the identity fields
        ServoAttribute::Name => motor.snapshot().map(|_| motor.name().to_string()),
        ServoAttribute::PortName => motor.snapshot().map(|_| motor.port_name().to_string()),
        ServoAttribute::MinPulseMs => Ok(motor.snapshot()?.pulse_config.min_pulse_ms.to_string()),
        ServoAttribute::MidPulseMs => Ok(motor.snapshot()?.pulse_config.mid_pulse_ms.to_string()),
        ServoAttribute::MaxPulseMs => Ok(motor.snapshot()?.pulse_config.max_pulse_ms.to_string()),
        ServoAttribute::Command => Ok(motor.snapshot()?.command.to_string()),
        ServoAttribute::Polarity => Ok(motor.snapshot()?.polarity.to_string()),
        ServoAttribute::Position => Ok(motor.position()?.to_string()),
        ServoAttribute::Rate => Ok(motor.rate()?.to_string()),
    }
}

/// Writes an attribute from its string encoding. Unparseable text and
/// writes to read-only attributes fail with `InvalidArgument` before any
/// motor state is touched.
pub fn store(motor: &ServoMotor, attr: ServoAttribute, text: &str) -> Result<(), ServoError> {
    match attr {
        ServoAttribute::Name | ServoAttribute::PortName => Err(ServoError::InvalidArgument),
        ServoAttribute::MinPulseMs => motor.set_min_pulse_ms(parse_int(text)?),
        ServoAttribute::MidPulseMs => motor.set_mid_pulse_ms(parse_int(text)?),
        ServoAttribute::MaxPulseMs => motor.set_max_pulse_ms(parse_int(text)?),
        ServoAttribute::Command => motor.set_command(text.trim().parse::<Command>()?),
        ServoAttribute::Polarity => motor.set_polarity(text.trim().parse::<Polarity>()?),
        ServoAttribute::Position => motor.set_position(parse_int(text)?),
        ServoAttribute::Rate => motor.set_rate(parse_int(text)?),
    }
}
