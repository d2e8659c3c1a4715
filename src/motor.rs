use std::fmt;
use std::sync::{Mutex, MutexGuard};

use crate::conversion::scale;
use crate::driver::ServoDriver;
use crate::error::ServoError;
use crate::model::{
    Command, Polarity, PulseConfig, MAX_PULSE_MS_RANGE, MID_PULSE_MS_RANGE, MIN_PULSE_MS_RANGE,
    POSITION_RANGE,
};

/// Consistent copy of a motor's control state, taken under its lock.
#[derive(Debug, Clone, Copy)]
pub struct ServoSnapshot {
    pub command: Command,
    pub polarity: Polarity,
    pub position: i32,
    pub pulse_config: PulseConfig,
}

struct Inner {
    config: PulseConfig,
    polarity: Polarity,
    command: Command,
    position: i32,
    released: bool,
    driver: Box<dyn ServoDriver>,
}

/// A registered servo motor.
///
/// All mutable state and the driver sit behind one mutex, so each public
/// operation is atomic end-to-end including the driver call it may trigger.
/// Driver calls are bus I/O and may block; a hung driver therefore blocks
/// callers of this motor (and only this motor) indefinitely. Setters that
/// also call the driver write the stored state first and do not roll it
/// back on a driver failure.
pub struct ServoMotor {
    device_name: String,
    name: String,
    port_name: String,
    inner: Mutex<Inner>,
}

impl fmt::Debug for ServoMotor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServoMotor")
            .field("device_name", &self.device_name)
            .field("name", &self.name)
            .field("port_name", &self.port_name)
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn apply(&mut self, new_position: i32, new_polarity: Polarity) -> Result<(), ServoError> {
        self.polarity = new_polarity;
        self.position = new_position;

        if self.command == Command::Run {
            let p = match new_polarity {
                Polarity::Normal => new_position,
                Polarity::Inverted => -new_position,
            };
            let pulse = if p > 0 {
                scale(0, 100, self.config.mid_pulse_ms, self.config.max_pulse_ms, p)
            } else {
                scale(-100, 0, self.config.min_pulse_ms, self.config.mid_pulse_ms, p)
            };
            return self.driver.set_position(pulse);
        }
        Ok(())
    }
}

impl ServoMotor {
    pub(crate) fn new(
        device_name: String,
        name: String,
        port_name: String,
        command: Command,
        driver: Box<dyn ServoDriver>,
    ) -> Self {
        Self {
            device_name,
            name,
            port_name,
            inner: Mutex::new(Inner {
                config: PulseConfig::default(),
                polarity: Polarity::Normal,
                command,
                position: 0,
                released: false,
                driver,
            }),
        }
    }

    /// Display name assigned at registration, `motor<N>`.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Identity string reported by the driver.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label of the physical port the motor is connected to.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, ServoError> {
        let inner = self.inner.lock().map_err(|_| ServoError::Closed)?;
        if inner.released {
            return Err(ServoError::Closed);
        }
        Ok(inner)
    }

    pub(crate) fn release(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.released = true;
        }
    }

    pub fn snapshot(&self) -> Result<ServoSnapshot, ServoError> {
        let inner = self.lock()?;
        Ok(ServoSnapshot {
            command: inner.command,
            polarity: inner.polarity,
            position: inner.position,
            pulse_config: inner.config,
        })
    }

    /// Reads the current position as a percentage.
    ///
    /// A raw reading of 0 means the motor is not being actively driven, in
    /// which case the last stored position is reported. Other readings are
    /// mapped back through the pulse calibration.
    pub fn position(&self) -> Result<i32, ServoError> {
        let mut inner = self.lock()?;
        let raw = inner.driver.get_position()?;
        if raw == 0 {
            Ok(inner.position)
        } else if raw < inner.config.mid_pulse_ms {
            Ok(scale(inner.config.min_pulse_ms, inner.config.mid_pulse_ms, -100, 0, raw))
        } else {
            Ok(scale(inner.config.mid_pulse_ms, inner.config.max_pulse_ms, 0, 100, raw))
        }
    }

    /// Stores `new_position` (percent, -100 to 100) and, when the command is
    /// `Run`, drives the motor there. While floating the value is only
    /// recorded, to take effect on the next `Run` transition.
    pub fn set_position(&self, new_position: i32) -> Result<(), ServoError> {
        if !POSITION_RANGE.contains(&new_position) {
            return Err(ServoError::InvalidArgument);
        }
        let mut inner = self.lock()?;
        if inner.position == new_position {
            return Ok(());
        }
        let polarity = inner.polarity;
        inner.apply(new_position, polarity)
    }

    pub fn set_polarity(&self, new_polarity: Polarity) -> Result<(), ServoError> {
        let mut inner = self.lock()?;
        if inner.polarity == new_polarity {
            return Ok(());
        }
        let position = inner.position;
        inner.apply(position, new_polarity)
    }

    /// Switches between `Run` and `Float`. Entering `Run` drives the motor to
    /// the stored position; entering `Float` tells the driver to assume its
    /// neutral state (pulse 0) without touching the stored percentage. The
    /// command field is updated before the driver call.
    pub fn set_command(&self, new_command: Command) -> Result<(), ServoError> {
        let mut inner = self.lock()?;
        if inner.command == new_command {
            return Ok(());
        }
        inner.command = new_command;
        match new_command {
            Command::Run => {
                let (position, polarity) = (inner.position, inner.polarity);
                inner.apply(position, polarity)
            }
            Command::Float => inner.driver.set_position(0),
        }
    }

    /// Stores a new minimum pulse width. The motor is not moved; the new
    /// bound applies from the next position write or read.
    pub fn set_min_pulse_ms(&self, value: i32) -> Result<(), ServoError> {
        if !MIN_PULSE_MS_RANGE.contains(&value) {
            return Err(ServoError::InvalidArgument);
        }
        self.lock()?.config.min_pulse_ms = value;
        Ok(())
    }

    pub fn set_mid_pulse_ms(&self, value: i32) -> Result<(), ServoError> {
        if !MID_PULSE_MS_RANGE.contains(&value) {
            return Err(ServoError::InvalidArgument);
        }
        self.lock()?.config.mid_pulse_ms = value;
        Ok(())
    }

    pub fn set_max_pulse_ms(&self, value: i32) -> Result<(), ServoError> {
        if !MAX_PULSE_MS_RANGE.contains(&value) {
            return Err(ServoError::InvalidArgument);
        }
        self.lock()?.config.max_pulse_ms = value;
        Ok(())
    }

    /// Travel rate pass-through; fails with `NotSupported` on drivers
    /// without the capability.
    pub fn rate(&self) -> Result<i32, ServoError> {
        self.lock()?.driver.get_rate()
    }

    pub fn set_rate(&self, value: i32) -> Result<(), ServoError> {
        self.lock()?.driver.set_rate(value)
    }
}
