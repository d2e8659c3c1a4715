use crate::error::ServoError;

/// Capability implemented by each concrete servo controller driver.
///
/// Positions are raw pulse-domain values: a reading of 0 means the motor is
/// not being actively driven, and writing 0 tells the driver to stop driving
/// and assume its own neutral state. Calls may block on bus I/O; the core
/// holds the owning motor's lock for the duration, so a hung driver blocks
/// that motor's caller.
pub trait ServoDriver: Send + 'static {
    fn name(&self) -> String;
    fn get_position(&mut self) -> Result<i32, ServoError>;
    fn set_position(&mut self, pulse: i32) -> Result<(), ServoError>;

    fn get_rate(&mut self) -> Result<i32, ServoError> {
        Err(ServoError::NotSupported)
    }

    fn set_rate(&mut self, _value: i32) -> Result<(), ServoError> {
        Err(ServoError::NotSupported)
    }
}
