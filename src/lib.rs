pub mod attrs;
pub mod class;
pub mod conversion;
pub mod driver;
pub mod error;
pub mod model;
pub mod motor;

pub use attrs::ServoAttribute;
pub use class::{ClassEvent, ServoMotorClass};
pub use driver::ServoDriver;
pub use error::ServoError;
pub use model::{Command, Polarity, PulseConfig};
pub use motor::{ServoMotor, ServoSnapshot};
