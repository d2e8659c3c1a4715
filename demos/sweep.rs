use std::sync::{Arc, Mutex};

use servo_motor_class::{attrs, Command, ServoAttribute, ServoDriver, ServoError, ServoMotorClass};

#[derive(Clone, Default)]
struct SimDriver {
    raw: Arc<Mutex<i32>>,
}

impl ServoDriver for SimDriver {
    fn name(&self) -> String {
        "sim-servo".to_string()
    }

    fn get_position(&mut self) -> Result<i32, ServoError> {
        Ok(*self.raw.lock().unwrap())
    }

    fn set_position(&mut self, pulse: i32) -> Result<(), ServoError> {
        *self.raw.lock().unwrap() = pulse;
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let class = ServoMotorClass::new();
    let driver = SimDriver::default();
    let motor = class.register(Box::new(driver.clone()), "sim-board.0", "outA")?;

    println!(
        "registered {} ({}) on {}",
        motor.device_name(),
        motor.name(),
        motor.port_name()
    );

    motor.set_command(Command::Run)?;
    for percent in [-100, -50, 0, 50, 100] {
        motor.set_position(percent)?;
        println!(
            "commanded {percent:>4}% -> pulse {} -> reads back {}%",
            *driver.raw.lock().unwrap(),
            motor.position()?
        );
    }

    motor.set_command(Command::Float)?;
    println!(
        "floating, stored position still {}%",
        attrs::show(&motor, ServoAttribute::Position)?
    );

    class.unregister(&motor)?;
    Ok(())
}
