use std::sync::{Arc, Mutex};

use servo_motor_class::{Command, Polarity, ServoDriver, ServoError, ServoMotor, ServoMotorClass};

#[derive(Default)]
struct DriverState {
    raw: i32,
    pulses: Vec<i32>,
    fail_set_position: bool,
}

/// Records every commanded pulse and reports the last one as the raw
/// reading, like a controller that holds its output.
#[derive(Clone, Default)]
struct BenchDriver {
    state: Arc<Mutex<DriverState>>,
}

impl BenchDriver {
    fn with_raw(raw: i32) -> Self {
        let driver = Self::default();
        driver.state.lock().unwrap().raw = raw;
        driver
    }

    fn pulses(&self) -> Vec<i32> {
        self.state.lock().unwrap().pulses.clone()
    }

    fn fail_writes(&self) {
        self.state.lock().unwrap().fail_set_position = true;
    }
}

impl ServoDriver for BenchDriver {
    fn name(&self) -> String {
        "bench-servo".to_string()
    }

    fn get_position(&mut self) -> Result<i32, ServoError> {
        Ok(self.state.lock().unwrap().raw)
    }

    fn set_position(&mut self, pulse: i32) -> Result<(), ServoError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_set_position {
            return Err(ServoError::Driver(5));
        }
        state.pulses.push(pulse);
        state.raw = pulse;
        Ok(())
    }
}

fn register(driver: BenchDriver) -> Arc<ServoMotor> {
    ServoMotorClass::new()
        .register(Box::new(driver), "pwm-ctl.0", "outA")
        .unwrap()
}

#[test]
fn initial_command_derived_from_raw_reading() {
    let floating = register(BenchDriver::with_raw(0));
    assert_eq!(floating.snapshot().unwrap().command, Command::Float);

    let running = register(BenchDriver::with_raw(1800));
    assert_eq!(running.snapshot().unwrap().command, Command::Run);
}

#[test]
fn float_to_run_drives_stored_position() {
    let driver = BenchDriver::with_raw(0);
    let motor = register(driver.clone());

    motor.set_position(50).unwrap();
    assert!(driver.pulses().is_empty());

    motor.set_command(Command::Run).unwrap();
    assert_eq!(driver.pulses(), vec![1950]);
}

#[test]
fn run_to_float_sends_neutral_and_keeps_position() {
    let driver = BenchDriver::with_raw(1950);
    let motor = register(driver.clone());

    motor.set_command(Command::Float).unwrap();
    assert_eq!(driver.pulses(), vec![0]);
    assert_eq!(motor.snapshot().unwrap().position, 0);
}

#[test]
fn self_transitions_touch_nothing() {
    let driver = BenchDriver::with_raw(1800);
    let motor = register(driver.clone());

    motor.set_command(Command::Run).unwrap();
    motor.set_polarity(Polarity::Normal).unwrap();
    motor.set_position(0).unwrap();
    assert!(driver.pulses().is_empty());
}

#[test]
fn inverted_polarity_negates_the_percentage() {
    let driver = BenchDriver::with_raw(0);
    let motor = register(driver.clone());

    motor.set_command(Command::Run).unwrap();
    motor.set_polarity(Polarity::Inverted).unwrap();
    motor.set_position(40).unwrap();
    assert_eq!(driver.pulses().last(), Some(&1140));
}

#[test]
fn position_rejects_out_of_range_values() {
    let driver = BenchDriver::with_raw(0);
    let motor = register(driver.clone());
    motor.set_position(25).unwrap();

    assert_eq!(motor.set_position(150), Err(ServoError::InvalidArgument));
    assert_eq!(motor.set_position(-101), Err(ServoError::InvalidArgument));
    assert_eq!(motor.snapshot().unwrap().position, 25);
    assert!(driver.pulses().is_empty());
}

#[test]
fn pulse_bounds_validated_per_field() {
    let motor = register(BenchDriver::with_raw(0));

    assert_eq!(motor.set_min_pulse_ms(250), Err(ServoError::InvalidArgument));
    assert_eq!(motor.set_mid_pulse_ms(1800), Err(ServoError::InvalidArgument));
    assert_eq!(motor.set_max_pulse_ms(2800), Err(ServoError::InvalidArgument));

    let config = motor.snapshot().unwrap().pulse_config;
    assert_eq!(
        (config.min_pulse_ms, config.mid_pulse_ms, config.max_pulse_ms),
        (600, 1500, 2400)
    );

    motor.set_min_pulse_ms(300).unwrap();
    motor.set_mid_pulse_ms(1700).unwrap();
    motor.set_max_pulse_ms(2300).unwrap();
}

#[test]
fn new_bounds_apply_on_next_position_write() {
    let driver = BenchDriver::with_raw(0);
    let motor = register(driver.clone());
    motor.set_command(Command::Run).unwrap();
    assert_eq!(driver.pulses(), vec![1500]);

    // changing a bound must not move the motor by itself
    motor.set_max_pulse_ms(2700).unwrap();
    assert_eq!(driver.pulses(), vec![1500]);

    motor.set_position(100).unwrap();
    assert_eq!(driver.pulses(), vec![1500, 2700]);
}

#[test]
fn position_read_round_trips_while_running() {
    let driver = BenchDriver::with_raw(0);
    let motor = register(driver.clone());
    motor.set_command(Command::Run).unwrap();

    for p in [-100, -40, 0, 37, 50, 100] {
        motor.set_position(p).unwrap();
        assert_eq!(motor.position().unwrap(), p, "round trip of {p}");
    }
}

#[test]
fn position_read_falls_back_to_stored_value_when_not_driven() {
    let driver = BenchDriver::with_raw(0);
    let motor = register(driver.clone());

    motor.set_position(60).unwrap();
    assert_eq!(motor.position().unwrap(), 60);
    assert!(driver.pulses().is_empty());

    motor.set_command(Command::Run).unwrap();
    assert_eq!(driver.pulses(), vec![2040]);
}

#[test]
fn state_is_kept_when_the_driver_call_fails() {
    let driver = BenchDriver::with_raw(1500);
    let motor = register(driver.clone());
    driver.fail_writes();

    assert_eq!(motor.set_command(Command::Float), Err(ServoError::Driver(5)));
    assert_eq!(motor.snapshot().unwrap().command, Command::Float);

    assert_eq!(motor.set_command(Command::Run), Err(ServoError::Driver(5)));
    assert_eq!(motor.set_position(10), Err(ServoError::Driver(5)));
    assert_eq!(motor.snapshot().unwrap().position, 10);
}

#[test]
fn rate_unsupported_by_default() {
    let motor = register(BenchDriver::with_raw(0));
    assert_eq!(motor.rate(), Err(ServoError::NotSupported));
    assert_eq!(motor.set_rate(500), Err(ServoError::NotSupported));
}

#[test]
fn rate_passes_through_when_the_driver_has_it() {
    #[derive(Clone, Default)]
    struct RampDriver {
        rate: Arc<Mutex<i32>>,
    }

    impl ServoDriver for RampDriver {
        fn name(&self) -> String {
            "ramp-servo".to_string()
        }
        fn get_position(&mut self) -> Result<i32, ServoError> {
            Ok(0)
        }
        fn set_position(&mut self, _pulse: i32) -> Result<(), ServoError> {
            Ok(())
        }
        fn get_rate(&mut self) -> Result<i32, ServoError> {
            Ok(*self.rate.lock().unwrap())
        }
        fn set_rate(&mut self, value: i32) -> Result<(), ServoError> {
            *self.rate.lock().unwrap() = value;
            Ok(())
        }
    }

    let driver = RampDriver::default();
    let motor = ServoMotorClass::new()
        .register(Box::new(driver), "pwm-ctl.0", "outB")
        .unwrap();

    motor.set_rate(700).unwrap();
    assert_eq!(motor.rate().unwrap(), 700);
}
