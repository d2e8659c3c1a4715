use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::driver::ServoDriver;
use crate::error::ServoError;
use crate::model::Command;
use crate::motor::ServoMotor;

/// Lifecycle notification emitted when a motor is bound or released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassEvent {
    Registered {
        device_name: String,
        name: String,
        port_name: String,
    },
    Unregistered {
        device_name: String,
    },
}

/// Registry of live servo motors.
///
/// Concrete drivers register themselves here and get back a shared
/// `ServoMotor` handle. Display names are `motor<N>` with `N` taken from a
/// counter owned by this instance; the number only reflects load order, not
/// which port the motor is plugged in to.
#[derive(Default)]
pub struct ServoMotorClass {
    next_id: AtomicU32,
    motors: Mutex<HashMap<String, Arc<ServoMotor>>>,
    subscribers: Mutex<Vec<mpsc::Sender<ClassEvent>>>,
}

impl ServoMotorClass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a driver, producing a live motor with the default pulse
    /// calibration.
    ///
    /// The initial command is derived from the driver's raw reading: nonzero
    /// pulse means `Run`, zero means `Float`. The raw reading cannot tell a
    /// motor that was left running apart from one floating at a previously
    /// commanded position, so the derivation is a heuristic. A failing
    /// driver read fails the registration.
    pub fn register(
        &self,
        mut driver: Box<dyn ServoDriver>,
        parent: &str,
        port_name: &str,
    ) -> Result<Arc<ServoMotor>, ServoError> {
        if parent.is_empty() || port_name.is_empty() {
            return Err(ServoError::InvalidArgument);
        }

        let raw = driver.get_position()?;
        let command = Command::from_raw_pulse(raw);
        let name = driver.name();
        let device_name = format!("motor{}", self.next_id.fetch_add(1, Ordering::Relaxed));

        let motor = Arc::new(ServoMotor::new(
            device_name.clone(),
            name.clone(),
            port_name.to_string(),
            command,
            driver,
        ));
        self.motors
            .lock()
            .map_err(|_| ServoError::Closed)?
            .insert(device_name.clone(), Arc::clone(&motor));

        info!(motor = %device_name, driver = %name, "bound to device '{parent}'");
        self.emit(ClassEvent::Registered {
            device_name,
            name,
            port_name: port_name.to_string(),
        });

        Ok(motor)
    }

    /// Releases a motor. Every subsequent operation on the handle fails with
    /// `Closed`. Fails with `Closed` if the motor is not (or no longer)
    /// registered here.
    pub fn unregister(&self, motor: &Arc<ServoMotor>) -> Result<(), ServoError> {
        let removed = self
            .motors
            .lock()
            .map_err(|_| ServoError::Closed)?
            .remove(motor.device_name());

        match removed {
            Some(motor) => {
                motor.release();
                info!(motor = %motor.device_name(), "unregistered");
                self.emit(ClassEvent::Unregistered {
                    device_name: motor.device_name().to_string(),
                });
                Ok(())
            }
            None => Err(ServoError::Closed),
        }
    }

    /// Opens a lifecycle event stream. Delivery is best-effort: a subscriber
    /// whose queue is full misses the event, a dropped receiver is pruned on
    /// the next emission.
    pub fn subscribe(&self, capacity: usize) -> mpsc::Receiver<ClassEvent> {
        let (tx, rx) = mpsc::channel(capacity);
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    fn emit(&self, event: ClassEvent) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|tx| match tx.try_send(event.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("subscriber queue full, class event dropped");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            });
        }
    }

    pub fn get(&self, device_name: &str) -> Option<Arc<ServoMotor>> {
        self.motors
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(device_name)
            .cloned()
    }

    pub fn motors(&self) -> Vec<Arc<ServoMotor>> {
        self.motors
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .values()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.motors.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
