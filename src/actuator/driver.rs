// Feetech-backed actuator handles
//
// Binds the configured bus IDs to concrete `DriveActuator` /
// `SteeringActuator` implementations. A bank is built fresh on every
// (re)configuration; handles are never accumulated across rebinds.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::feetech::{FeetechBus, FeetechError, OperatingMode};
use super::{ActuatorError, DriveActuator, SteeringActuator};
use crate::config::BaseConfig;

/// Motor resolution: 4096 steps per revolution
const STEPS_PER_REVOLUTION: f64 = 4096.0;
const STEPS_PER_DEG: f64 = STEPS_PER_REVOLUTION / 360.0;

/// Raw velocity ticks at full normalized power (safety limit)
const FULL_POWER_RAW: f64 = 3000.0;

/// A wheel motor in velocity mode.
pub struct FeetechDriveMotor {
    bus: Arc<FeetechBus>,
    id: u8,
    name: String,
}

impl FeetechDriveMotor {
    pub fn new(bus: Arc<FeetechBus>, id: u8) -> Self {
        Self {
            bus,
            id,
            name: format!("drive-motor-{}", id),
        }
    }
}

#[async_trait]
impl DriveActuator for FeetechDriveMotor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn set_power(&self, power: f64) -> Result<(), ActuatorError> {
        let raw = (power.clamp(-1.0, 1.0) * FULL_POWER_RAW).round() as i16;
        debug!("Motor {} power {} -> raw {}", self.id, power, raw);
        self.bus.set_goal_velocity(self.id, raw)?;
        Ok(())
    }

    async fn stop(&self) -> Result<(), ActuatorError> {
        self.bus.set_goal_velocity(self.id, 0)?;
        Ok(())
    }

    async fn is_moving(&self) -> Result<bool, ActuatorError> {
        Ok(self.bus.is_moving(self.id)?)
    }
}

/// A steering servo in position mode. Positions are commanded in degrees
/// and converted to ticks at the servo resolution.
pub struct FeetechSteeringServo {
    bus: Arc<FeetechBus>,
    id: u8,
    name: String,
}

impl FeetechSteeringServo {
    pub fn new(bus: Arc<FeetechBus>, id: u8) -> Self {
        Self {
            bus,
            id,
            name: format!("steering-servo-{}", id),
        }
    }
}

#[async_trait]
impl SteeringActuator for FeetechSteeringServo {
    fn name(&self) -> &str {
        &self.name
    }

    async fn move_to(&self, position: i64) -> Result<(), ActuatorError> {
        let ticks = (position as f64 * STEPS_PER_DEG)
            .round()
            .clamp(0.0, STEPS_PER_REVOLUTION - 1.0) as u16;
        debug!("Servo {} position {} -> ticks {}", self.id, position, ticks);
        self.bus.set_goal_position(self.id, ticks)?;
        Ok(())
    }
}

/// The resolved actuator handles for one configuration.
pub struct ActuatorBank {
    pub motors: Vec<Arc<dyn DriveActuator>>,
    pub front_servo: Option<Arc<dyn SteeringActuator>>,
    pub rear_servo: Option<Arc<dyn SteeringActuator>>,
}

impl ActuatorBank {
    /// Build a fresh bank from the configured IDs.
    pub fn bind(bus: Arc<FeetechBus>, config: &BaseConfig) -> Self {
        let motors = config
            .drive_motors
            .iter()
            .map(|&id| Arc::new(FeetechDriveMotor::new(bus.clone(), id)) as Arc<dyn DriveActuator>)
            .collect();

        let bind_servo = |id: u8| {
            Arc::new(FeetechSteeringServo::new(bus.clone(), id)) as Arc<dyn SteeringActuator>
        };

        Self {
            motors,
            front_servo: config.steering_servo_front.map(bind_servo),
            rear_servo: config.steering_servo_rear.map(bind_servo),
        }
    }
}

/// Bring every configured actuator into its operating mode.
///
/// Pings each ID, then with torque disabled sets velocity mode on the wheel
/// motors and position mode on the steering servos, and re-enables torque.
pub fn initialize(bus: &FeetechBus, config: &BaseConfig) -> Result<(), FeetechError> {
    let servos: Vec<u8> = config
        .steering_servo_front
        .into_iter()
        .chain(config.steering_servo_rear)
        .collect();

    let all_ids: Vec<u8> = config.drive_motors.iter().copied().chain(servos.iter().copied()).collect();
    info!("Initializing actuators {:?}", all_ids);

    for &id in &all_ids {
        match bus.ping(id)? {
            true => debug!("Servo {} responding", id),
            false => return Err(FeetechError::Timeout { id }),
        }
    }

    for &id in &all_ids {
        bus.disable_torque(id)?;
    }

    for &id in &config.drive_motors {
        bus.set_operating_mode(id, OperatingMode::Velocity)?;
    }
    for &id in &servos {
        bus.set_operating_mode(id, OperatingMode::Position)?;
    }

    for &id in &all_ids {
        bus.enable_torque(id)?;
    }

    info!("Actuators initialized successfully");
    Ok(())
}
