// Configuration surface: topics, serial defaults, and the JSON config file
// describing the vehicle and its actuators.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::base::geometry::{SteerMode, SteeringProfile, VehicleGeometry};

// Zenoh topics
pub const TOPIC_CMD_BASE: &str = "ackermann/cmd/base"; // commands
pub const TOPIC_RT_BASE: &str = "ackermann/rt/base"; // command outcomes
pub const TOPIC_HEALTH: &str = "ackermann/state/health"; // health status

// Health publish period
pub const HEALTH_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("a {field} greater than zero must be defined")]
    MissingGeometry { field: &'static str },

    #[error("at least one motor id must be listed in drive_motors")]
    NoDriveMotors,

    #[error("drive mode {mode:?} requires a {axle} steering servo")]
    MissingSteeringServo { mode: SteerMode, axle: &'static str },

    #[error(
        "servo positions must satisfy min <= neutral <= max with min < max and max > 0 \
         (got {min}/{neutral}/{max})"
    )]
    ServoRange { min: i64, neutral: i64, max: i64 },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The vehicle configuration file.
///
/// Geometry fields default to zero so an absent field fails validation the
/// same way an explicit zero does.
#[derive(Debug, Clone, Deserialize)]
pub struct BaseConfig {
    #[serde(default)]
    pub wheelbase_mm: f64,
    #[serde(default)]
    pub turning_radius_meters: f64,
    #[serde(default)]
    pub max_speed_meters_per_second: f64,
    #[serde(default)]
    pub width_meters: f64,
    #[serde(default)]
    pub wheel_circumference_meters: f64,

    /// Bus IDs of the wheel motors
    #[serde(default)]
    pub drive_motors: Vec<u8>,

    #[serde(default)]
    pub drive_mode: SteerMode,

    #[serde(default)]
    pub steering_servo_front: Option<u8>,
    #[serde(default)]
    pub steering_servo_rear: Option<u8>,

    #[serde(default = "default_neutral_position")]
    pub neutral_servo_position: i64,
    #[serde(default = "default_max_position")]
    pub max_servo_position: i64,
    #[serde(default = "default_min_position")]
    pub min_servo_position: i64,

    /// Serial port of the servo bus
    pub serial_port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

fn default_neutral_position() -> i64 {
    90
}

fn default_max_position() -> i64 {
    180
}

fn default_min_position() -> i64 {
    0
}

fn default_baud_rate() -> u32 {
    crate::actuator::feetech::DEFAULT_BAUDRATE
}

impl BaseConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Validate everything the vehicle needs before any hardware is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.vehicle_geometry()?;
        if self.drive_motors.is_empty() {
            return Err(ConfigError::NoDriveMotors);
        }
        self.steering_profile()?;
        Ok(())
    }

    pub fn vehicle_geometry(&self) -> Result<VehicleGeometry, ConfigError> {
        VehicleGeometry::new(
            self.wheelbase_mm,
            self.turning_radius_meters,
            self.max_speed_meters_per_second,
            self.width_meters,
            self.wheel_circumference_meters,
        )
    }

    pub fn steering_profile(&self) -> Result<SteeringProfile, ConfigError> {
        SteeringProfile::new(
            self.drive_mode,
            self.neutral_servo_position,
            self.min_servo_position,
            self.max_servo_position,
            self.steering_servo_front.is_some(),
            self.steering_servo_rear.is_some(),
        )
    }
}
