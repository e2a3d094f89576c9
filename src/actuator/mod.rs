// Actuator capability interfaces
//
// The motion core only ever talks to these two traits; concrete handles are
// resolved from the configuration at startup (see `driver`) and injected.

use async_trait::async_trait;

pub mod driver;
pub mod feetech;

pub use driver::{ActuatorBank, FeetechDriveMotor, FeetechSteeringServo};
pub use feetech::{FeetechBus, FeetechError};

/// Failure of a drive or steering actuator call.
#[derive(Debug, thiserror::Error)]
pub enum ActuatorError {
    #[error("feetech bus error: {0}")]
    Feetech(#[from] feetech::FeetechError),

    #[error("actuator {name} failed: {reason}")]
    Failed { name: String, reason: String },
}

impl ActuatorError {
    pub fn failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// A motor-like device taking a normalized power command and reporting
/// whether it is currently moving.
#[async_trait]
pub trait DriveActuator: Send + Sync {
    fn name(&self) -> &str;

    /// Apply a normalized power in [-1, 1]. Values outside the range are
    /// clamped by the implementation.
    async fn set_power(&self, power: f64) -> Result<(), ActuatorError>;

    async fn stop(&self) -> Result<(), ActuatorError>;

    async fn is_moving(&self) -> Result<bool, ActuatorError>;
}

/// A servo-like device accepting an absolute position in actuator units.
#[async_trait]
pub trait SteeringActuator: Send + Sync {
    fn name(&self) -> &str;

    async fn move_to(&self, position: i64) -> Result<(), ActuatorError>;
}
