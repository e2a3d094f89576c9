// Command-level error taxonomy
//
// Validation errors are raised before any actuator is touched; actuator
// errors surface after side effects have begun and are reported as-is.

use crate::actuator::ActuatorError;

#[derive(Debug, thiserror::Error)]
pub enum BaseError {
    #[error(
        "requested speed {requested_mmps} mm/s is greater than maximum base speed {max_mps} m/s"
    )]
    SpeedExceeded { requested_mmps: f64, max_mps: f64 },

    #[error("cannot move base straight at 0 mm per sec")]
    ZeroVelocity,

    #[error(
        "at requested speed of {speed_mmps} mm/s, a base with turning radius \
         {turning_radius_m} m can turn at most {max_dps} degrees per second"
    )]
    TurnRateExceeded {
        requested: f64,
        max_dps: f64,
        speed_mmps: f64,
        turning_radius_m: f64,
    },

    #[error(
        "turn radius {radius_m} m is at or inside the kinematic singularity \
         for a {wheelbase_mm} mm wheelbase"
    )]
    InvalidTurnRadius { radius_m: f64, wheelbase_mm: f64 },

    #[error("ackermann steering does not support spin")]
    UnsupportedSpin,

    #[error(transparent)]
    Actuator(#[from] ActuatorError),
}
