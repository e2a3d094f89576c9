// Motion-control core for the Ackermann base
//
// Provides:
// - Vehicle geometry and steering profile (validated setup data)
// - Steering planner (normalized command -> servo angles, turn kinematics)
// - Motion controller (command validation and actuator orchestration)
// - Actuator fan-out (broadcast to N drive motors, join all)

mod controller;
mod error;
pub mod fanout;
pub mod geometry;
pub mod steering;

pub use controller::AckermannBase;
pub use error::BaseError;
pub use geometry::{SteerMode, SteeringProfile, VehicleGeometry};
