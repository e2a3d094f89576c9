// Ackermann steering base runtime
//
// Converts high-level base commands (move straight, set velocity, set power)
// into steering servo angles and drive motor power, within the vehicle's
// kinematic limits.

pub mod actuator;
pub mod base;
pub mod config;
pub mod messages;
pub mod runtime;
