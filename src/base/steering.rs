// Ackermann steering planner
//
// Pure functions turning a normalized steering command in [-1, 1] into
// concrete servo angles per axle, and relating a requested turn radius to
// the wheel turn angle through the vehicle wheelbase.

use super::error::BaseError;
use super::geometry::{SteerMode, SteeringProfile, VehicleGeometry};

/// Which steering axle a servo target addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteerAxle {
    Front,
    Rear,
}

/// A single servo command: axle plus angle in actuator units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteerTarget {
    pub axle: SteerAxle,
    pub angle: i64,
}

/// Resolved servo commands for one steering request. The primary target is
/// always issued; the secondary (if any) follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteerPlan {
    pub primary: SteerTarget,
    pub secondary: Option<SteerTarget>,
}

/// Clamp a steering command to the normalized range [-1, 1].
pub fn clamp_normalized(value: f64) -> f64 {
    value.clamp(-1.0, 1.0)
}

/// Convert a normalized command into a servo angle in actuator units,
/// truncated toward zero.
///
/// For inputs in [-1, 1] and `max_position >= neutral_position` the result
/// stays within the servo travel range.
pub fn servo_angle(profile: &SteeringProfile, normalized: f64) -> i64 {
    let normalized = clamp_normalized(normalized);
    let from_neutral = normalized * (profile.max_position - profile.neutral_position) as f64;
    (profile.neutral_position as f64 + from_neutral) as i64
}

/// Resolve which servos a steering command drives, and to which angles.
///
/// In `All` mode the opposite axle mirrors the command. In the single-axle
/// modes a second servo, if fitted, is held at neutral so the non-steering
/// axle stays centered.
pub fn plan_steer(profile: &SteeringProfile, normalized: f64) -> SteerPlan {
    match profile.mode {
        SteerMode::Front => SteerPlan {
            primary: SteerTarget {
                axle: SteerAxle::Front,
                angle: servo_angle(profile, normalized),
            },
            secondary: profile.has_rear_servo.then(|| SteerTarget {
                axle: SteerAxle::Rear,
                angle: servo_angle(profile, 0.0),
            }),
        },
        SteerMode::Rear => SteerPlan {
            primary: SteerTarget {
                axle: SteerAxle::Rear,
                angle: servo_angle(profile, -normalized),
            },
            secondary: profile.has_front_servo.then(|| SteerTarget {
                axle: SteerAxle::Front,
                angle: servo_angle(profile, 0.0),
            }),
        },
        SteerMode::All => SteerPlan {
            primary: SteerTarget {
                axle: SteerAxle::Front,
                angle: servo_angle(profile, normalized),
            },
            secondary: Some(SteerTarget {
                axle: SteerAxle::Rear,
                angle: servo_angle(profile, -normalized),
            }),
        },
    }
}

/// Wheel turn angle factor for a requested turn radius.
///
/// Returns `cos(atan2(sqrt(wb^2 / (r^2 - wb^2)), wb))` with both lengths in
/// millimeters. A radius at or below the wheelbase puts the center of
/// rotation inside the wheelbase and the radicand goes non-positive, so that
/// request is rejected instead of producing NaN.
pub fn wheel_turn_angle(
    geometry: &VehicleGeometry,
    turn_radius_m: f64,
) -> Result<f64, BaseError> {
    let wheelbase = geometry.wheelbase_mm;
    let radius_mm = turn_radius_m * 1000.0;

    if radius_mm <= wheelbase {
        return Err(BaseError::InvalidTurnRadius {
            radius_m: turn_radius_m,
            wheelbase_mm: wheelbase,
        });
    }

    let radicand = wheelbase.powi(2) / (radius_mm.powi(2) - wheelbase.powi(2));
    Ok(radicand.sqrt().atan2(wheelbase).cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::geometry::{SteerMode, SteeringProfile, VehicleGeometry};

    fn profile(mode: SteerMode, front: bool, rear: bool) -> SteeringProfile {
        SteeringProfile::new(mode, 90, 0, 180, front, rear).unwrap()
    }

    fn geometry() -> VehicleGeometry {
        VehicleGeometry::new(300.0, 1.0, 1.0, 0.4, 0.3).unwrap()
    }

    #[test]
    fn test_servo_angle_stays_in_travel_range() {
        let profile = profile(SteerMode::Front, true, false);
        let mut n = -1.0;
        while n <= 1.0 {
            let angle = servo_angle(&profile, n);
            assert!(
                angle >= profile.min_position && angle <= profile.max_position,
                "angle {} out of range for normalized {}",
                angle,
                n
            );
            n += 0.01;
        }
    }

    #[test]
    fn test_servo_angle_endpoints() {
        let profile = profile(SteerMode::Front, true, false);
        assert_eq!(servo_angle(&profile, 0.0), 90);
        assert_eq!(servo_angle(&profile, 1.0), 180);
        assert_eq!(servo_angle(&profile, -1.0), 0);
        assert_eq!(servo_angle(&profile, 0.5), 135);
    }

    #[test]
    fn test_out_of_range_commands_clamp() {
        let profile = profile(SteerMode::Front, true, false);
        assert_eq!(servo_angle(&profile, 2.0), servo_angle(&profile, 1.0));
        assert_eq!(servo_angle(&profile, -7.5), servo_angle(&profile, -1.0));
    }

    #[test]
    fn test_all_mode_mirrors_secondary() {
        let profile = profile(SteerMode::All, true, true);
        let plan = plan_steer(&profile, 0.5);
        assert_eq!(plan.primary.axle, SteerAxle::Front);
        assert_eq!(plan.primary.angle, 135);
        let secondary = plan.secondary.unwrap();
        assert_eq!(secondary.axle, SteerAxle::Rear);
        assert_eq!(secondary.angle, 45);
    }

    #[test]
    fn test_front_mode_holds_rear_at_neutral() {
        let profile = profile(SteerMode::Front, true, true);
        for n in [-1.0, -0.3, 0.0, 0.7, 1.0] {
            let plan = plan_steer(&profile, n);
            let secondary = plan.secondary.unwrap();
            assert_eq!(secondary.axle, SteerAxle::Rear);
            assert_eq!(secondary.angle, 90, "rear must stay neutral for n={}", n);
        }
    }

    #[test]
    fn test_rear_mode_inverts_primary() {
        let profile = profile(SteerMode::Rear, true, true);
        let plan = plan_steer(&profile, 0.5);
        assert_eq!(plan.primary.axle, SteerAxle::Rear);
        assert_eq!(plan.primary.angle, 45);
        let secondary = plan.secondary.unwrap();
        assert_eq!(secondary.axle, SteerAxle::Front);
        assert_eq!(secondary.angle, 90);
    }

    #[test]
    fn test_front_mode_without_rear_servo_has_no_secondary() {
        let profile = profile(SteerMode::Front, true, false);
        assert!(plan_steer(&profile, 0.4).secondary.is_none());
    }

    #[test]
    fn test_wheel_turn_angle_rejects_singular_radius() {
        let geometry = geometry();
        // 300 mm wheelbase; 0.2 m radius is inside the singularity
        let result = wheel_turn_angle(&geometry, 0.2);
        assert!(matches!(result, Err(BaseError::InvalidTurnRadius { .. })));
        // Exactly at the wheelbase is also rejected
        assert!(wheel_turn_angle(&geometry, 0.3).is_err());
    }

    #[test]
    fn test_wheel_turn_angle_is_finite_above_singularity() {
        let geometry = geometry();
        let angle = wheel_turn_angle(&geometry, 1.0).unwrap();
        assert!(angle.is_finite());
        assert!(angle > 0.0 && angle <= 1.0, "cosine factor, got {}", angle);
        // Wider turns give a factor closer to 1 (wheels closer to straight)
        let wider = wheel_turn_angle(&geometry, 5.0).unwrap();
        assert!(wider > angle);
    }
}
