// Immutable physical description of the vehicle
//
// Both structs are validated once at setup and shared read-only by every
// command execution afterwards.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Physical parameters of the vehicle. All fields are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleGeometry {
    pub wheelbase_mm: f64,
    pub turning_radius_m: f64,
    pub max_speed_mps: f64,
    pub width_m: f64,
    pub wheel_circumference_m: f64,
}

impl VehicleGeometry {
    pub fn new(
        wheelbase_mm: f64,
        turning_radius_m: f64,
        max_speed_mps: f64,
        width_m: f64,
        wheel_circumference_m: f64,
    ) -> Result<Self, ConfigError> {
        let fields = [
            ("wheelbase_mm", wheelbase_mm),
            ("turning_radius_meters", turning_radius_m),
            ("max_speed_meters_per_second", max_speed_mps),
            ("width_meters", width_m),
            ("wheel_circumference_meters", wheel_circumference_m),
        ];
        for (field, value) in fields {
            if !(value > 0.0) {
                return Err(ConfigError::MissingGeometry { field });
            }
        }

        Ok(Self {
            wheelbase_mm,
            turning_radius_m,
            max_speed_mps,
            width_m,
            wheel_circumference_m,
        })
    }
}

/// Which axle(s) steer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SteerMode {
    #[default]
    Front,
    Rear,
    All,
}

/// Steering servo travel and axle configuration.
///
/// Servo positions are in native actuator units (typically 0-180 degrees).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteeringProfile {
    pub mode: SteerMode,
    pub neutral_position: i64,
    pub min_position: i64,
    pub max_position: i64,
    pub has_front_servo: bool,
    pub has_rear_servo: bool,
}

impl SteeringProfile {
    /// Build a profile, enforcing the setup-time invariants: a sane servo
    /// range and a steering servo present on every axle the mode drives.
    pub fn new(
        mode: SteerMode,
        neutral_position: i64,
        min_position: i64,
        max_position: i64,
        has_front_servo: bool,
        has_rear_servo: bool,
    ) -> Result<Self, ConfigError> {
        // max_position also scales steering commands, so a zero-width
        // travel range or a non-positive max is rejected outright.
        if !(min_position <= neutral_position
            && neutral_position <= max_position
            && min_position < max_position
            && max_position > 0)
        {
            return Err(ConfigError::ServoRange {
                min: min_position,
                neutral: neutral_position,
                max: max_position,
            });
        }

        if matches!(mode, SteerMode::Front | SteerMode::All) && !has_front_servo {
            return Err(ConfigError::MissingSteeringServo {
                mode,
                axle: "front",
            });
        }
        if matches!(mode, SteerMode::Rear | SteerMode::All) && !has_rear_servo {
            return Err(ConfigError::MissingSteeringServo { mode, axle: "rear" });
        }

        Ok(Self {
            mode,
            neutral_position,
            min_position,
            max_position,
            has_front_servo,
            has_rear_servo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_rejects_zero_field() {
        let result = VehicleGeometry::new(300.0, 0.0, 2.0, 0.4, 0.3);
        match result {
            Err(ConfigError::MissingGeometry { field }) => {
                assert_eq!(field, "turning_radius_meters")
            }
            other => panic!("expected MissingGeometry, got {:?}", other),
        }
    }

    #[test]
    fn test_geometry_rejects_negative_field() {
        assert!(VehicleGeometry::new(-300.0, 1.0, 2.0, 0.4, 0.3).is_err());
    }

    #[test]
    fn test_geometry_accepts_positive_fields() {
        let geometry = VehicleGeometry::new(300.0, 1.0, 2.0, 0.4, 0.3).unwrap();
        assert_eq!(geometry.wheelbase_mm, 300.0);
        assert_eq!(geometry.max_speed_mps, 2.0);
    }

    #[test]
    fn test_profile_requires_front_servo_for_front_mode() {
        let result = SteeringProfile::new(SteerMode::Front, 90, 0, 180, false, true);
        assert!(matches!(
            result,
            Err(ConfigError::MissingSteeringServo { axle: "front", .. })
        ));
    }

    #[test]
    fn test_profile_requires_both_servos_for_all_mode() {
        assert!(SteeringProfile::new(SteerMode::All, 90, 0, 180, true, false).is_err());
        assert!(SteeringProfile::new(SteerMode::All, 90, 0, 180, false, true).is_err());
        assert!(SteeringProfile::new(SteerMode::All, 90, 0, 180, true, true).is_ok());
    }

    #[test]
    fn test_profile_rear_mode_without_front_servo_is_valid() {
        let profile = SteeringProfile::new(SteerMode::Rear, 90, 0, 180, false, true).unwrap();
        assert!(!profile.has_front_servo);
    }

    #[test]
    fn test_profile_rejects_inverted_servo_range() {
        let result = SteeringProfile::new(SteerMode::Front, 200, 0, 180, true, false);
        assert!(matches!(result, Err(ConfigError::ServoRange { .. })));
    }

    #[test]
    fn test_profile_rejects_degenerate_servo_travel() {
        // Zero-width travel range
        let result = SteeringProfile::new(SteerMode::Front, 0, 0, 0, true, false);
        assert!(matches!(result, Err(ConfigError::ServoRange { .. })));
        // Ordered range but max at zero would zero out steering scaling
        let result = SteeringProfile::new(SteerMode::Front, -5, -10, 0, true, false);
        assert!(matches!(result, Err(ConfigError::ServoRange { .. })));
    }
}
