// Motion controller for the Ackermann base
//
// One logical command per call: validate against the vehicle limits, steer,
// then fan power out to the drive motors. Steering always completes before
// drive power is applied. Motion commands serialize on an internal lock;
// `stop`, `is_moving` and `get_properties` bypass it so a stop can always
// preempt a sleeping `move_straight`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tracing::{debug, info};

use super::error::BaseError;
use super::fanout;
use super::geometry::{SteeringProfile, VehicleGeometry};
use super::steering::{self, SteerAxle};
use crate::actuator::{ActuatorError, DriveActuator, SteeringActuator};
use crate::messages::Vector3;

pub struct AckermannBase {
    geometry: VehicleGeometry,
    profile: SteeringProfile,
    motors: Vec<Arc<dyn DriveActuator>>,
    front_servo: Option<Arc<dyn SteeringActuator>>,
    rear_servo: Option<Arc<dyn SteeringActuator>>,
    motion_lock: Mutex<()>,
    stop_signal: Notify,
}

impl AckermannBase {
    pub fn new(
        geometry: VehicleGeometry,
        profile: SteeringProfile,
        motors: Vec<Arc<dyn DriveActuator>>,
        front_servo: Option<Arc<dyn SteeringActuator>>,
        rear_servo: Option<Arc<dyn SteeringActuator>>,
    ) -> Self {
        Self {
            geometry,
            profile,
            motors,
            front_servo,
            rear_servo,
            motion_lock: Mutex::new(()),
            stop_signal: Notify::new(),
        }
    }

    fn servo(&self, axle: SteerAxle) -> Result<&Arc<dyn SteeringActuator>, ActuatorError> {
        let handle = match axle {
            SteerAxle::Front => self.front_servo.as_ref(),
            SteerAxle::Rear => self.rear_servo.as_ref(),
        };
        handle.ok_or_else(|| ActuatorError::failed("steering", format!("no {:?} servo bound", axle)))
    }

    /// Execute a steering plan: primary servo first, then the secondary.
    async fn steer(&self, normalized: f64) -> Result<(), BaseError> {
        let plan = steering::plan_steer(&self.profile, normalized);
        debug!("Steering {:?} -> {:?}", normalized, plan);

        self.servo(plan.primary.axle)?
            .move_to(plan.primary.angle)
            .await?;

        if let Some(secondary) = plan.secondary {
            self.servo(secondary.axle)?.move_to(secondary.angle).await?;
        }

        Ok(())
    }

    async fn apply_drive_power(&self, power: f64) -> Result<(), BaseError> {
        fanout::broadcast(&self.motors, |motor| async move {
            motor.set_power(power).await
        })
        .await?;
        Ok(())
    }

    async fn stop_motors(&self) -> Result<(), BaseError> {
        fanout::broadcast(&self.motors, |motor| async move { motor.stop().await }).await?;
        Ok(())
    }

    /// Drive straight for `distance_mm` at `velocity_mmps`, then stop.
    ///
    /// Steering is centered before power is applied. The drive wait can be
    /// cut short by `stop`; the motors are stopped either way.
    pub async fn move_straight(
        &self,
        distance_mm: f64,
        velocity_mmps: f64,
    ) -> Result<(), BaseError> {
        let _guard = self.motion_lock.lock().await;
        info!(
            "received a MoveStraight with distance {}, velocity {}",
            distance_mm, velocity_mmps
        );

        if velocity_mmps.abs() / 1000.0 > self.geometry.max_speed_mps {
            return Err(BaseError::SpeedExceeded {
                requested_mmps: velocity_mmps,
                max_mps: self.geometry.max_speed_mps,
            });
        }
        if velocity_mmps == 0.0 {
            return Err(BaseError::ZeroVelocity);
        }

        // Arm the stop signal before the first actuator side effect so a
        // stop landing during the steering or power fan-out is not lost.
        let stopped = self.stop_signal.notified();
        tokio::pin!(stopped);
        stopped.as_mut().enable();

        self.steer(0.0).await?;

        let drive_seconds = distance_mm / velocity_mmps;
        let drive_power = (velocity_mmps / 1000.0) / self.geometry.max_speed_mps;
        self.apply_drive_power(drive_power).await?;

        // Opposite-sign distance and velocity give a negative duration,
        // which collapses to an immediate stop. A duration too large for
        // the clock saturates instead of panicking with the motors powered.
        let wait = Duration::try_from_secs_f64(drive_seconds).unwrap_or_else(|_| {
            if drive_seconds > 0.0 {
                Duration::MAX
            } else {
                Duration::ZERO
            }
        });
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = &mut stopped => {
                debug!("move_straight interrupted by stop");
            }
        }

        self.stop_motors().await
    }

    /// Raw power passthrough: `angular.z` is the normalized steering
    /// command, `linear.y` the normalized drive power. No limit checks
    /// beyond actuator-level clamping.
    pub async fn set_power(&self, linear: Vector3, angular: Vector3) -> Result<(), BaseError> {
        let _guard = self.motion_lock.lock().await;
        info!(
            "received a SetPower with linear.y {}, angular.z {}",
            linear.y, angular.z
        );

        self.steer(angular.z).await?;
        self.apply_drive_power(linear.y).await
    }

    /// Velocity command: `linear.y` in mm/s, `angular.z` as the turn rate.
    pub async fn set_velocity(&self, linear: Vector3, angular: Vector3) -> Result<(), BaseError> {
        let _guard = self.motion_lock.lock().await;
        info!(
            "received a SetVelocity with linear.y {}, angular.z {}",
            linear.y, angular.z
        );

        if linear.y.abs() / 1000.0 > self.geometry.max_speed_mps {
            return Err(BaseError::SpeedExceeded {
                requested_mmps: linear.y,
                max_mps: self.geometry.max_speed_mps,
            });
        }

        // Turn-rate bound: a rad/s rate fed through a degree-based cosine.
        // Dimensionally suspect, but the deployed vehicles are tuned against
        // it; pinned by a test until the intended units are settled.
        let max_angular_rate = (linear.y / 1000.0) / self.geometry.turning_radius_m;
        let max_dps = max_angular_rate.to_radians().cos().abs();
        if angular.z.abs() > max_dps {
            return Err(BaseError::TurnRateExceeded {
                requested: angular.z,
                max_dps,
                speed_mmps: linear.y,
                turning_radius_m: self.geometry.turning_radius_m,
            });
        }

        if angular.z != 0.0 {
            let desired_turn_radius_m = (linear.y / 1000.0).abs() / angular.z.abs().cos();
            let mut turn_angle = steering::wheel_turn_angle(&self.geometry, desired_turn_radius_m)?
                .copysign(angular.z);

            // Reverse steering convention: driving backwards flips the turn
            if linear.y < 0.0 {
                turn_angle = -turn_angle;
            }

            self.steer(turn_angle / self.profile.max_position as f64)
                .await?;
        } else {
            self.steer(0.0).await?;
        }

        self.apply_drive_power((linear.y / 1000.0) / self.geometry.max_speed_mps)
            .await
    }

    /// Stop every drive motor. Steering is left where it is. Also wakes an
    /// in-flight `move_straight` so its wait ends immediately.
    pub async fn stop(&self) -> Result<(), BaseError> {
        info!("received a Stop");
        self.stop_signal.notify_waiters();
        self.stop_motors().await
    }

    /// True if any drive motor reports motion. All motors are queried
    /// concurrently; an empty drive set is not moving.
    pub async fn is_moving(&self) -> Result<bool, BaseError> {
        let states = fanout::broadcast(&self.motors, |motor| async move {
            motor.is_moving().await
        })
        .await?;
        Ok(states.into_iter().any(|moving| moving))
    }

    pub fn get_properties(&self) -> VehicleGeometry {
        self.geometry
    }

    /// Spinning in place needs wheels that can oppose each other, which this
    /// steering topology does not have.
    pub async fn spin(&self, _angle_deg: f64, _velocity_dps: f64) -> Result<(), BaseError> {
        Err(BaseError::UnsupportedSpin)
    }
}
