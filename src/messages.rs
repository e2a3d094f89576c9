// Message types on the command and result topics

use serde::{Deserialize, Serialize};

use crate::base::geometry::VehicleGeometry;

/// Free vector, components defaulting to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

/// Command from teleop/scripts -> runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum BaseCommand {
    MoveStraight {
        distance_mm: f64,
        velocity_mmps: f64,
    },
    SetVelocity {
        linear: Vector3,
        angular: Vector3,
    },
    SetPower {
        linear: Vector3,
        angular: Vector3,
    },
    Spin {
        angle_deg: f64,
        velocity_dps: f64,
    },
    Stop,
    IsMoving,
    GetProperties,
}

/// Per-command result published by the runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandOutcome {
    Ok {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        moving: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        properties: Option<VehicleGeometry>,
    },
    Error {
        message: String,
    },
}

impl CommandOutcome {
    pub fn ok() -> Self {
        Self::Ok {
            moving: None,
            properties: None,
        }
    }

    pub fn moving(moving: bool) -> Self {
        Self::Ok {
            moving: Some(moving),
            properties: None,
        }
    }

    pub fn properties(properties: VehicleGeometry) -> Self {
        Self::Ok {
            moving: None,
            properties: Some(properties),
        }
    }

    pub fn error(error: impl std::fmt::Display) -> Self {
        Self::Error {
            message: error.to_string(),
        }
    }
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Idle,
    Moving,
    Degraded,
}
