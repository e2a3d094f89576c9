// Zenoh command loop
//
// Subscribes to the base command topic, dispatches each command against the
// motion controller on its own task, and publishes the outcome. A periodic
// health tick reports whether the base is idle, moving, or unreachable.

use std::sync::Arc;

use tokio::time::interval;
use tracing::{info, warn};

use crate::base::AckermannBase;
use crate::config::{HEALTH_PERIOD, TOPIC_CMD_BASE, TOPIC_HEALTH, TOPIC_RT_BASE};
use crate::messages::{BaseCommand, CommandOutcome, RuntimeHealth};

/// Execute one command and fold the result into a publishable outcome.
pub async fn dispatch(base: &AckermannBase, cmd: BaseCommand) -> CommandOutcome {
    let result = match cmd {
        BaseCommand::MoveStraight {
            distance_mm,
            velocity_mmps,
        } => base
            .move_straight(distance_mm, velocity_mmps)
            .await
            .map(|_| CommandOutcome::ok()),
        BaseCommand::SetVelocity { linear, angular } => base
            .set_velocity(linear, angular)
            .await
            .map(|_| CommandOutcome::ok()),
        BaseCommand::SetPower { linear, angular } => base
            .set_power(linear, angular)
            .await
            .map(|_| CommandOutcome::ok()),
        BaseCommand::Spin {
            angle_deg,
            velocity_dps,
        } => base
            .spin(angle_deg, velocity_dps)
            .await
            .map(|_| CommandOutcome::ok()),
        BaseCommand::Stop => base.stop().await.map(|_| CommandOutcome::ok()),
        BaseCommand::IsMoving => base.is_moving().await.map(CommandOutcome::moving),
        BaseCommand::GetProperties => Ok(CommandOutcome::properties(base.get_properties())),
    };

    result.unwrap_or_else(|e| {
        warn!("Command failed: {}", e);
        CommandOutcome::error(e)
    })
}

pub async fn run(base: Arc<AckermannBase>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let subscriber = session.declare_subscriber(TOPIC_CMD_BASE).await?;
    let pub_health = session.declare_publisher(TOPIC_HEALTH).await?;

    let mut health_tick = interval(HEALTH_PERIOD);

    info!("Runtime started");
    info!("Subscribed to: {}", TOPIC_CMD_BASE);
    info!("Publishing to: {}, {}", TOPIC_RT_BASE, TOPIC_HEALTH);

    loop {
        tokio::select! {
            sample = subscriber.recv_async() => {
                let sample = sample?;
                let payload = sample.payload().to_bytes();
                match serde_json::from_slice::<BaseCommand>(&payload) {
                    Ok(cmd) => {
                        // Long commands (move_straight sleeps for its whole
                        // drive duration) must not stall the loop, so each
                        // one runs on its own task. The controller itself
                        // serializes motion commands.
                        let base = base.clone();
                        let session = session.clone();
                        tokio::spawn(async move {
                            let outcome = dispatch(&base, cmd).await;
                            match serde_json::to_string(&outcome) {
                                Ok(json) => {
                                    if let Err(e) = session.put(TOPIC_RT_BASE, json).await {
                                        warn!("Failed to publish outcome: {}", e);
                                    }
                                }
                                Err(e) => warn!("Failed to encode outcome: {}", e),
                            }
                        });
                    }
                    Err(e) => {
                        warn!("Failed to parse command: {}", e);
                    }
                }
            }
            _ = health_tick.tick() => {
                let health = match base.is_moving().await {
                    Ok(true) => RuntimeHealth::Moving,
                    Ok(false) => RuntimeHealth::Idle,
                    Err(e) => {
                        warn!("Health poll failed: {}", e);
                        RuntimeHealth::Degraded
                    }
                };
                pub_health.put(serde_json::to_string(&health)?).await?;
            }
        }
    }
}
