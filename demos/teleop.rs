// Keyboard teleop: W/S drive, A/D steer, R/F speed, Space stop, Q quit
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::{Duration, Instant};
use tracing::info;

use ackermann_base_runtime::config::TOPIC_CMD_BASE;
use ackermann_base_runtime::messages::{BaseCommand, Vector3};

const SPEEDS: [f64; 3] = [100.0, 300.0, 600.0]; // mm/s
const STEER_RATES: [f64; 3] = [0.2, 0.5, 0.9]; // normalized turn command
const INPUT_TIMEOUT_MS: u64 = 100; // Reset velocities after this much time with no input

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let publisher = session.declare_publisher(TOPIC_CMD_BASE).await?;

    info!("Controls: W/S=drive, A/D=steer, R/F=speed, Space=stop, Q=quit");
    info!("Speed: LOW");

    enable_raw_mode()?;
    let result = run_teleop(&publisher).await;
    disable_raw_mode()?;

    result
}

async fn run_teleop(
    publisher: &zenoh::pubsub::Publisher<'_>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut speed_idx: usize = 0;

    // Persistent command state
    let mut velocity_mmps = 0.0;
    let mut steer = 0.0;
    let mut last_movement_input = Instant::now();

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                match code {
                    // Drive - update velocity and refresh timestamp
                    KeyCode::Char('w') if pressed => {
                        velocity_mmps = SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('s') if pressed => {
                        velocity_mmps = -SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }

                    // Steering
                    KeyCode::Char('a') if pressed => {
                        steer = STEER_RATES[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('d') if pressed => {
                        steer = -STEER_RATES[speed_idx];
                        last_movement_input = Instant::now();
                    }

                    // Speed control
                    KeyCode::Char('r') if pressed => {
                        speed_idx = (speed_idx + 1).min(2);
                        print_speed(speed_idx);
                    }
                    KeyCode::Char('f') if pressed => {
                        speed_idx = speed_idx.saturating_sub(1);
                        print_speed(speed_idx);
                    }

                    // Immediate stop
                    KeyCode::Char(' ') if pressed => {
                        velocity_mmps = 0.0;
                        steer = 0.0;
                        let json = serde_json::to_string(&BaseCommand::Stop)?;
                        publisher.put(json).await?;
                    }

                    // Quit
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => {}
                }
            }
        }

        // Reset command if no movement input for INPUT_TIMEOUT_MS
        if last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            velocity_mmps = 0.0;
            steer = 0.0;
        }

        // Always publish at ~50Hz
        let cmd = BaseCommand::SetVelocity {
            linear: Vector3 {
                y: velocity_mmps,
                ..Default::default()
            },
            angular: Vector3 {
                z: steer,
                ..Default::default()
            },
        };
        publisher.put(serde_json::to_string(&cmd)?).await?;
    }

    // Leave the base stopped on exit
    publisher
        .put(serde_json::to_string(&BaseCommand::Stop)?)
        .await?;

    Ok(())
}

fn print_speed(idx: usize) {
    let label = ["LOW", "MED", "HIGH"][idx];
    info!("Speed: {}", label);
}
