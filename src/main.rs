use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ackermann_base_runtime::actuator::{ActuatorBank, FeetechBus, driver};
use ackermann_base_runtime::base::AckermannBase;
use ackermann_base_runtime::config::BaseConfig;
use ackermann_base_runtime::runtime;

#[derive(Parser)]
#[command(about = "Ackermann steering base runtime")]
struct Args {
    /// Path to the vehicle config file
    #[arg(short, long, default_value = "base.json")]
    config: PathBuf,

    /// Override the serial port from the config file
    #[arg(long)]
    port: Option<String>,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init(); // installs the subscriber globally

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut config = BaseConfig::load(&args.config)?;
    if let Some(port) = args.port {
        config.serial_port = port;
    }
    config.validate()?;

    let geometry = config.vehicle_geometry()?;
    let profile = config.steering_profile()?;

    info!("Opening servo bus on {}", config.serial_port);
    let bus = Arc::new(FeetechBus::open(&config.serial_port, config.baud_rate)?);
    driver::initialize(&bus, &config)?;

    let bank = ActuatorBank::bind(bus, &config);
    let base = Arc::new(AckermannBase::new(
        geometry,
        profile,
        bank.motors,
        bank.front_servo,
        bank.rear_servo,
    ));

    runtime::run(base).await
}
