use std::path::PathBuf;
use std::process::ExitCode;

use can_capture::capture::{DEFAULT_CHANNEL, DEFAULT_OUTPUT};
use can_capture::{CaptureConfig, DriverKind, capture_to_file};
use clap::Parser;
use env_logger::Env;

/// Record CAN traffic for a fixed time and save it as CSV.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CAN channel or interface name
    #[arg(short, long, default_value = DEFAULT_CHANNEL)]
    channel: String,

    /// Bus driver
    #[arg(long, value_enum, default_value_t = DriverKind::default())]
    driver: DriverKind,

    /// Capture duration in seconds
    #[arg(short, long, default_value_t = 1.0)]
    duration: f64,

    /// Per-poll timeout in seconds
    #[arg(long, default_value_t = 0.01)]
    poll_timeout: f64,

    /// Output CSV file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
}

impl Args {
    fn into_config(self) -> can_capture::Result<CaptureConfig> {
        Ok(CaptureConfig::default()
            .with_channel(self.channel)
            .with_driver(self.driver)
            .with_duration_secs(self.duration)?
            .with_poll_timeout_secs(self.poll_timeout)?
            .with_output(self.output))
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let result = args.into_config().and_then(|config| capture_to_file(&config));

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
