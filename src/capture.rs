//! The acquisition loop and the capture pipeline around it.
//!
//! A run polls the bus with a short timeout until the capture window closes,
//! appending every received frame to a [`CaptureSession`]. The bus is owned by
//! a [`BusGuard`] for the whole run and shut down exactly once before the
//! session is written out.
//!
//! # Example
//!
//! ```no_run
//! use can_capture::{CaptureConfig, DriverKind, capture_to_file};
//!
//! fn main() -> can_capture::Result<()> {
//!     let config = CaptureConfig::default()
//!         .with_channel("vcan0")
//!         .with_driver(DriverKind::SocketCan)
//!         .with_duration_secs(5.0)?
//!         .with_output("vcan0.csv");
//!
//!     let session = capture_to_file(&config)?;
//!     println!("{} frames, {} bus errors", session.len(), session.stats().driver_errors);
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::bus::{BusError, BusGuard, CanBus, DriverKind, PollOutcome, poll};
use crate::frame::{CapturedFrame, FrameKind};
use crate::virtual_bus::VirtualBus;
use crate::{Error, Result, output};

/// Capture window used when none is configured.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(1);

/// Per-poll timeout. Bounds how far the loop can overshoot the deadline
/// while keeping an idle bus from spinning the CPU.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// Interface used when none is configured.
pub const DEFAULT_CHANNEL: &str = "can0";

/// Output path used when none is configured.
pub const DEFAULT_OUTPUT: &str = "ecu_data.csv";

/// Parameters of a single capture run.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Bus channel or interface name.
    pub channel: String,
    /// Driver used to open `channel`.
    pub driver: DriverKind,
    /// Length of the capture window.
    pub duration: Duration,
    /// Upper bound on a single poll.
    pub poll_timeout: Duration,
    /// Destination CSV file.
    pub output: PathBuf,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL.to_string(),
            driver: DriverKind::default(),
            duration: DEFAULT_DURATION,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

/// Convert float seconds to a [`Duration`], rejecting negative and non-finite values.
pub fn seconds(what: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| Error::InvalidConfig(format!("{what} of {secs} seconds: {e}")))
}

impl CaptureConfig {
    /// Set the channel name.
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Set the driver kind.
    pub fn with_driver(mut self, driver: DriverKind) -> Self {
        self.driver = driver;
        self
    }

    /// Set the capture window in seconds.
    pub fn with_duration_secs(mut self, secs: f64) -> Result<Self> {
        self.duration = seconds("capture duration", secs)?;
        Ok(self)
    }

    /// Set the per-poll timeout in seconds.
    pub fn with_poll_timeout_secs(mut self, secs: f64) -> Result<Self> {
        self.poll_timeout = seconds("poll timeout", secs)?;
        Ok(self)
    }

    /// Set the output path.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }
}

/// Counters collected over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Number of receive calls.
    pub polls: usize,
    /// Polls that returned no frame.
    pub timeouts: usize,
    /// Frames appended to the session.
    pub frames: usize,
    /// Frames with an 11-bit ID.
    pub standard_frames: usize,
    /// Frames with a 29-bit ID.
    pub extended_frames: usize,
    /// Bus-level faults reported by the driver.
    pub driver_errors: usize,
    /// Other receive failures.
    pub other_errors: usize,
}

impl CaptureStats {
    /// Total number of failed polls.
    pub fn errors(&self) -> usize {
        self.driver_errors + self.other_errors
    }

    fn record_error(&mut self, error: &BusError) {
        match error {
            BusError::Driver(_) => self.driver_errors += 1,
            BusError::Other(_) | BusError::Closed => self.other_errors += 1,
        }
    }
}

/// Frames captured during one run, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct CaptureSession {
    frames: Vec<CapturedFrame>,
    stats: CaptureStats,
}

impl CaptureSession {
    /// An empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame.
    pub fn push(&mut self, frame: CapturedFrame) {
        self.stats.frames += 1;
        match frame.kind {
            FrameKind::Standard => self.stats.standard_frames += 1,
            FrameKind::Extended => self.stats.extended_frames += 1,
        }
        self.frames.push(frame);
    }

    /// Captured frames.
    pub fn frames(&self) -> &[CapturedFrame] {
        &self.frames
    }

    /// Iterate over captured frames in arrival order.
    pub fn iter(&self) -> core::slice::Iter<'_, CapturedFrame> {
        self.frames.iter()
    }

    /// Number of captured frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frame was captured.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Run counters.
    pub fn stats(&self) -> &CaptureStats {
        &self.stats
    }

    /// Consume the session, returning its frames.
    pub fn into_frames(self) -> Vec<CapturedFrame> {
        self.frames
    }
}

impl<'a> IntoIterator for &'a CaptureSession {
    type Item = &'a CapturedFrame;
    type IntoIter = core::slice::Iter<'a, CapturedFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Poll `bus` until `duration` has elapsed and collect what it delivers.
///
/// Poll faults are counted and logged but never end the loop; only the
/// deadline does. A frame returned by the last poll is kept even if it
/// arrives after the deadline.
///
/// Fails before polling if `poll_timeout` is zero.
pub fn acquire<B: CanBus>(
    bus: &mut B,
    duration: Duration,
    poll_timeout: Duration,
) -> Result<CaptureSession> {
    if poll_timeout.is_zero() {
        return Err(Error::InvalidConfig(String::from(
            "poll timeout must be greater than zero",
        )));
    }

    let mut session = CaptureSession::new();
    let start = Instant::now();

    while start.elapsed() < duration {
        log::trace!("Waiting for CAN messages...");
        session.stats.polls += 1;

        match poll(bus, poll_timeout) {
            PollOutcome::Frame(entry) => {
                let frame = CapturedFrame::from_timestamped(&entry);
                log::debug!("Received message: {frame}");
                session.push(frame);
            }
            PollOutcome::Timeout => session.stats.timeouts += 1,
            PollOutcome::Recoverable(e) => {
                log::warn!("{e}");
                session.stats.record_error(&e);
            }
        }
    }

    Ok(session)
}

/// Run one capture on an already opened bus.
///
/// The bus is shut down before this returns, whether acquisition succeeded,
/// failed or panicked. A failed acquisition yields an empty session.
pub fn run<B: CanBus>(bus: B, duration: Duration, poll_timeout: Duration) -> CaptureSession {
    let mut guard = BusGuard::new(bus);

    let session = match acquire(guard.bus_mut(), duration, poll_timeout) {
        Ok(session) => session,
        Err(e) => {
            log::error!("An error occurred during data collection: {e}");
            CaptureSession::new()
        }
    };

    // Shutdown failures are logged by the guard; the run still counts as complete.
    let _ = guard.release();

    let stats = session.stats();
    log::info!(
        "Data collection completed: {} frames ({} standard, {} extended), {} polls, {} errors",
        stats.frames,
        stats.standard_frames,
        stats.extended_frames,
        stats.polls,
        stats.errors()
    );
    session
}

/// Capture from an opened bus and write the result to `config.output`.
pub fn capture_with<B: CanBus>(bus: B, config: &CaptureConfig) -> Result<CaptureSession> {
    log::info!(
        "Starting data collection on {} ({}) for {:?}...",
        config.channel,
        config.driver,
        config.duration
    );
    let session = run(bus, config.duration, config.poll_timeout);

    output::write_csv(&session, &config.output)?;
    log::info!("Data saved to {}", config.output.display());
    Ok(session)
}

/// Open the configured bus, capture, and write the CSV file.
///
/// Fails only if the bus cannot be opened or the file cannot be written.
pub fn capture_to_file(config: &CaptureConfig) -> Result<CaptureSession> {
    match config.driver {
        #[cfg(all(feature = "socketcan", target_os = "linux"))]
        DriverKind::SocketCan => {
            let bus = crate::SocketCanBus::open(&config.channel)?;
            capture_with(bus, config)
        }
        #[cfg(not(all(feature = "socketcan", target_os = "linux")))]
        DriverKind::SocketCan => Err(Error::BusOpen {
            channel: config.channel.clone(),
            reason: String::from("SocketCAN support is not available in this build"),
        }),
        DriverKind::Virtual => capture_with(VirtualBus::open(&config.channel), config),
    }
}
