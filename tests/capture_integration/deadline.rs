//! Capture window termination and empty captures.

use std::time::{Duration, Instant};

use can_capture::{CaptureConfig, DriverKind, Result, VirtualBus, capture_to_file, capture_with};

use crate::{HEADER_ROW, read_rows, temp_csv};

#[test]
fn silent_bus_stops_at_deadline_with_header_only() -> Result<()> {
    let path = temp_csv("silent_bus");
    let config = CaptureConfig::default()
        .with_duration_secs(0.05)?
        .with_poll_timeout_secs(0.01)?
        .with_output(&path);

    let start = Instant::now();
    let session = capture_with(VirtualBus::new(), &config)?;
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_millis(500), "took {elapsed:?}");
    assert!(session.is_empty());
    assert!(session.stats().timeouts >= 1);

    let rows = read_rows(&path);
    assert_eq!(rows, [HEADER_ROW]);

    std::fs::remove_file(path)?;
    Ok(())
}

#[test]
fn zero_duration_writes_header_only() -> Result<()> {
    let path = temp_csv("zero_duration");
    let config = CaptureConfig::default()
        .with_driver(DriverKind::Virtual)
        .with_duration_secs(0.0)?
        .with_output(&path);

    let session = capture_to_file(&config)?;
    assert!(session.is_empty());
    assert_eq!(session.stats().polls, 0);

    let contents = std::fs::read_to_string(&path)?;
    assert_eq!(
        contents,
        "Timestamp,Arbitration ID (hex),Data (hex),DLC,Message Type\n"
    );

    std::fs::remove_file(path)?;
    Ok(())
}

#[test]
fn zero_poll_timeout_still_writes_empty_session() -> Result<()> {
    let path = temp_csv("zero_poll_timeout");
    let config = CaptureConfig::default()
        .with_driver(DriverKind::Virtual)
        .with_poll_timeout_secs(0.0)?
        .with_output(&path);

    let start = Instant::now();
    let session = capture_to_file(&config)?;
    assert!(start.elapsed() < config.duration);
    assert!(session.is_empty());
    assert_eq!(read_rows(&path), [HEADER_ROW]);

    std::fs::remove_file(path)?;
    Ok(())
}
