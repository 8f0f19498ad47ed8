//! The bus is shut down exactly once per run.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use can_capture::{BusError, CaptureConfig, Error, VirtualBus, capture_with, run};

use crate::{PanickingBus, temp_csv};

#[test]
fn normal_run_shuts_down_once() {
    let bus = VirtualBus::new();
    let shutdowns = bus.shutdown_counter();
    run(bus, Duration::from_millis(20), Duration::from_millis(5));
    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_acquisition_shuts_down_once() {
    let bus = VirtualBus::new();
    let shutdowns = bus.shutdown_counter();
    let session = run(bus, Duration::from_millis(20), Duration::ZERO);
    assert!(session.is_empty());
    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
}

#[test]
fn panicking_driver_still_shuts_down_once() {
    let shutdowns = Arc::new(AtomicUsize::new(0));
    let bus = PanickingBus {
        shutdowns: shutdowns.clone(),
    };

    let result = catch_unwind(AssertUnwindSafe(|| {
        run(bus, Duration::from_millis(20), Duration::from_millis(5))
    }));
    assert!(result.is_err());
    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
}

#[test]
fn shutdown_failure_does_not_fail_the_run() -> can_capture::Result<()> {
    let path = temp_csv("shutdown_failure");
    let config = CaptureConfig::default()
        .with_duration_secs(0.02)?
        .with_output(&path);

    let mut bus = VirtualBus::new();
    bus.fail_shutdown_with(BusError::Other("adapter unplugged".into()));
    let shutdowns = bus.shutdown_counter();

    capture_with(bus, &config)?;
    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    assert!(path.exists());

    std::fs::remove_file(path)?;
    Ok(())
}

#[test]
fn write_failure_happens_after_release() {
    let path = std::env::temp_dir()
        .join("can_capture_no_such_dir")
        .join("out.csv");
    let config = CaptureConfig::default()
        .with_duration_secs(0.01)
        .unwrap()
        .with_output(path);

    let bus = VirtualBus::new();
    let shutdowns = bus.shutdown_counter();

    let err = capture_with(bus, &config).unwrap_err();
    assert!(matches!(err, Error::IOError(_)));
    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
}
