//! Poll faults are absorbed for the whole capture window.

use can_capture::{
    BusError, CaptureConfig, Result, TimestampedFrame, VirtualBus, VirtualFrame, capture_with,
};

use crate::{AlternatingBus, MockCanFrame, read_rows, temp_csv};

#[test]
fn error_on_every_other_poll_keeps_only_frames() -> Result<()> {
    let path = temp_csv("alternating_errors");
    let config = CaptureConfig::default()
        .with_duration_secs(0.05)?
        .with_output(&path);

    let frames = (0..5u16)
        .map(|i| {
            let frame = MockCanFrame::standard(0x200 + i, &[0xAA, i as u8]);
            TimestampedFrame::new(10.0 + f64::from(i), frame)
        })
        .collect();
    let bus = AlternatingBus::new(frames);
    let shutdowns = bus.shutdowns.clone();

    let session = capture_with(bus, &config)?;
    assert_eq!(session.len(), 5);
    assert!(session.stats().driver_errors >= 5);

    let rows = read_rows(&path);
    assert_eq!(rows.len(), 6);
    for (i, row) in rows[1..].iter().enumerate() {
        assert_eq!(row[1], format!("{:x}", 0x200 + i));
        assert_eq!(row[2], format!("aa{:02x}", i));
    }
    assert_eq!(shutdowns.load(std::sync::atomic::Ordering::SeqCst), 1);

    std::fs::remove_file(path)?;
    Ok(())
}

#[test]
fn mixed_faults_do_not_end_the_run() -> Result<()> {
    let path = temp_csv("mixed_faults");
    let config = CaptureConfig::default()
        .with_duration_secs(0.04)?
        .with_output(&path);

    let mut bus = VirtualBus::new();
    bus.push_error(BusError::Other("unexpected driver state".into()));
    bus.push_frame(1.0, VirtualFrame::standard(0x10, &[1]).unwrap());
    bus.push_error(BusError::Driver("bus-off".into()));
    bus.push_error(BusError::Driver("bus-off".into()));
    bus.push_frame(2.0, VirtualFrame::standard(0x20, &[2]).unwrap());

    let session = capture_with(bus, &config)?;
    let stats = session.stats();
    assert_eq!(session.len(), 2);
    assert_eq!(stats.driver_errors, 2);
    assert_eq!(stats.other_errors, 1);
    assert!(stats.timeouts >= 1, "loop kept polling after the script ran out");

    assert_eq!(read_rows(&path).len(), 3);

    std::fs::remove_file(path)?;
    Ok(())
}
