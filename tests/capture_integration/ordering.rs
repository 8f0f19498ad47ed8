//! Rows follow bus delivery order with the documented renderings.

use std::time::Duration;

use can_capture::{CaptureConfig, DriverKind, Result, VirtualBus, VirtualFrame, capture_with};

use crate::{HEADER_ROW, read_rows, temp_csv};

#[test]
fn rows_follow_delivery_order() -> Result<()> {
    let path = temp_csv("ordering");
    let config = CaptureConfig::default()
        .with_driver(DriverKind::Virtual)
        .with_duration_secs(0.05)?
        .with_output(&path);

    let mut bus = VirtualBus::new();
    for i in 0..20u16 {
        let ts = 100.0 + f64::from(i) * 0.001;
        bus.push_frame(ts, VirtualFrame::standard(0x100 + i, &[i as u8]).unwrap());
    }

    let session = capture_with(bus, &config)?;
    assert_eq!(session.len(), 20);

    let rows = read_rows(&path);
    assert_eq!(rows.len(), 21);
    assert_eq!(rows[0], HEADER_ROW);
    for (i, row) in rows[1..].iter().enumerate() {
        assert_eq!(row[1], format!("{:x}", 0x100 + i));
        assert_eq!(row[2], format!("{:02x}", i));
    }

    std::fs::remove_file(path)?;
    Ok(())
}

#[test]
fn renders_hex_fields_and_message_type() -> Result<()> {
    let path = temp_csv("rendering");
    let config = CaptureConfig::default()
        .with_duration_secs(0.03)?
        .with_output(&path);

    let mut bus = VirtualBus::new();
    bus.push_frame(1.25, VirtualFrame::standard(291, &[0xDE, 0xAD]).unwrap());
    bus.push_frame(
        1.5,
        VirtualFrame::extended(0x18FEF100, &[0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28])
            .unwrap(),
    );
    bus.push_frame(1.75, VirtualFrame::remote(0x7DF, 8, false).unwrap());

    capture_with(bus, &config)?;

    let rows = read_rows(&path);
    assert_eq!(rows[1], ["1.25", "123", "dead", "2", "Standard"]);
    assert_eq!(rows[2], ["1.5", "18fef100", "2122232425262728", "8", "Extended"]);
    assert_eq!(rows[3], ["1.75", "7df", "", "8", "Standard"]);

    std::fs::remove_file(path)?;
    Ok(())
}

#[test]
fn timestamps_pass_through_unchanged() {
    let mut bus = VirtualBus::new();
    bus.push_frame(1_697_040_000.123456, VirtualFrame::standard(0x1, &[]).unwrap());
    bus.push_frame(0.000001, VirtualFrame::standard(0x2, &[]).unwrap());

    let session = can_capture::run(bus, Duration::from_millis(20), Duration::from_millis(5));
    let stamps: Vec<f64> = session.iter().map(|f| f.timestamp).collect();
    assert_eq!(stamps, [1_697_040_000.123456, 0.000001]);
}

#[test]
fn accepts_any_embedded_can_frame() {
    use crate::MockCanFrame;
    use can_capture::{CapturedFrame, FrameKind};

    let frame = CapturedFrame::from_frame(3.0, &MockCanFrame::extended(0x1ABCDEF, &[0x0F]));
    assert_eq!(frame.kind, FrameKind::Extended);
    assert_eq!(frame.id_hex(), "1abcdef");
    assert_eq!(frame.data_hex(), "0f");

    let frame = CapturedFrame::from_frame(3.0, &MockCanFrame::standard(0x7FF, &[]));
    assert_eq!(frame.kind, FrameKind::Standard);
    assert_eq!(frame.id_hex(), "7ff");
}
