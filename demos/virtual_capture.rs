//! Example: capture scripted traffic from the in-memory bus to CSV.
//!
//! The virtual bus delivers a few frames, a bus-off fault and a timeout, then
//! goes idle until the capture window closes. The resulting table is printed.
//!
//! Run with: `cargo run --example virtual_capture`

use can_capture::{
    BusError, CaptureConfig, DriverKind, ScriptedEvent, VirtualBus, VirtualFrame, capture_with,
};

fn main() -> Result<(), can_capture::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::temp_dir().join("virtual_capture.csv");
    let config = CaptureConfig::default()
        .with_channel("vcan0")
        .with_driver(DriverKind::Virtual)
        .with_duration_secs(0.1)?
        .with_output(&path);

    let mut bus = VirtualBus::open(&config.channel);
    // OBD-II request for engine RPM and the ECU's reply
    bus.push_frame(0.000, VirtualFrame::standard(0x7DF, &[0x02, 0x01, 0x0C]).unwrap());
    bus.push_frame(0.012, VirtualFrame::standard(0x7E8, &[0x04, 0x41, 0x0C, 0x1A, 0xF8]).unwrap());
    bus.push_error(BusError::Driver("bus-off".into()));
    bus.push(ScriptedEvent::Timeout);
    // J1939 EEC1 broadcast
    bus.push_frame(
        0.020,
        VirtualFrame::extended(0x0CF00400, &[0xF0, 0x7D, 0x7D, 0x00, 0x00, 0x00, 0xF0, 0xFF])
            .unwrap(),
    );

    let session = capture_with(bus, &config)?;
    let stats = session.stats();
    println!(
        "Captured {} frames ({} standard, {} extended), {} bus errors over {} polls\n",
        stats.frames, stats.standard_frames, stats.extended_frames, stats.errors(), stats.polls
    );

    print!("{}", std::fs::read_to_string(&path)?);
    Ok(())
}
