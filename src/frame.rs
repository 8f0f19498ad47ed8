//! Captured CAN frame records.
//!
//! A [`CapturedFrame`] is what the acquisition loop keeps for every message the
//! driver hands back: the driver timestamp, the raw arbitration ID, the payload
//! bytes, the declared DLC and whether the frame used an 11-bit or 29-bit ID.
//!
//! Frames are decoded from anything implementing [`embedded_can::Frame`], so
//! SocketCAN frames, the in-memory [`VirtualFrame`](crate::VirtualFrame) and
//! test doubles all go through the same path.

use core::fmt;

use embedded_can::{Frame, Id};

/// Addressing mode of a CAN frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// 11-bit identifier
    Standard,
    /// 29-bit identifier
    Extended,
}

impl FrameKind {
    /// Text written to the `Message Type` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            FrameKind::Standard => "Standard",
            FrameKind::Extended => "Extended",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bus frame paired with the capture time reported by the driver.
#[derive(Debug, Clone)]
pub struct TimestampedFrame<F> {
    /// Timestamp in seconds, as supplied by the driver.
    pub timestamp_s: f64,
    /// The frame as received.
    pub frame: F,
}

impl<F> TimestampedFrame<F> {
    /// Create a new timestamped frame.
    #[inline]
    pub fn new(timestamp_s: f64, frame: F) -> Self {
        Self { timestamp_s, frame }
    }
}

/// Extract the numeric value of an `embedded_can` identifier.
#[inline]
pub fn raw_id(id: Id) -> u32 {
    match id {
        Id::Standard(id) => u32::from(id.as_raw()),
        Id::Extended(id) => id.as_raw(),
    }
}

/// One received CAN message, decoded for output.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFrame {
    /// Driver timestamp in seconds, never re-based.
    pub timestamp: f64,
    /// Numeric arbitration ID.
    pub arbitration_id: u32,
    /// Payload bytes as delivered.
    pub payload: Vec<u8>,
    /// Declared length. Not checked against `payload.len()`.
    pub dlc: usize,
    /// Standard or extended addressing.
    pub kind: FrameKind,
}

impl CapturedFrame {
    /// Decode a driver frame.
    pub fn from_frame<F: Frame>(timestamp: f64, frame: &F) -> Self {
        let kind = if frame.is_extended() {
            FrameKind::Extended
        } else {
            FrameKind::Standard
        };
        Self {
            timestamp,
            arbitration_id: raw_id(frame.id()),
            payload: frame.data().to_vec(),
            dlc: frame.dlc(),
            kind,
        }
    }

    /// Decode a driver frame together with its timestamp.
    pub fn from_timestamped<F: Frame>(entry: &TimestampedFrame<F>) -> Self {
        Self::from_frame(entry.timestamp_s, &entry.frame)
    }

    /// Arbitration ID as lowercase hex without prefix or padding.
    pub fn id_hex(&self) -> String {
        format!("{:x}", self.arbitration_id)
    }

    /// Payload as lowercase hex without separators.
    pub fn data_hex(&self) -> String {
        hex_bytes(&self.payload)
    }
}

impl fmt::Display for CapturedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Timestamp={}, ID={}, Data={}, DLC={}, Type={}",
            self.timestamp,
            self.id_hex(),
            self.data_hex(),
            self.dlc,
            self.kind
        )
    }
}

/// Render bytes as contiguous lowercase hex.
pub fn hex_bytes(bytes: &[u8]) -> String {
    use fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // Writing to a String cannot fail.
        let _ = write!(out, "{b:02x}");
    }
    out
}
