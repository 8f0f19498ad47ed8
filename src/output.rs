//! CSV output for capture sessions.
//!
//! The file has one header row followed by one row per captured frame, in
//! capture order:
//!
//! ```text
//! Timestamp,Arbitration ID (hex),Data (hex),DLC,Message Type
//! 1697040000.123456,123,dead,2,Standard
//! ```
//!
//! The header is always written, so an empty session still produces a valid
//! table.

use std::io;
use std::path::Path;

use serde::Serialize;

use crate::capture::CaptureSession;
use crate::frame::CapturedFrame;
use crate::{Error, Result};

/// Column labels, in output order.
pub const HEADER: [&str; 5] = [
    "Timestamp",
    "Arbitration ID (hex)",
    "Data (hex)",
    "DLC",
    "Message Type",
];

/// One CSV data row.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    timestamp: f64,
    arbitration_id: String,
    data: String,
    dlc: usize,
    message_type: &'a str,
}

impl<'a> From<&'a CapturedFrame> for CsvRow<'a> {
    fn from(frame: &'a CapturedFrame) -> Self {
        Self {
            timestamp: frame.timestamp,
            arbitration_id: frame.id_hex(),
            data: frame.data_hex(),
            dlc: frame.dlc,
            message_type: frame.kind.as_str(),
        }
    }
}

fn builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    // HEADER is written by hand so it also appears for empty sessions.
    builder.has_headers(false);
    builder
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, session: &CaptureSession) -> Result<()> {
    wtr.write_record(HEADER)?;
    for frame in session.iter() {
        wtr.serialize(CsvRow::from(frame))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `session` as CSV to any byte sink.
pub fn write_session<W: io::Write>(session: &CaptureSession, out: W) -> Result<()> {
    let mut wtr = builder().from_writer(out);
    write_rows(&mut wtr, session)
}

/// Write `session` to `path`, creating or truncating the file.
pub fn write_csv<P: AsRef<Path>>(session: &CaptureSession, path: P) -> Result<()> {
    let mut wtr = builder().from_path(path.as_ref())?;
    write_rows(&mut wtr, session)
}

/// Render `session` as a CSV string.
pub fn to_csv_string(session: &CaptureSession) -> Result<String> {
    let mut wtr = builder().from_writer(Vec::new());
    write_rows(&mut wtr, session)?;
    let bytes = wtr.into_inner().map_err(|e| Error::IOError(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| Error::IOError(io::Error::new(io::ErrorKind::InvalidData, e)))
}
