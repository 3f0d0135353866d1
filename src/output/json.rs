use crate::diagnostics::DiagnosticRecord;
use std::io::Write;

pub(super) fn write(records: &[DiagnosticRecord], out: &mut impl Write) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(&mut *out, records)?;
    writeln!(out).map_err(serde_json::Error::io)
}
