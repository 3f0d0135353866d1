use crate::diagnostics::DiagnosticRecord;
use std::io::Write;

pub const TSV_HEADER: &str = "id\tpackage_name\tfile_name\terror_code\tdescription";

/// Replace the delimiter and line breaks so a value stays in its cell
pub fn sanitize_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

pub(super) fn write(records: &[DiagnosticRecord], out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{}", TSV_HEADER)?;
    for record in records {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            record.id,
            sanitize_field(&record.package_name),
            sanitize_field(&record.file_name),
            record.error_code,
            sanitize_field(&record.description),
        )?;
    }
    Ok(())
}
