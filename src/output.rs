use std::io::Write;

use crate::pki::MatchRecord;

/// Writes `records` as a pretty-printed JSON array followed by a newline.
pub fn write_json<W: Write>(mut writer: W, records: &[MatchRecord]) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer).map_err(serde_json::Error::io)
}
