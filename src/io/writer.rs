use std::io::Write;

use serde::Serialize;

use crate::io::IoError;

/// Writes `value` as two-space indented JSON followed by a newline.
pub fn write_pretty_json<W: Write, T: Serialize>(mut writer: W, value: &T) -> Result<(), IoError> {
    let mut buffer = serde_json::to_vec_pretty(value)?;
    buffer.push(b'\n');
    writer.write_all(&buffer)?;
    writer.flush()?;
    Ok(())
}
