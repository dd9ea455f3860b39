//! JSON I/O handling for CLI
//!
//! - Output: one compact JSON object per response
//! - UTF-8 only

use std::io::Write;

use serde_json::Value;

use super::errors::CliResult;

/// Build a success response
pub fn ok_response(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

/// Build an error response
pub fn error_response(code: &str, message: &str) -> Value {
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

/// Write one compact JSON value followed by a newline
pub fn write_json<W: Write>(writer: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}
