//! JSON output for CLI commands
//!
//! Every command prints exactly one line to stdout:
//! `{"status":"ok","data":...}` or `{"status":"error","code":...,"message":...}`

use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;

use super::errors::CliResult;

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Response<'a> {
    Ok { data: Value },
    Error { code: &'a str, message: &'a str },
}

fn emit(response: &Response<'_>) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    emit(&Response::Ok { data })
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    emit(&Response::Error { code, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shapes() {
        let ok = serde_json::to_value(Response::Ok { data: json!([1]) }).unwrap();
        assert_eq!(ok, json!({"status": "ok", "data": [1]}));

        let err = serde_json::to_value(Response::Error {
            code: "COND_CLI_IO_ERROR",
            message: "broken pipe",
        })
        .unwrap();
        assert_eq!(
            err,
            json!({"status": "error", "code": "COND_CLI_IO_ERROR", "message": "broken pipe"})
        );
    }
}
