//! CLI command implementations for Tollgate.

pub mod keys;
pub mod secret;
pub mod token;

use std::fs;
use std::path::Path;

/// Read `arg` as a file when it names one, otherwise use it verbatim.
pub(crate) fn read_arg(arg: &str) -> anyhow::Result<String> {
    let path = Path::new(arg);
    if path.is_file() {
        return Ok(fs::read_to_string(path)?.trim().to_string());
    }
    Ok(arg.trim().to_string())
}
