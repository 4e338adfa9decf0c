//! Writes step outputs for the invoking workflow.
//!
//! Outputs are appended to the file named by `GITHUB_OUTPUT`; when that is
//! unset (local runs), they are logged instead.

use std::{
    fmt::Display,
    fs::OpenOptions,
    io::{self, Write as _},
    path::Path,
};

use tracing::info;

use crate::env::GITHUB_OUTPUT;

/// Sets a single step output.
///
/// # Errors
///
/// Returns an error if the output file cannot be appended to.
pub fn set_output<V>(key: &str, value: V) -> io::Result<()>
where
    V: Display,
{
    let value = value.to_string();
    match GITHUB_OUTPUT.as_deref() {
        Some(path) => append_output(path, key, &value),
        None => {
            info!("output {key}={value}");
            Ok(())
        }
    }
}

fn append_output(path: &Path, key: &str, value: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if value.contains('\n') {
        // Multi-line values use the heredoc form of the output file format.
        writeln!(file, "{key}<<__OUTPUT_DELIMITER__")?;
        writeln!(file, "{value}")?;
        writeln!(file, "__OUTPUT_DELIMITER__")
    } else {
        writeln!(file, "{key}={value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_append_as_key_value_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");

        append_output(&path, "found_artifact", "true").unwrap();
        append_output(&path, "artifacts", "[]").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "found_artifact=true\nartifacts=[]\n");
    }

    #[test]
    fn multi_line_values_use_the_heredoc_form() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");

        append_output(&path, "error_message", "first\nsecond").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "error_message<<__OUTPUT_DELIMITER__\nfirst\nsecond\n__OUTPUT_DELIMITER__\n"
        );
    }
}
