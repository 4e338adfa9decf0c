//! Artifacts from GitHub REST API.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Represents artifacts from GitHub REST API.
#[derive(Debug, Deserialize, Clone)]
pub struct Artifacts {
    /// The number of artifacts across all pages.
    pub total_count: u64,
    /// The artifacts of this page, in platform order.
    pub artifacts: Vec<Artifact>,
}

/// Represents an artifact from GitHub REST API.
///
/// Serialized back out verbatim as part of the `artifacts` step output.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Artifact {
    /// The artifact identifier, used for the zip download.
    pub id: u64,
    /// The name given at upload.
    pub name: String,
    /// The uncompressed size.
    pub size_in_bytes: u64,
    /// Whether the artifact has passed its retention period.
    #[serde(default)]
    pub expired: bool,
}

impl Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.name,
            self.id,
            format_size(self.size_in_bytes)
        )
    }
}

/// Formats a byte count with base-10 units.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_are_base_10() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(999), "999 B");
        assert_eq!(format_size(1000), "1.00 kB");
        assert_eq!(format_size(1500), "1.50 kB");
        assert_eq!(format_size(1_234_567), "1.23 MB");
        assert_eq!(format_size(9_876_543_210), "9.88 GB");
    }

    #[test]
    fn artifact_display_names_the_download() {
        let artifact = Artifact {
            id: 11,
            name: String::from("build-linux"),
            size_in_bytes: 2000,
            expired: false,
        };
        assert_eq!(artifact.to_string(), "build-linux (11, 2.00 kB)");
    }
}
