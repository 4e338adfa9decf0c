//! Pre-made transactions: artifact retrieval and archive extraction.

mod download_artifact;
mod extract_archive;

pub use download_artifact::*;
pub use extract_archive::*;
