//! Unpacks a downloaded zip archive into a destination directory.
//!
//! Entries are pulled one at a time from the stream reader, so at most one
//! entry is open for reading at any point and extraction order is exactly
//! archive order.

use async_zip::base::read::stream::ZipFileReader;
use futures::io::AsyncWriteExt as _;
use tokio_util::compat::{TokioAsyncReadCompatExt as _, TokioAsyncWriteCompatExt as _};
use tracing::{debug, info};

use std::path::{Component, Path, PathBuf};

use crate::error::Result;

/// Extracts the archive at `archive_path` into `destination`.
///
/// Entries whose stored path would land outside `destination` are skipped
/// and logged, never fatal. Directory entries create their directory;
/// file entries create their parent directories regardless of whether a
/// directory entry preceded them, then stream their data to disk. Any read
/// or write error while extracting a file aborts the whole extraction.
///
/// # Panics
///
/// Panics if the archive reader is [`None`], which is unreachable.
///
/// # Errors
///
/// Returns an error if the archive is corrupt or a filesystem operation on
/// a non-skipped entry fails.
pub async fn extract_archive<P>(archive_path: P, destination: P) -> Result<()>
where
    P: AsRef<Path> + Send + Sync,
{
    let destination = destination.as_ref();
    tokio::fs::create_dir_all(destination).await?;

    let file = tokio::fs::File::open(archive_path.as_ref()).await?;
    let reader = tokio::io::BufReader::new(file).compat();
    let mut a_ready = Some(ZipFileReader::new(reader));

    while let Some(mut a_reading) = a_ready
        .take()
        .expect("unreachable")
        .next_with_entry()
        .await?
    {
        let Ok(name) = a_reading.reader().entry().filename().as_str() else {
            a_ready = Some(a_reading.skip().await?);
            continue;
        };
        let name = name.to_owned();

        let Some(target) = guarded_path(destination, &name) else {
            info!(
                "path {name} resolves outside of {}, skipping",
                destination.display()
            );
            a_ready = Some(a_reading.skip().await?);
            continue;
        };

        if name.ends_with('/') {
            // Directory entries are optional in a well-formed archive.
            if !target.is_dir() {
                debug!("creating {}", target.display());
                tokio::fs::create_dir_all(&target).await?;
            }
        } else {
            debug!("extracting {name}…");

            // The parent may not exist if iteration is out of order or the
            // archive carries no directory entries.
            if let Some(parent) = target.parent() {
                if !parent.is_dir() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }

            let mut writer = tokio::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&target)
                .await?
                .compat_write();
            futures::io::copy(a_reading.reader_mut(), &mut writer).await?;
            writer.flush().await?;
        }

        a_ready = Some(a_reading.done().await?);
    }

    Ok(())
}

/// Joins an entry's stored path onto the destination, lexically normalized.
///
/// Returns [`None`] (the skip signal) when the stored path is absolute,
/// empty after normalization, or climbs out of the destination through
/// parent-directory components.
fn guarded_path(destination: &Path, entry_name: &str) -> Option<PathBuf> {
    let normalized = entry_name.replace('\\', "/");

    let mut relative = PathBuf::new();
    let mut depth = 0usize;
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => {
                relative.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                relative.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(destination.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard(name: &str) -> Option<PathBuf> {
        guarded_path(Path::new("/out"), name)
    }

    #[test]
    fn plain_entries_stay_inside() {
        assert_eq!(guard("normal.txt"), Some(PathBuf::from("/out/normal.txt")));
        assert_eq!(
            guard("sub/normal.txt"),
            Some(PathBuf::from("/out/sub/normal.txt"))
        );
        assert_eq!(guard("logs/"), Some(PathBuf::from("/out/logs")));
    }

    #[test]
    fn parent_traversal_is_rejected() {
        assert_eq!(guard("../evil.txt"), None);
        assert_eq!(guard("../../etc/passwd"), None);
        assert_eq!(guard("sub/../../evil.txt"), None);
    }

    #[test]
    fn parent_components_inside_the_tree_are_folded() {
        assert_eq!(guard("a/../b.txt"), Some(PathBuf::from("/out/b.txt")));
        assert_eq!(guard("a/./b.txt"), Some(PathBuf::from("/out/a/b.txt")));
    }

    #[test]
    fn absolute_and_empty_entries_are_rejected() {
        assert_eq!(guard("/etc/passwd"), None);
        assert_eq!(guard(""), None);
        assert_eq!(guard("."), None);
        assert_eq!(guard("./"), None);
    }

    #[test]
    fn backslashes_are_treated_as_separators() {
        assert_eq!(
            guard("sub\\normal.txt"),
            Some(PathBuf::from("/out/sub/normal.txt"))
        );
        assert_eq!(guard("..\\evil.txt"), None);
    }
}
