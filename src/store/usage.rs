//! Storage accounting: how many bytes an owner's files occupy.

use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Total size in bytes of every regular file below `root`. A missing
/// directory occupies nothing. Symlinks are not followed.
pub fn storage_usage(root: &Path) -> io::Result<u64> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    let paths: Vec<PathBuf> = entries.map(|entry| entry.map(|e| e.path())).collect::<io::Result<_>>()?;

    paths
        .par_iter()
        .map(|path| {
            let meta = fs::symlink_metadata(path)?;
            if meta.is_dir() {
                storage_usage(path)
            } else if meta.is_file() {
                Ok(meta.len())
            } else {
                Ok(0)
            }
        })
        .try_reduce(|| 0, |a, b| Ok(a + b))
}

/// Formats a byte count with base-1024 units, e.g. `1536 -> "1.5 KB"`.
///
/// Values are rounded to two decimals and always show at least one, matching
/// the figures users already see on their profile page.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }
    let mut exponent = 0;
    while let Some(next) = 1024u64.checked_pow(exponent as u32 + 1) {
        if bytes < next {
            break;
        }
        exponent += 1;
    }
    let scaled = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (scaled * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{:.1} {}", rounded, UNITS[exponent])
    } else {
        format!("{} {}", rounded, UNITS[exponent])
    }
}
