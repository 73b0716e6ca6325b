//! Zip-code normalization.
//!
//! Zip codes are read as text and used as a categorical feature, so `1234`
//! and `01234` must collapse to the same category. Values are trimmed, then
//! left-padded with `0` to [`ZIP_WIDTH`] characters; what happens to longer
//! values is decided by [`ZipPolicy`].

use crate::domain::{ZIP_WIDTH, ZipPolicy};

/// Normalize a single zip value.
///
/// A leading sign stays in front of the padding, e.g. `-12` -> `-0012`.
/// Returns `Err` with a description only under [`ZipPolicy::Reject`].
pub fn normalize_zip(raw: &str, policy: ZipPolicy) -> Result<String, String> {
    let value = raw.trim();
    let padded = zero_fill(value, ZIP_WIDTH);

    if padded.chars().count() <= ZIP_WIDTH {
        return Ok(padded);
    }

    match policy {
        ZipPolicy::Keep => Ok(padded),
        ZipPolicy::Truncate => Ok(padded.chars().take(ZIP_WIDTH).collect()),
        ZipPolicy::Reject => Err(format!(
            "zip code '{value}' is longer than {ZIP_WIDTH} characters"
        )),
    }
}

fn zero_fill(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }

    let fill = "0".repeat(width - len);
    match value.strip_prefix(['+', '-']) {
        Some(rest) => {
            let sign = &value[..1];
            format!("{sign}{fill}{rest}")
        }
        None => format!("{fill}{value}"),
    }
}
