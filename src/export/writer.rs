//! Idempotent artifact writes.
//!
//! Every artifact follows the same rule: fetch only when forced or when
//! the target does not exist yet, then replace the target atomically
//! (temp file, fsync, rename). A run killed mid-write leaves either the
//! previous file or no file, never a truncated one that later runs would
//! mistake for a finished download.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::Result;

/// Whether an artifact at `target` must be (re)fetched.
#[must_use]
pub fn should_fetch(target: &Path, force: bool) -> bool {
    force || !target.exists()
}

/// Write bytes to a file atomically.
///
/// 1. Writes content to a uniquely named hidden temp file in the target
///    directory, so it never shares a name with a sibling artifact
/// 2. Calls `fsync` so the data is on disk
/// 3. Renames the temp file over the target
///
/// # Errors
///
/// Returns an error if any file operation fails. The target is left
/// untouched in that case and the temp file is removed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.flush()?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// Serialize `value` and write it atomically as one JSON document.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_vec(value)?;
    atomic_write(path, &content)
}

/// File names for a list of attachments stored in one directory.
///
/// Remote names are reduced to their last path component so nothing is
/// written outside the directory. Repeated names get a positional suffix
/// (`a.png`, `a (1).png`, ...) that skips any name already taken or
/// used verbatim elsewhere in the list. The result depends only on the
/// input order, so the same ticket maps to the same files on every run.
#[must_use]
pub fn attachment_file_names<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let bases: Vec<String> = names
        .into_iter()
        .enumerate()
        .map(|(index, raw)| sanitize_file_name(raw, index))
        .collect();
    let verbatim: HashSet<&str> = bases.iter().map(String::as_str).collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(bases.len());

    bases
        .iter()
        .map(|base| {
            let name = if taken.contains(base) {
                (1..)
                    .map(|n| with_suffix(base, n))
                    .find(|candidate| {
                        !taken.contains(candidate) && !verbatim.contains(candidate.as_str())
                    })
                    .unwrap_or_else(|| base.clone())
            } else {
                base.clone()
            };
            taken.insert(name.clone());
            name
        })
        .collect()
}

fn sanitize_file_name(raw: &str, index: usize) -> String {
    // Remote names may use either separator.
    let last = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if last.is_empty() || last == "." || last == ".." {
        format!("attachment-{index}")
    } else {
        last.to_string()
    }
}

fn with_suffix(name: &str, n: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{} ({n}){}", &name[..dot], &name[dot..]),
        _ => format!("{name} ({n})"),
    }
}
