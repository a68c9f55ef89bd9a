//! Item enumeration: every image or video under a directory, as `/`-joined
//! paths relative to that directory.

use duelrank_core::rename::{file_stem, parent_dir};
use std::collections::HashSet;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "svg"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "avi", "mov", "wmv", "flv", "m4v"];

/// A thumbnail is dropped when its full-size sibling is present.
const THUMBNAIL_SUFFIXES: &[&str] = &["_thumbnail", "_thumb", "_preview"];

fn extension(file_name: &str) -> Option<String> {
    file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}

pub fn is_image(file_name: &str) -> bool {
    extension(file_name).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

pub fn is_video(file_name: &str) -> bool {
    extension(file_name).is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// Recursively list files accepted by `keep`, sorted by relative path.
pub fn walk_files(root: &Path, keep: impl Fn(&str) -> bool) -> io::Result<Vec<String>> {
    let mut found = Vec::new();
    walk_into(root, "", &keep, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk_into(
    dir: &Path,
    prefix: &str,
    keep: &dyn Fn(&str) -> bool,
    found: &mut Vec<String>,
) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else {
            warn!(path = %entry.path().display(), "skipping non-UTF-8 file name");
            continue;
        };
        let relative = if prefix.is_empty() { name.clone() } else { format!("{prefix}/{name}") };

        if entry.file_type()?.is_dir() {
            walk_into(&entry.path(), &relative, keep, found)?;
        } else if keep(name.as_str()) {
            found.push(relative);
        }
    }
    Ok(())
}

/// Drop `x_thumb.jpg` (and `_thumbnail`, `_preview`) when some `x.*` exists in
/// the same directory. A thumbnail without its original is kept.
pub fn filter_thumbnails(paths: Vec<String>) -> Vec<String> {
    let stems: HashSet<(&str, &str)> =
        paths.iter().map(|p| (parent_dir(p), file_stem(p))).collect();

    let is_redundant = |path: &str| {
        let stem = file_stem(path);
        THUMBNAIL_SUFFIXES
            .iter()
            .find_map(|suffix| stem.strip_suffix(*suffix))
            .is_some_and(|original| stems.contains(&(parent_dir(path), original)))
    };

    let (kept, dropped): (Vec<&String>, Vec<&String>) =
        paths.iter().partition(|p| !is_redundant(p.as_str()));
    if !dropped.is_empty() {
        debug!(count = dropped.len(), "thumbnails skipped");
    }
    kept.into_iter().cloned().collect()
}

/// Every comparable media file under `root`.
pub fn collect_items(root: &Path) -> io::Result<Vec<String>> {
    let media = walk_files(root, |name| is_image(name) || is_video(name))?;
    Ok(filter_thumbnails(media))
}
