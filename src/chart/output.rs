//! Where rendered images live on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{info, warn};

use crate::chart::ChartKind;

/// `<dir>/<kind>_<Entity_Name>.png`
pub fn chart_path(dir: &Path, kind: ChartKind, entity: &str) -> PathBuf {
    dir.join(format!("{}_{}.png", kind.as_str(), file_stem(entity)))
}

fn file_stem(entity: &str) -> String {
    entity
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|ch| !matches!(ch, '/' | '\\' | ':' | '\0'))
        .collect()
}

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Hidden sibling of `path`, unique per process and call. Keeps the `.png`
/// extension since the bitmap encoder picks the image format from it.
pub fn staging_path(path: &Path) -> PathBuf {
    let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(".png").unwrap_or(&name);
    path.with_file_name(format!(".{stem}.{}-{seq}.png", process::id()))
}

/// Run `draw` against a staging file, then rename it onto `path`. Readers of `path`
/// only ever see the previous image or the complete new one.
pub fn write_atomically<E: From<io::Error>>(
    path: &Path,
    draw: impl FnOnce(&Path) -> Result<(), E>,
) -> Result<(), E> {
    let staging = staging_path(path);
    let outcome = draw(&staging).and_then(|()| fs::rename(&staging, path).map_err(E::from));
    if outcome.is_err() {
        let _ = fs::remove_file(&staging);
    }
    outcome
}

/// Delete every PNG left in `dir` by a previous run, creating `dir` if needed.
/// Failures are logged and otherwise ignored. Returns the number of files removed.
pub fn clear_rendered_images(dir: &Path) -> usize {
    if let Err(err) = fs::create_dir_all(dir) {
        warn!("could not create image directory '{}': {err}", dir.display());
        return 0;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("could not list image directory '{}': {err}", dir.display());
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_png = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if !is_png || !path.is_file() {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(err) => warn!("could not delete '{}': {err}", path.display()),
        }
    }

    info!("cleared {removed} rendered image(s) from '{}'", dir.display());
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(name: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("worldpop-{name}-{stamp}"))
    }

    #[test]
    fn paths_use_kind_prefix_and_underscores() {
        let dir = Path::new("img");
        assert_eq!(
            chart_path(dir, ChartKind::Pie, "South America"),
            PathBuf::from("img/pie_South_America.png")
        );
        assert_eq!(
            chart_path(dir, ChartKind::Bar, "Colombia"),
            PathBuf::from("img/bar_Colombia.png")
        );
        assert_eq!(
            chart_path(dir, ChartKind::Bar, "../etc"),
            PathBuf::from("img/bar_..etc.png")
        );
    }

    #[test]
    fn clearing_removes_only_png_files() {
        let dir = unique_temp_dir("clear");
        fs::create_dir_all(&dir).expect("temp dir should be created");
        fs::write(dir.join("bar_Colombia.png"), b"png").expect("fixture should be written");
        fs::write(dir.join("pie_Asia.PNG"), b"png").expect("fixture should be written");
        fs::write(dir.join("notes.txt"), b"keep").expect("fixture should be written");

        assert_eq!(clear_rendered_images(&dir), 2);
        assert!(dir.join("notes.txt").exists());
        assert!(!dir.join("bar_Colombia.png").exists());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn staging_paths_are_hidden_unique_siblings() {
        let target = Path::new("img/bar_Colombia.png");
        let first = staging_path(target);
        let second = staging_path(target);

        assert_ne!(first, second);
        assert_eq!(first.parent(), target.parent());
        assert_eq!(first.extension().and_then(|ext| ext.to_str()), Some("png"));
        let name = first.file_name().and_then(|name| name.to_str()).unwrap_or_default();
        assert!(name.starts_with(".bar_Colombia."), "{name}");
    }

    #[test]
    fn atomic_write_replaces_target_and_leaves_no_staging_file() {
        let dir = unique_temp_dir("atomic");
        fs::create_dir_all(&dir).expect("temp dir should be created");
        let target = dir.join("pie_Asia.png");
        fs::write(&target, b"old").expect("fixture should be written");

        write_atomically::<io::Error>(&target, |staging| fs::write(staging, b"new"))
            .expect("write should succeed");
        assert_eq!(fs::read(&target).expect("target should exist"), b"new");

        let failed = write_atomically::<io::Error>(&target, |staging| {
            fs::write(staging, b"partial")?;
            Err(io::Error::other("drawing stopped"))
        });
        assert!(failed.is_err());
        assert_eq!(fs::read(&target).expect("target should survive"), b"new");

        let leftovers = fs::read_dir(&dir)
            .expect("dir should list")
            .flatten()
            .filter(|entry| entry.file_name().to_string_lossy().starts_with('.'))
            .count();
        assert_eq!(leftovers, 0);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn clearing_creates_missing_directory() {
        let dir = unique_temp_dir("missing");
        assert_eq!(clear_rendered_images(&dir), 0);
        assert!(dir.is_dir());
        let _ = fs::remove_dir_all(dir);
    }
}
