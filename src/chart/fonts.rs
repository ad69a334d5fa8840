//! Register a TTF font with plotters so chart text can be drawn.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, warn};
use plotters::style::{register_font, FontStyle};

pub const FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Register the first usable font, once per process. Returns whether text can be drawn.
/// Later calls return the first outcome regardless of `preferred`.
pub fn ensure_font(preferred: Option<&Path>) -> bool {
    REGISTERED
        .get_or_init(|| {
            let registered = candidates(preferred).into_iter().find(|path| try_register(path));
            match &registered {
                Some(path) => debug!("chart font registered from '{}'", path.display()),
                None => warn!("no usable TTF font found; charts will be rendered without text"),
            }
            registered
        })
        .is_some()
}

fn candidates(preferred: Option<&Path>) -> Vec<PathBuf> {
    preferred
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from))
        .collect()
}

fn try_register(path: &Path) -> bool {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    // plotters keeps a 'static reference; only readable candidates get this far.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    if register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok() {
        return true;
    }
    warn!("font '{}' rejected: not a usable TTF/OTF file", path.display());
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn unreadable_or_invalid_fonts_are_skipped() {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let bogus = std::env::temp_dir().join(format!("worldpop-font-{stamp}.ttf"));
        fs::write(&bogus, b"definitely not a font").expect("fixture should be written");

        assert!(!try_register(&bogus));
        assert!(!try_register(&bogus.with_extension("missing")));

        let _ = fs::remove_file(bogus);
    }

    #[test]
    fn preferred_font_is_tried_first() {
        let preferred = Path::new("/fonts/custom.ttf");
        let list = candidates(Some(preferred));
        assert_eq!(list[0], preferred);
        assert_eq!(list.len(), SYSTEM_FONT_CANDIDATES.len() + 1);
    }
}
