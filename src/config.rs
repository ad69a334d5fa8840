//! Runtime configuration read from `WORLDPOP_*` environment variables.

use std::env;
use std::path::PathBuf;

use log::warn;

pub const DEFAULT_DATA_PATH: &str = "db/data.csv";
pub const DEFAULT_IMAGE_DIR: &str = "img";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_PIE_TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub image_dir: PathBuf,
    pub bind_addr: String,
    pub pie_top_n: usize,
    /// TTF file used for chart text. Falls back to a system font search when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            pie_top_n: DEFAULT_PIE_TOP_N,
            font_path: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            data_path: non_empty("WORLDPOP_DATA")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            image_dir: non_empty("WORLDPOP_IMG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.image_dir),
            bind_addr: non_empty("WORLDPOP_BIND").unwrap_or(defaults.bind_addr),
            pie_top_n: parse_top_n(non_empty("WORLDPOP_PIE_TOP_N"), defaults.pie_top_n),
            font_path: non_empty("WORLDPOP_FONT").map(PathBuf::from),
        }
    }
}

fn parse_top_n(raw: Option<String>, default: usize) -> usize {
    match raw {
        None => default,
        Some(value) => match value.trim().parse::<usize>() {
            Ok(parsed) if parsed > 0 => parsed,
            _ => {
                warn!("invalid WORLDPOP_PIE_TOP_N '{value}', defaulting to {default}");
                default
            }
        },
    }
}
