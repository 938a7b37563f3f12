use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

const SONGS_DIR: &str = "songs";
const IMAGES_DIR: &str = "images";
const DEFAULT_POOL_FILE: &str = "default_songs.txt";

/// Resolved resource layout under one player root.
#[derive(Debug, Clone)]
pub struct Dirs {
    pub root: PathBuf,
    pub songs: PathBuf,
    pub images: PathBuf,
    pub pool: PathBuf,
}

impl Dirs {
    pub fn from_root(root: PathBuf) -> Self {
        Self {
            songs: root.join(SONGS_DIR),
            images: root.join(IMAGES_DIR),
            pool: root.join(DEFAULT_POOL_FILE),
            root,
        }
    }
}

/// Player root: explicit flag, else `CHIME_DIR`, else the working directory.
pub fn resolve_root(cli_root: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = cli_root {
        return Ok(root.to_path_buf());
    }
    if let Ok(override_dir) = env::var("CHIME_DIR") {
        return Ok(PathBuf::from(override_dir));
    }
    env::current_dir().context("failed to resolve the current directory")
}
