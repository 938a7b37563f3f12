use crate::model::{CoverArt, SongEntry};
use image::imageops::FilterType;
use std::path::{Path, PathBuf};

const COVER_EXTENSIONS: &[&str] = &["png", "jpg"];
const DEFAULT_STEM: &str = "default";

/// Answers whether one cover candidate is usable. Production uses
/// [`DecodeProbe`]; tests script outcomes with a closure.
pub trait CoverProbe {
    fn probe(&self, candidate: &Path) -> bool;
}

impl<F: Fn(&Path) -> bool> CoverProbe for F {
    fn probe(&self, candidate: &Path) -> bool {
        self(candidate)
    }
}

/// A candidate loads iff the image crate can decode it.
pub struct DecodeProbe;

impl CoverProbe for DecodeProbe {
    fn probe(&self, candidate: &Path) -> bool {
        image::ImageReader::open(candidate)
            .ok()
            .and_then(|reader| reader.with_guessed_format().ok())
            .and_then(|reader| reader.decode().ok())
            .is_some()
    }
}

/// Resolves one display image for a song: `{base}.png`, `{base}.jpg`, then
/// `default.png`, `default.jpg`. Candidates are probed one at a time so a hit
/// stops further loads. All four failing is not an error.
pub fn resolve(entry: &SongEntry, images_dir: &Path, probe: &dyn CoverProbe) -> CoverArt {
    if let Some(path) = first_hit(images_dir, &entry.base, probe) {
        return CoverArt::Matched(path);
    }
    if let Some(path) = first_hit(images_dir, DEFAULT_STEM, probe) {
        return CoverArt::Fallback(path);
    }
    CoverArt::Missing
}

fn first_hit(images_dir: &Path, stem: &str, probe: &dyn CoverProbe) -> Option<PathBuf> {
    COVER_EXTENSIONS
        .iter()
        .map(|ext| images_dir.join(format!("{stem}.{ext}")))
        .find(|candidate| probe.probe(candidate))
}

/// Downscaled RGB rows for the terminal cover panel. `rows` pairs of pixel
/// rows render as one row of half-block cells.
pub fn thumbnail(art: &CoverArt, columns: u32, rows: u32) -> Option<Vec<Vec<(u8, u8, u8)>>> {
    let path = art.path()?;
    let decoded = image::ImageReader::open(path)
        .ok()?
        .with_guessed_format()
        .ok()?
        .decode()
        .ok()?;

    let scaled = decoded
        .resize_exact(columns.max(1), (rows * 2).max(2), FilterType::Triangle)
        .to_rgb8();
    let grid = scaled
        .rows()
        .map(|row| row.map(|pixel| (pixel.0[0], pixel.0[1], pixel.0[2])).collect())
        .collect();
    Some(grid)
}
