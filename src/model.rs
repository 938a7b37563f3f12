use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    #[default]
    Loop,
    Shuffle,
    Single,
}

impl PlaybackMode {
    pub fn next(self) -> Self {
        match self {
            Self::Loop => Self::Shuffle,
            Self::Shuffle => Self::Single,
            Self::Single => Self::Loop,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Loop => "loop",
            Self::Shuffle => "shuffle",
            Self::Single => "single",
        }
    }
}

/// One playable unit from the manifest. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongEntry {
    pub file: String,
    pub base: String,
    pub title: String,
    pub singer: String,
    pub audio_path: PathBuf,
}

/// Outcome of cover-art resolution for one song.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CoverArt {
    Matched(PathBuf),
    Fallback(PathBuf),
    #[default]
    Missing,
}

impl CoverArt {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Matched(path) | Self::Fallback(path) => Some(path),
            Self::Missing => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_cycles_in_fixed_order() {
        assert_eq!(PlaybackMode::Loop.next(), PlaybackMode::Shuffle);
        assert_eq!(PlaybackMode::Shuffle.next(), PlaybackMode::Single);
        assert_eq!(PlaybackMode::Single.next(), PlaybackMode::Loop);
    }

    #[test]
    fn cover_art_exposes_path_only_when_resolved() {
        let hit = CoverArt::Matched(PathBuf::from("a.png"));
        assert_eq!(hit.path(), Some(&PathBuf::from("a.png")));
        assert!(!hit.is_fallback());
        assert!(CoverArt::Fallback(PathBuf::from("default.jpg")).is_fallback());
        assert_eq!(CoverArt::Missing.path(), None);
    }
}
