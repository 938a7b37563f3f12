use crate::audio::AudioEngine;
use crate::cover::{self, CoverProbe};
use crate::model::{CoverArt, PlaybackMode, SongEntry};
use anyhow::Result;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::path::PathBuf;
use std::time::Duration;

/// The playback controller. Owns the playlist, the current index, the repeat
/// mode, and the one audio channel; every transition goes through here.
pub struct PlayerCore {
    playlist: Vec<SongEntry>,
    pub index: usize,
    pub mode: PlaybackMode,
    pub cover: CoverArt,
    pub status: String,
    pub dirty: bool,
    images_dir: PathBuf,
    audio: Box<dyn AudioEngine>,
    probe: Box<dyn CoverProbe>,
    rng: SmallRng,
}

impl PlayerCore {
    pub fn new(
        playlist: Vec<SongEntry>,
        images_dir: PathBuf,
        audio: Box<dyn AudioEngine>,
        probe: Box<dyn CoverProbe>,
    ) -> Self {
        let mut core = Self {
            playlist,
            index: 0,
            mode: PlaybackMode::Loop,
            cover: CoverArt::Missing,
            status: String::from("Ready"),
            dirty: true,
            images_dir,
            audio,
            probe,
            rng: SmallRng::from_os_rng(),
        };
        if !core.playlist.is_empty() {
            // First entry is prepared paused; playback waits for the user.
            let _ = core.load_song(0);
        }
        core
    }

    pub fn playlist(&self) -> &[SongEntry] {
        &self.playlist
    }

    pub fn len(&self) -> usize {
        self.playlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlist.is_empty()
    }

    pub fn current(&self) -> Option<&SongEntry> {
        self.playlist.get(self.index)
    }

    pub fn audio(&self) -> &dyn AudioEngine {
        self.audio.as_ref()
    }

    /// Swaps in a freshly loaded playlist and starts over from entry 0.
    pub fn replace_playlist(&mut self, playlist: Vec<SongEntry>) {
        self.playlist = playlist;
        self.index = 0;
        if self.playlist.is_empty() {
            self.audio.stop();
            self.cover = CoverArt::Missing;
            self.set_status("Playlist is empty");
        } else {
            let _ = self.load_song(0);
            self.set_status(&format!("Loaded {} songs", self.playlist.len()));
        }
    }

    /// Makes entry `i` current: stops whatever is playing, prepares the new
    /// source paused at 0, and re-resolves the cover. Out-of-range `i` is an
    /// error and changes nothing.
    pub fn load_song(&mut self, i: usize) -> Result<()> {
        let Some(entry) = self.playlist.get(i) else {
            anyhow::bail!("song index {i} out of range");
        };

        self.index = i;
        let load_result = self.audio.load(&entry.audio_path);
        let resolved = cover::resolve(entry, &self.images_dir, self.probe.as_ref());
        self.cover = resolved;
        self.dirty = true;

        if let Err(err) = load_result {
            // Keep going with the track selected; retrying is a user action.
            self.set_status(&format!("playback error: {err:#}"));
        }
        Ok(())
    }

    pub fn play_prev(&mut self) {
        self.step(|index, len| (index + len - 1) % len);
    }

    pub fn play_next(&mut self) {
        self.step(|index, len| (index + 1) % len);
    }

    fn step(&mut self, advance: fn(usize, usize) -> usize) {
        if self.playlist.is_empty() {
            return;
        }

        let next = match self.mode {
            PlaybackMode::Shuffle => self.rand_other_index(),
            PlaybackMode::Single => self.index,
            PlaybackMode::Loop => advance(self.index, self.playlist.len()),
        };
        let _ = self.load_song(next);
        self.audio.resume();
    }

    /// End-of-track transition: single mode replays the current entry from
    /// position 0, the other modes advance.
    pub fn on_ended(&mut self) {
        if self.playlist.is_empty() {
            return;
        }

        if self.mode == PlaybackMode::Single {
            let current = self.index;
            let _ = self.load_song(current);
            self.audio.resume();
        } else {
            self.play_next();
        }
    }

    pub fn switch_mode(&mut self) {
        self.mode = self.mode.next();
        self.set_status(&format!("Playback mode: {}", self.mode.label()));
    }

    /// Seeks to `pct` percent of the track. No known duration, no movement.
    pub fn seek_percent(&mut self, pct: f64) {
        let Some(duration) = self.audio.duration() else {
            return;
        };

        let target = duration.mul_f64((pct / 100.0).clamp(0.0, 1.0));
        if let Err(err) = self.audio.seek_to(target) {
            self.set_status(&format!("seek error: {err:#}"));
        } else {
            self.dirty = true;
        }
    }

    /// Manual 1-based jump. Out-of-range input is rejected with a range
    /// message and the player state stays as it was.
    pub fn jump_to_index(&mut self, one_based: usize) -> Result<()> {
        let len = self.playlist.len();
        if len == 0 {
            anyhow::bail!("playlist is empty");
        }
        if one_based == 0 || one_based > len {
            anyhow::bail!("enter a number between 1 and {len}");
        }

        self.load_song(one_based - 1)?;
        self.audio.resume();
        Ok(())
    }

    pub fn toggle_play(&mut self) {
        if self.playlist.is_empty() {
            return;
        }

        if self.audio.is_paused() {
            self.audio.resume();
            self.set_status("Playing");
        } else {
            self.audio.pause();
            self.set_status("Paused");
        }
    }

    pub fn adjust_volume(&mut self, delta: f32) {
        let next = (self.audio.volume() + delta).clamp(0.0, 1.0);
        self.audio.set_volume(next);
        self.set_status(&format!("Volume: {}%", (next * 100.0).round() as u16));
    }

    /// Uniform draw over the other indices. Drawing from `len - 1` slots and
    /// shifting past the current index never needs a resample, so a rigged
    /// RNG cannot loop it; a one-song playlist keeps the only index.
    fn rand_other_index(&mut self) -> usize {
        let len = self.playlist.len();
        if len <= 1 {
            return self.index;
        }

        let draw = self.rng.random_range(0..len - 1);
        if draw >= self.index { draw + 1 } else { draw }
    }

    pub fn elapsed(&self) -> Duration {
        self.audio.position().unwrap_or(Duration::ZERO)
    }

    fn set_status(&mut self, message: &str) {
        self.status = message.to_string();
        self.dirty = true;
    }
}
