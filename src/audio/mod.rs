use anyhow::{Context, Result};
use rodio::Source;
use rodio::cpal::traits::{DeviceTrait, HostTrait};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
#[cfg(unix)]
use std::ffi::CString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const MAX_VOLUME: f32 = 2.0;

/// The single audio channel. The player core owns exactly one of these and
/// nothing else touches it.
pub trait AudioEngine {
    /// Prepares a track paused at position 0; `resume` starts it.
    fn load(&mut self, path: &Path) -> Result<()>;
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
    fn is_paused(&self) -> bool;
    fn current_track(&self) -> Option<&Path>;
    fn position(&self) -> Option<Duration>;
    fn duration(&self) -> Option<Duration>;
    fn seek_to(&mut self, position: Duration) -> Result<()>;
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    fn is_finished(&self) -> bool;
}

pub struct RodioAudioEngine {
    stream: OutputStream,
    sink: Sink,
    current: Option<PathBuf>,
    track_duration: Option<Duration>,
    volume: f32,
}

impl RodioAudioEngine {
    pub fn new() -> Result<Self> {
        let (stream, sink) = Self::open_output_stream()?;
        Ok(Self {
            stream,
            sink,
            current: None,
            track_duration: None,
            volume: 0.5,
        })
    }

    fn open_output_stream() -> Result<(OutputStream, Sink)> {
        let mut stream = with_silenced_stderr(|| {
            match OutputStreamBuilder::from_default_device()
                .context("failed to open default system output stream")
                .and_then(|builder| {
                    builder
                        .with_error_callback(|_| {})
                        .open_stream_or_fallback()
                        .context("failed to start default output stream")
                }) {
                Ok(stream) => Ok(stream),
                Err(default_err) => Self::open_any_output().with_context(|| {
                    format!("unable to start any audio output stream after default failed: {default_err:#}")
                }),
            }
        })?;
        stream.log_on_drop(false);
        let sink = Sink::connect_new(stream.mixer());
        Ok((stream, sink))
    }

    fn open_any_output() -> Result<OutputStream> {
        let host = rodio::cpal::default_host();
        let mut candidates: Vec<_> = host
            .output_devices()
            .context("failed to enumerate output devices")?
            .collect();
        candidates.sort_by_cached_key(|device| {
            let lower = device.name().unwrap_or_default().to_ascii_lowercase();
            let rank = if lower.contains("pulse") {
                0_u8
            } else if lower.contains("pipewire") {
                1_u8
            } else if lower.contains("default") {
                2_u8
            } else {
                3_u8
            };
            (rank, lower)
        });

        for device in candidates {
            let opened = OutputStreamBuilder::from_device(device)
                .context("failed to open fallback output device")
                .and_then(|builder| {
                    builder
                        .with_error_callback(|_| {})
                        .open_stream_or_fallback()
                        .context("failed to start fallback output stream")
                });
            if let Ok(stream) = opened {
                return Ok(stream);
            }
        }
        anyhow::bail!("no usable audio output device")
    }

}

impl AudioEngine for RodioAudioEngine {
    fn load(&mut self, path: &Path) -> Result<()> {
        // A failed open/decode must leave the channel empty and paused, not
        // half-pointed at the previous track.
        self.sink.stop();
        self.sink = Sink::connect_new(self.stream.mixer());
        self.sink.pause();
        self.current = None;
        self.track_duration = None;

        let file =
            File::open(path).with_context(|| format!("failed to open track {}", path.display()))?;
        let source = Decoder::try_from(file)
            .with_context(|| format!("failed to decode {}", path.display()))?;
        self.track_duration = source.total_duration();
        self.sink.append(source);
        self.sink.set_volume(self.volume);
        self.current = Some(path.to_path_buf());
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn resume(&mut self) {
        self.sink.play();
    }

    fn stop(&mut self) {
        self.sink.stop();
        self.current = None;
        self.track_duration = None;
    }

    fn is_paused(&self) -> bool {
        self.sink.is_paused()
    }

    fn current_track(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    fn position(&self) -> Option<Duration> {
        self.current.as_ref()?;
        Some(self.sink.get_pos())
    }

    fn duration(&self) -> Option<Duration> {
        self.track_duration
    }

    fn seek_to(&mut self, position: Duration) -> Result<()> {
        if self.current.is_none() {
            return Err(anyhow::anyhow!("no active track"));
        }
        self.sink
            .try_seek(position)
            .map_err(|err| anyhow::anyhow!("failed to seek current track: {err:?}"))?;
        Ok(())
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, MAX_VOLUME);
        self.sink.set_volume(self.volume);
    }

    fn is_finished(&self) -> bool {
        self.current.is_some() && !self.sink.is_paused() && self.sink.empty()
    }
}

#[cfg(unix)]
fn with_silenced_stderr<T>(operation: impl FnOnce() -> T) -> T {
    let saved = unsafe { libc::dup(libc::STDERR_FILENO) };
    if saved < 0 {
        return operation();
    }

    let devnull = CString::new("/dev/null")
        .ok()
        .map(|path| unsafe { libc::open(path.as_ptr(), libc::O_WRONLY) })
        .unwrap_or(-1);

    if devnull >= 0 {
        unsafe {
            libc::dup2(devnull, libc::STDERR_FILENO);
            libc::close(devnull);
        }
    }

    let result = operation();

    unsafe {
        libc::dup2(saved, libc::STDERR_FILENO);
        libc::close(saved);
    }

    result
}

#[cfg(not(unix))]
fn with_silenced_stderr<T>(operation: impl FnOnce() -> T) -> T {
    operation()
}

/// Device-free engine: a logical wall-clock position over a pretend channel.
/// Used when no output device opens, and by the state-machine tests.
pub struct NullAudioEngine {
    paused: bool,
    current: Option<PathBuf>,
    volume: f32,
    started_at: Option<Instant>,
    position_offset: Duration,
    track_duration: Option<Duration>,
}

impl NullAudioEngine {
    pub fn new() -> Self {
        Self {
            paused: false,
            current: None,
            volume: 0.5,
            started_at: None,
            position_offset: Duration::ZERO,
            track_duration: None,
        }
    }

    fn probe_duration(path: &Path) -> Option<Duration> {
        let file = File::open(path).ok()?;
        let source = Decoder::try_from(file).ok()?;
        source
            .total_duration()
            .filter(|duration| !duration.is_zero())
    }

    fn current_position(&self) -> Duration {
        let mut position = self.position_offset;
        if !self.paused
            && self.current.is_some()
            && let Some(started_at) = self.started_at
        {
            position = position.saturating_add(started_at.elapsed());
        }
        if let Some(duration) = self.track_duration {
            return position.min(duration);
        }
        position
    }
}

impl Default for NullAudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngine for NullAudioEngine {
    fn load(&mut self, path: &Path) -> Result<()> {
        self.paused = true;
        self.current = Some(path.to_path_buf());
        self.started_at = None;
        self.position_offset = Duration::ZERO;
        self.track_duration = Self::probe_duration(path);
        Ok(())
    }

    fn pause(&mut self) {
        self.position_offset = self.current_position();
        self.started_at = None;
        self.paused = true;
    }

    fn resume(&mut self) {
        if self.current.is_some() {
            self.started_at = Some(Instant::now());
        }
        self.paused = false;
    }

    fn stop(&mut self) {
        self.current = None;
        self.paused = false;
        self.started_at = None;
        self.position_offset = Duration::ZERO;
        self.track_duration = None;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn current_track(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    fn position(&self) -> Option<Duration> {
        self.current.as_ref()?;
        Some(self.current_position())
    }

    fn duration(&self) -> Option<Duration> {
        self.track_duration
    }

    fn seek_to(&mut self, position: Duration) -> Result<()> {
        if self.current.is_none() {
            return Err(anyhow::anyhow!("no active track"));
        }

        self.position_offset = self
            .track_duration
            .map_or(position, |duration| position.min(duration));
        self.started_at = if self.paused {
            None
        } else {
            Some(Instant::now())
        };
        Ok(())
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, MAX_VOLUME);
    }

    fn is_finished(&self) -> bool {
        let Some(duration) = self.track_duration else {
            return false;
        };
        self.current.is_some() && !self.paused && self.current_position() >= duration
    }
}

#[cfg(test)]
mod tests {
    use super::{AudioEngine, NullAudioEngine};
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;
    use std::thread;
    use std::time::Duration;

    /// Writes a minimal 16-bit mono 44.1 kHz WAV of silence so the null
    /// engine can read a real duration off disk.
    fn write_silent_wav(path: &Path, millis: u64) -> std::io::Result<()> {
        const SAMPLE_RATE: u64 = 44_100;
        let sample_count = SAMPLE_RATE * millis / 1000;
        let data_len = (sample_count * 2) as u32;

        let mut file = File::create(path)?;
        file.write_all(b"RIFF")?;
        file.write_all(&(36 + data_len).to_le_bytes())?;
        file.write_all(b"WAVEfmt ")?;
        file.write_all(&16u32.to_le_bytes())?;
        file.write_all(&1u16.to_le_bytes())?; // PCM
        file.write_all(&1u16.to_le_bytes())?; // mono
        file.write_all(&(SAMPLE_RATE as u32).to_le_bytes())?;
        file.write_all(&((SAMPLE_RATE * 2) as u32).to_le_bytes())?;
        file.write_all(&2u16.to_le_bytes())?; // block align
        file.write_all(&16u16.to_le_bytes())?;
        file.write_all(b"data")?;
        file.write_all(&data_len.to_le_bytes())?;
        file.write_all(&vec![0u8; data_len as usize])?;
        Ok(())
    }

    fn start_playing(engine: &mut NullAudioEngine, path: &Path) {
        engine.load(path).expect("load should work in null mode");
        engine.resume();
    }

    #[test]
    fn position_advances_while_playing() {
        let mut engine = NullAudioEngine::new();
        start_playing(&mut engine, Path::new("nonexistent-track.mp3"));
        let before = engine.position().expect("position present");
        thread::sleep(Duration::from_millis(20));
        let after = engine.position().expect("position present");
        assert!(after > before);
    }

    #[test]
    fn pause_freezes_and_resume_continues_position() {
        let mut engine = NullAudioEngine::new();
        start_playing(&mut engine, Path::new("nonexistent-track.mp3"));
        thread::sleep(Duration::from_millis(20));

        engine.pause();
        let paused = engine.position().expect("position present");
        thread::sleep(Duration::from_millis(20));
        assert_eq!(engine.position().expect("position present"), paused);

        engine.resume();
        thread::sleep(Duration::from_millis(20));
        assert!(engine.position().expect("position present") > paused);
    }

    #[test]
    fn load_prepares_track_paused_at_zero() {
        let mut engine = NullAudioEngine::new();
        engine
            .load(Path::new("nonexistent-track.mp3"))
            .expect("load should work in null mode");
        assert!(engine.is_paused());
        assert_eq!(engine.position(), Some(Duration::ZERO));
        assert_eq!(
            engine.current_track(),
            Some(Path::new("nonexistent-track.mp3"))
        );
    }

    #[test]
    fn seek_moves_logical_position() {
        let mut engine = NullAudioEngine::new();
        start_playing(&mut engine, Path::new("nonexistent-track.mp3"));

        let target = Duration::from_secs(12);
        engine.seek_to(target).expect("seek should succeed");
        assert!(engine.position().expect("position present") >= target);
    }

    #[test]
    fn unknown_duration_never_finishes() {
        let mut engine = NullAudioEngine::new();
        start_playing(&mut engine, Path::new("nonexistent-track.mp3"));
        assert_eq!(engine.duration(), None);

        thread::sleep(Duration::from_millis(40));
        assert!(!engine.is_finished());
    }

    #[test]
    fn decodable_track_reports_duration_and_finishes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let track = dir.path().join("short.wav");
        write_silent_wav(&track, 80).expect("write wav fixture");

        let mut engine = NullAudioEngine::new();
        engine.load(&track).expect("load should decode the wav");
        let duration = engine.duration().expect("wav duration known");
        assert!(duration >= Duration::from_millis(70));
        assert!(!engine.is_finished(), "paused track must not finish");

        engine.resume();
        thread::sleep(duration + Duration::from_millis(30));
        assert!(engine.is_finished());
    }
}
