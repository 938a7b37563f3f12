use crate::audio::{AudioEngine, NullAudioEngine, RodioAudioEngine};
use crate::config::{self, Dirs};
use crate::cover::DecodeProbe;
use crate::manifest;
use crate::player::PlayerCore;
use crate::ui::{self, CoverThumb};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const SEEK_STEP_PERCENT: f64 = 5.0;
const VOLUME_STEP: f32 = 0.05;

#[derive(Debug, Default)]
pub struct AppOptions {
    pub root: Option<PathBuf>,
    pub no_audio: bool,
}

pub fn run(options: AppOptions) -> Result<()> {
    let root = config::resolve_root(options.root.as_deref())?;
    let dirs = Dirs::from_root(root);

    let audio: Box<dyn AudioEngine> = if options.no_audio {
        Box::new(NullAudioEngine::new())
    } else {
        match RodioAudioEngine::new() {
            Ok(engine) => Box::new(engine),
            Err(_) => Box::new(NullAudioEngine::new()),
        }
    };

    let (playlist, manifest_err) = match manifest::read_manifest(&dirs.songs) {
        Ok(list) => (list, None),
        Err(err) => (Vec::new(), Some(err)),
    };
    let mut core = PlayerCore::new(playlist, dirs.images.clone(), audio, Box::new(DecodeProbe));
    core.status = match manifest_err {
        Some(err) => format!("Manifest unavailable: {err:#}"),
        None if core.is_empty() => String::from("Playlist is empty; check songs/songs.json"),
        None => format!("Loaded {} songs", core.len()),
    };

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut thumb = CoverThumb::empty();
    let mut index_entry = String::new();
    let mut last_tick = Instant::now();

    let result: Result<()> = loop {
        maybe_auto_advance(&mut core);

        if core.dirty || last_tick.elapsed() > Duration::from_millis(250) {
            thumb.sync(&core.cover);
            terminal.draw(|frame| ui::draw(frame, &core, &thumb, &index_entry))?;
            core.dirty = false;
            last_tick = Instant::now();
        }

        if !event::poll(Duration::from_millis(33))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break Ok(()),
            KeyCode::Char('q') => break Ok(()),
            KeyCode::Char(' ') => core.toggle_play(),
            KeyCode::Char('n') => core.play_next(),
            KeyCode::Char('b') => core.play_prev(),
            KeyCode::Char('m') => core.switch_mode(),
            KeyCode::Left => seek_by(&mut core, -SEEK_STEP_PERCENT),
            KeyCode::Right => seek_by(&mut core, SEEK_STEP_PERCENT),
            KeyCode::Char('+') | KeyCode::Char('=') => core.adjust_volume(VOLUME_STEP),
            KeyCode::Char('-') => core.adjust_volume(-VOLUME_STEP),
            KeyCode::Char('r') => core.replace_playlist(manifest::load(&dirs.songs)),
            KeyCode::Char(digit @ '0'..='9') => {
                index_entry.push(digit);
                core.dirty = true;
            }
            KeyCode::Backspace => {
                index_entry.pop();
                core.dirty = true;
            }
            KeyCode::Esc => {
                index_entry.clear();
                core.dirty = true;
            }
            KeyCode::Enter => {
                if let Ok(requested) = index_entry.parse::<usize>()
                    && let Err(err) = core.jump_to_index(requested)
                {
                    core.status = format!("{err:#}");
                }
                index_entry.clear();
                core.dirty = true;
            }
            _ => {}
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn maybe_auto_advance(core: &mut PlayerCore) {
    if core.audio().is_finished() {
        core.on_ended();
    }
}

fn seek_by(core: &mut PlayerCore, delta_pct: f64) {
    let Some(duration) = core.audio().duration() else {
        return;
    };
    let total = duration.as_secs_f64();
    if total <= 0.0 {
        return;
    }

    let pct = core.elapsed().as_secs_f64() / total * 100.0;
    core.seek_percent((pct + delta_pct).clamp(0.0, 100.0));
}
