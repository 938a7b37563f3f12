#![no_main]

use chime::audio::NullAudioEngine;
use chime::manifest;
use chime::player::PlayerCore;
use libfuzzer_sys::fuzz_target;
use std::path::{Path, PathBuf};

fuzz_target!(|data: &[u8]| {
    let len = (data.len() % 16).max(1);
    let playlist = (0..len)
        .map(|idx| manifest::entry_from_filename(&format!("artist{idx}-track{idx}.mp3"), Path::new("songs")))
        .collect();
    let mut core = PlayerCore::new(
        playlist,
        PathBuf::from("images"),
        Box::new(NullAudioEngine::new()),
        Box::new(|_: &Path| false),
    );

    for byte in data {
        match byte % 8 {
            0 => core.play_next(),
            1 => core.play_prev(),
            2 => core.switch_mode(),
            3 => core.on_ended(),
            4 => core.toggle_play(),
            5 => core.seek_percent(f64::from(*byte)),
            6 => {
                let _ = core.jump_to_index(usize::from(*byte));
            }
            _ => {
                let _ = core.load_song(usize::from(*byte) % core.len().max(1));
            }
        }
        assert!(core.index < core.len());
    }
});
