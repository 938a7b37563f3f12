use crate::cover;
use crate::model::CoverArt;
use crate::player::PlayerCore;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use std::time::Duration;

const APP_TITLE: &str = "chime v0.1.0  ";
const THUMB_COLUMNS: u32 = 26;
const THUMB_ROWS: u32 = 12;
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

#[derive(Clone, Copy)]
struct Palette {
    bg: Color,
    panel_bg: Color,
    border: Color,
    text: Color,
    muted: Color,
    accent: Color,
    alert: Color,
}

fn palette() -> Palette {
    Palette {
        bg: Color::Rgb(10, 15, 24),
        panel_bg: Color::Rgb(19, 29, 43),
        border: Color::Rgb(69, 121, 176),
        text: Color::Rgb(214, 228, 248),
        muted: Color::Rgb(149, 173, 204),
        accent: Color::Rgb(100, 203, 184),
        alert: Color::Rgb(249, 174, 88),
    }
}

/// Cached terminal rendering of the resolved cover. Decoding happens only
/// when the resolved art actually changes, not on every frame.
pub struct CoverThumb {
    art: CoverArt,
    rows: Option<Vec<Vec<(u8, u8, u8)>>>,
}

impl CoverThumb {
    pub fn empty() -> Self {
        Self {
            art: CoverArt::Missing,
            rows: None,
        }
    }

    pub fn sync(&mut self, art: &CoverArt) {
        if &self.art == art {
            return;
        }
        self.art = art.clone();
        self.rows = cover::thumbnail(art, THUMB_COLUMNS, THUMB_ROWS);
    }
}

pub fn draw(frame: &mut Frame, core: &PlayerCore, thumb: &CoverThumb, index_entry: &str) {
    let colors = palette();
    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg)),
        frame.area(),
    );

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, core, index_entry, &colors, vertical[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(THUMB_COLUMNS as u16 + 2), Constraint::Min(20)])
        .split(vertical[1]);
    draw_cover(frame, core, thumb, &colors, body[0]);
    draw_song_info(frame, core, &colors, body[1]);

    let timeline = Paragraph::new(Span::styled(
        timeline_line(core, 26, 14),
        Style::default().fg(colors.text),
    ))
    .block(panel_block("Timeline", &colors));
    frame.render_widget(timeline, vertical[2]);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(
            "Keys: Space play/pause, n next, b previous, m mode, \u{2190}/\u{2192} seek, +/- volume, digits+Enter jump, r reload, q quit",
            Style::default().fg(colors.muted),
        ),
        Span::styled("  |  ", Style::default().fg(colors.muted)),
        Span::styled(core.status.as_str(), Style::default().fg(colors.text)),
    ]))
    .block(panel_block("Message", &colors));
    frame.render_widget(footer, vertical[3]);
}

fn draw_header(
    frame: &mut Frame,
    core: &PlayerCore,
    index_entry: &str,
    colors: &Palette,
    area: Rect,
) {
    let readout = if core.is_empty() {
        String::from("-/0")
    } else {
        format!("{}/{}", core.index + 1, core.len())
    };

    let mut spans = vec![
        Span::styled(
            APP_TITLE,
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("Song {readout}"), Style::default().fg(colors.text)),
        Span::styled("   Mode ", Style::default().fg(colors.muted)),
        Span::styled(core.mode.label(), Style::default().fg(colors.alert)),
    ];
    if !index_entry.is_empty() {
        spans.push(Span::styled(
            format!("   Jump to: {index_entry}_"),
            Style::default().fg(colors.accent),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(panel_block("Player", colors));
    frame.render_widget(header, area);
}

fn draw_cover(frame: &mut Frame, core: &PlayerCore, thumb: &CoverThumb, colors: &Palette, area: Rect) {
    let playing = !core.audio().is_paused() && core.audio().current_track().is_some();
    let spinner = if playing {
        let frame_index = (core.elapsed().as_millis() / 250) as usize % SPINNER_FRAMES.len();
        SPINNER_FRAMES[frame_index]
    } else {
        "⏸"
    };
    let tag = if core.cover.is_fallback() {
        " (default art)"
    } else {
        ""
    };

    let mut lines = vec![Line::from(Span::styled(
        format!("{spinner}{tag}"),
        Style::default().fg(colors.accent),
    ))];

    match &thumb.rows {
        Some(rows) => {
            // Two pixel rows per text row via the upper-half block.
            for pair in rows.chunks(2) {
                let top = &pair[0];
                let bottom = pair.get(1);
                let spans: Vec<Span> = top
                    .iter()
                    .enumerate()
                    .map(|(x, &(r, g, b))| {
                        let mut style = Style::default().fg(Color::Rgb(r, g, b));
                        if let Some(&(br, bg_, bb)) = bottom.and_then(|row| row.get(x)) {
                            style = style.bg(Color::Rgb(br, bg_, bb));
                        }
                        Span::styled("▀", style)
                    })
                    .collect();
                lines.push(Line::from(spans));
            }
        }
        None => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "no cover",
                Style::default().fg(colors.muted),
            )));
        }
    }

    let cover_panel = Paragraph::new(lines).block(panel_block("Cover", colors));
    frame.render_widget(cover_panel, area);
}

fn draw_song_info(frame: &mut Frame, core: &PlayerCore, colors: &Palette, area: Rect) {
    let info_text = match core.current() {
        Some(entry) => vec![
            Line::from(vec![
                Span::styled(
                    "Title",
                    Style::default()
                        .fg(colors.accent)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("   {}", entry.title), Style::default().fg(colors.text)),
            ]),
            Line::from(Span::styled(
                format!("Singer  {}", entry.singer),
                Style::default().fg(colors.muted),
            )),
            Line::from(Span::styled(
                format!("File    {}", entry.file),
                Style::default().fg(colors.muted),
            )),
        ],
        None => vec![
            Line::from(Span::styled(
                "Playlist is empty",
                Style::default().fg(colors.alert),
            )),
            Line::from(Span::styled(
                "Check the songs folder and songs.json",
                Style::default().fg(colors.muted),
            )),
        ],
    };

    let info = Paragraph::new(info_text)
        .block(panel_block("Song Info", colors))
        .wrap(Wrap { trim: true });
    frame.render_widget(info, area);
}

fn panel_block<'a>(title: &'a str, colors: &Palette) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().bg(colors.panel_bg).fg(colors.text))
        .border_style(Style::default().fg(colors.border))
}

fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

fn progress_bar(ratio: Option<f64>, width: usize) -> String {
    let clamped = ratio.unwrap_or(0.0).clamp(0.0, 1.0);
    let filled = (clamped * width as f64).round() as usize;
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    bar.push_str(&"#".repeat(filled));
    bar.push_str(&"-".repeat(width.saturating_sub(filled)));
    bar.push(']');
    bar
}

fn timeline_line(core: &PlayerCore, timeline_bar_width: usize, volume_bar_width: usize) -> String {
    let elapsed = core.elapsed();
    let total = core.audio().duration();
    let ratio = total.and_then(|duration| {
        let total_secs = duration.as_secs_f64();
        (total_secs > 0.0).then_some((elapsed.as_secs_f64() / total_secs).clamp(0.0, 1.0))
    });

    let volume = core.audio().volume();
    let volume_percent = (volume * 100.0).round() as u16;

    format!(
        "{} / {} {}  |  Vol {} {:>3}%",
        format_duration(elapsed),
        total
            .map(format_duration)
            .unwrap_or_else(|| String::from("--:--")),
        progress_bar(ratio, timeline_bar_width),
        progress_bar(Some(f64::from(volume.clamp(0.0, 1.0))), volume_bar_width),
        volume_percent
    )
}
