pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, ColoringPad};
use crate::coloring::MASK_SIZE;
use crate::dice::face_rows;
use crate::layout::{ItemPlacement, CANVAS_SIZE};
use crate::round::{Answer, ItemKind, Round};
use crate::rules::GameKind;
use crate::session::{Feedback, SessionView};

use screen::Screen;

const HORIZONTAL_MARGIN: u16 = 2;
const CONFETTI_PALETTE: [Color; 5] = [
    Color::LightRed,
    Color::Yellow,
    Color::LightGreen,
    Color::LightCyan,
    Color::LightMagenta,
];

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        screen::current_screen(&self.state).render(self, area, buf);
        render_celebration(self, area, buf);
    }
}

pub fn item_sprite(item: ItemKind) -> &'static str {
    match item {
        ItemKind::FireTruck => "🚒",
        ItemKind::PoliceCar => "🚓",
        ItemKind::Ambulance => "🚑",
        ItemKind::Boat => "⛵",
        ItemKind::Plane => "🛫",
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn pointer_style() -> Style {
    bold().fg(Color::Black).bg(Color::LightGreen)
}

fn cursor_style() -> Style {
    bold().add_modifier(Modifier::REVERSED)
}

fn centered_line(text: impl Into<Line<'static>>, area: Rect, buf: &mut Buffer) {
    Paragraph::new(text.into())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

/// Top-left cell for a sprite centred on `placement`.
fn sprite_cell(area: Rect, placement: &ItemPlacement, sprite_width: u16) -> Option<(u16, u16)> {
    if area.width < sprite_width || area.height == 0 {
        return None;
    }
    let span_x = f64::from(area.width - sprite_width);
    let span_y = f64::from(area.height - 1);
    let x = (placement.left / CANVAS_SIZE * span_x).round() as u16;
    let y = (placement.top / CANVAS_SIZE * span_y).round() as u16;
    Some((area.x + x.min(area.width - sprite_width), area.y + y.min(area.height - 1)))
}

fn render_sprites(
    area: Rect,
    buf: &mut Buffer,
    item: ItemKind,
    placements: &[ItemPlacement],
    highlight: Option<usize>,
) {
    let sprite = item_sprite(item);
    let width = sprite.width() as u16;
    for (index, placement) in placements.iter().enumerate() {
        let Some((x, y)) = sprite_cell(area, placement, width) else {
            continue;
        };
        let style = if highlight == Some(index) {
            Style::default().bg(Color::Yellow)
        } else {
            Style::default()
        };
        buf.set_string(x, y, sprite, style);
    }
}

pub(crate) fn render_home(app: &App, area: Rect, buf: &mut Buffer) {
    let texts = app.texts();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(GameKind::ALL.len() as u16 + 1),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    centered_line(
        Span::styled(texts.home_title.clone(), bold().fg(Color::LightMagenta)),
        chunks[1],
        buf,
    );
    centered_line(Span::styled(texts.available_games.clone(), dim()), chunks[2], buf);

    let lines: Vec<Line> = GameKind::ALL
        .iter()
        .enumerate()
        .map(|(index, kind)| {
            let label = format!("{}. {}", index + 1, kind.title(texts));
            if index == app.selected_game {
                Line::from(Span::styled(format!("▶ {label}"), cursor_style()))
            } else {
                Line::from(Span::raw(format!("  {label}")))
            }
        })
        .collect();
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    centered_line(
        Span::styled(format!("[{}]", app.language.label()), bold()),
        chunks[4],
        buf,
    );
    centered_line(
        Span::styled("↑/↓ · Enter · l: FR/EN · q", dim()),
        chunks[6],
        buf,
    );
}

pub(crate) fn render_result(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(view) = app.view.as_ref() else {
        return;
    };
    let texts = app.texts();
    let message = if view.is_perfect() {
        &texts.common.perfect_result_message
    } else {
        &texts.common.continue_result_message
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    centered_line(
        Span::styled(texts.common.result_title.clone(), bold().fg(Color::LightMagenta)),
        chunks[1],
        buf,
    );
    centered_line(Span::raw(message.clone()), chunks[2], buf);
    centered_line(
        Span::styled(
            texts.score_label(view.score, view.total_rounds),
            bold().fg(Color::LightGreen),
        ),
        chunks[3],
        buf,
    );
    centered_line(
        Span::styled(
            format!(
                "Enter: {} · Esc: {}",
                texts.common.play_again_label, texts.common.back_home_label
            ),
            dim(),
        ),
        chunks[5],
        buf,
    );
}

pub(crate) fn render_game(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(view) = app.view.as_ref() else {
        return;
    };
    let texts = app.texts();
    let dice_lines = if view.dice.is_some() { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(dice_lines),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let header = format!(
        "{} · {} · {}",
        view.game.title(texts),
        texts.round_label((view.round_index + 1).min(view.total_rounds), view.total_rounds),
        texts.score_label(view.score, view.total_rounds),
    );
    centered_line(Span::styled(header, bold()), chunks[0], buf);

    let instruction = match &view.round {
        Round::Counting(_) => texts.counting_answer_label(max_count(view)),
        Round::ReverseCounting(round) => format!(
            "{} {}",
            texts.reverse_counting.answer_label, round.target_count
        ),
        Round::Letter(_) if app.coloring.is_some() => {
            texts.letter_listening.coloring_instruction_label.clone()
        }
        Round::Letter(_) => texts.letter_listening.instruction_label.clone(),
    };
    centered_line(Span::styled(instruction, dim()), chunks[1], buf);

    if let Some(faces) = &view.dice {
        render_dice(faces, chunks[2], buf);
    }

    match (&view.round, app.coloring.as_ref()) {
        (Round::Letter(_), Some(pad)) => render_coloring(pad, chunks[3], buf),
        (Round::Counting(round), _) => {
            let block = Block::default().borders(Borders::ALL);
            let inner = block.inner(chunks[3]);
            block.render(chunks[3], buf);
            if let Some(group) = view.placements.first() {
                render_sprites(inner, buf, round.item, group, view.hint_highlight);
            }
        }
        (Round::ReverseCounting(round), _) => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Ratio(1, 3),
                    Constraint::Ratio(1, 3),
                    Constraint::Ratio(1, 3),
                ])
                .split(chunks[3]);
            for (slot, choice) in round.choices.iter().enumerate() {
                let answer = Answer::Choice(choice.id);
                let border = if view.pointer == Some(answer) {
                    Style::default().fg(Color::LightGreen)
                } else if app.answer_cursor == slot {
                    bold()
                } else {
                    dim()
                };
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(format!(" {} ", slot + 1));
                let inner = block.inner(columns[slot]);
                block.render(columns[slot], buf);
                if let Some(group) = view.placements.get(slot) {
                    render_sprites(inner, buf, choice.item, group, None);
                }
            }
        }
        (Round::Letter(round), None) => {
            let letters: Vec<Span> = round
                .options
                .iter()
                .enumerate()
                .flat_map(|(slot, letter)| {
                    [
                        Span::styled(
                            format!(" {letter} "),
                            answer_style(view, app, slot, Answer::Letter(*letter)),
                        ),
                        Span::raw("   "),
                    ]
                })
                .collect();
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", texts.letter_listening.answer_label));
            let inner = block.inner(chunks[3]);
            block.render(chunks[3], buf);
            let middle = Rect {
                y: inner.y + inner.height / 2,
                height: 1.min(inner.height),
                ..inner
            };
            centered_line(Line::from(letters), middle, buf);
        }
    }

    if !matches!(view.round, Round::Letter(_)) || app.coloring.is_none() {
        render_answers(app, view, chunks[4], buf);
    }

    let feedback = match view.feedback {
        Feedback::Correct => Span::styled(
            format!("★ {} ★", texts.common.bravo),
            bold().fg(Color::LightGreen),
        ),
        Feedback::Wrong => Span::styled("✗", bold().fg(Color::LightRed)),
        Feedback::Idle => Span::raw(""),
    };
    centered_line(feedback, chunks[5], buf);

    if let Some(caption) = &app.caption {
        centered_line(
            Span::styled(
                format!("🔊 {caption}"),
                Style::default().add_modifier(Modifier::ITALIC),
            ),
            chunks[6],
            buf,
        );
    }

    let help = if app.coloring.is_some() {
        "←↑→↓ · Space: ✎ · Esc".to_string()
    } else {
        match view.game {
            GameKind::Counting => "1-9, 0=10 · ←/→ Enter · Space 🔊 · Ctrl+R · Esc".to_string(),
            GameKind::ReverseCounting => format!(
                "1-3 · ←/→ Enter · Space: {} · Ctrl+R · Esc",
                texts.reverse_counting.replay_label
            ),
            GameKind::LetterListening => format!(
                "A-Z · ←/→ Enter · Space: {} · Ctrl+R · Esc",
                texts.letter_listening.replay_label
            ),
        }
    };
    centered_line(Span::styled(help, dim()), chunks[7], buf);
}

fn max_count(view: &SessionView) -> u32 {
    view.options
        .iter()
        .filter_map(|answer| match answer {
            Answer::Count(count) => Some(*count),
            _ => None,
        })
        .max()
        .unwrap_or(1)
}

fn answer_style(view: &SessionView, app: &App, slot: usize, answer: Answer) -> Style {
    if view.pointer == Some(answer) {
        pointer_style()
    } else if app.answer_cursor == slot && !view.is_locked {
        cursor_style()
    } else {
        bold()
    }
}

fn render_answers(app: &App, view: &SessionView, area: Rect, buf: &mut Buffer) {
    let labels: Vec<Span> = view
        .options
        .iter()
        .enumerate()
        .flat_map(|(slot, answer)| {
            let label = match answer {
                Answer::Count(count) => count.to_string(),
                Answer::Choice(_) => (slot + 1).to_string(),
                Answer::Letter(letter) => letter.to_string(),
            };
            [
                Span::styled(format!(" {label} "), answer_style(view, app, slot, *answer)),
                Span::raw(" "),
            ]
        })
        .collect();
    let block = Block::default().borders(Borders::TOP).border_style(dim());
    let inner = block.inner(area);
    block.render(area, buf);
    centered_line(Line::from(labels), inner, buf);
}

fn render_dice(faces: &[u8], area: Rect, buf: &mut Buffer) {
    let rows: Vec<[String; 3]> = faces.iter().map(|face| face_rows(*face)).collect();
    let lines: Vec<Line> = (0..3)
        .map(|row| {
            let text = rows
                .iter()
                .map(|face| face[row].as_str())
                .collect::<Vec<_>>()
                .join("   ");
            Line::from(Span::styled(text, bold().fg(Color::LightYellow)))
        })
        .collect();
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_coloring(pad: &ColoringPad, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} {:.0}% ", pad.board.letter(), pad.board.progress() * 100.0));
    let inner = block.inner(area);
    block.render(area, buf);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let to_board = |cell: u16, extent: u16| {
        ((f64::from(cell) + 0.5) / f64::from(extent) * MASK_SIZE as f64) as usize
    };
    for row in 0..inner.height {
        for column in 0..inner.width {
            let x = to_board(column, inner.width);
            let y = to_board(row, inner.height);
            let (symbol, style) = if pad.board.is_covered(x, y) {
                ("█", Style::default().fg(Color::LightMagenta))
            } else if pad.board.in_glyph(x, y) {
                ("░", dim())
            } else {
                continue;
            };
            buf.set_string(inner.x + column, inner.y + row, symbol, style);
        }
    }

    let cursor_x = (pad.cursor.x / MASK_SIZE as f64 * f64::from(inner.width - 1)).round() as u16;
    let cursor_y = (pad.cursor.y / MASK_SIZE as f64 * f64::from(inner.height - 1)).round() as u16;
    let marker = if pad.pen_down { "●" } else { "+" };
    buf.set_string(
        inner.x + cursor_x.min(inner.width - 1),
        inner.y + cursor_y.min(inner.height - 1),
        marker,
        bold().fg(Color::LightYellow),
    );
}

fn render_celebration(app: &App, area: Rect, buf: &mut Buffer) {
    if !app.celebration.is_active {
        return;
    }
    for particle in &app.celebration.particles {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let (x, y) = (particle.x as u16, particle.y as u16);
        if x >= area.width || y >= area.height {
            continue;
        }
        let color = CONFETTI_PALETTE[particle.color_index % CONFETTI_PALETTE.len()];
        buf.set_string(
            area.x + x,
            area.y + y,
            particle.symbol.to_string(),
            bold().fg(color),
        );
    }
}
