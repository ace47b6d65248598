//! Keyboard widget - one cell per key, painted with the key's mixed color

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use keyblend::engine::{is_black, key_number, KeyState};

use crate::app::App;

/// Three octaves
const VISIBLE_KEYS: u8 = 36;
/// Width of a white key cell
const CELL: usize = 4;
const METER: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

fn rgb(state: &KeyState) -> Color {
    let c = state.mixed_color();
    Color::Rgb(c.r, c.g, c.b)
}

/// Text color that stays readable on the key's background
fn ink(state: &KeyState) -> Color {
    let c = state.mixed_color();
    let luma = 0.299 * c.r as f32 + 0.587 * c.g as f32 + 0.114 * c.b as f32;
    if luma > 128.0 {
        Color::Black
    } else {
        Color::White
    }
}

fn meter(strength: f32) -> char {
    let level = (strength.clamp(0.0, 1.0) * (METER.len() - 1) as f32).round() as usize;
    METER[level]
}

/// Render the visible part of the keyboard
pub fn render_keyboard(frame: &mut Frame, area: Rect, app: &App) {
    let start = app.view_start();
    let end = start.saturating_add(VISIBLE_KEYS);
    let first_white = key_number(start);

    let block = Block::default()
        .title(format!(" Playing from C{} ", app.octave as i32 - 1))
        .borders(Borders::ALL);

    let width = (VISIBLE_KEYS as usize / 12) * 7 * CELL;
    let mut black_row = vec![Span::raw(" ".repeat(width))];
    let mut black_cells: Vec<(usize, Span)> = Vec::new();
    let mut white_row = Vec::new();
    let mut meter_row = Vec::new();

    for key in start..end {
        let Some(state) = app.engine.key(key) else {
            continue;
        };
        let style = Style::default().bg(rgb(state)).fg(ink(state));

        if is_black(key) {
            // Sits across the boundary of the white keys on either side
            let column = (key_number(key + 1) - first_white) * CELL - CELL / 4;
            black_cells.push((column, Span::styled(format!("{:^2}", meter(state.press_strength())), style)));
        } else {
            let label = if key % 12 == 0 {
                format!("C{}", key as i32 / 12 - 1)
            } else {
                String::new()
            };
            white_row.push(Span::styled(format!("{:<width$}", label, width = CELL - 1), style));
            white_row.push(Span::raw("│"));
            meter_row.push(Span::raw(format!(
                "{:<width$}",
                meter(state.press_strength()),
                width = CELL
            )));
        }
    }

    if !black_cells.is_empty() {
        black_row = layout_black_row(black_cells, width);
    }

    let mut lines = Vec::new();
    for _ in 0..2 {
        lines.push(Line::from(black_row.clone()));
    }
    for _ in 0..2 {
        lines.push(Line::from(white_row.clone()));
    }
    lines.push(Line::from(meter_row));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Place black key cells at their columns with gaps in between
fn layout_black_row(cells: Vec<(usize, Span<'static>)>, width: usize) -> Vec<Span<'static>> {
    let mut row = Vec::new();
    let mut cursor = 0;
    for (column, span) in cells {
        if column > cursor {
            row.push(Span::raw(" ".repeat(column - cursor)));
        }
        cursor = column.max(cursor) + span.width();
        row.push(span);
    }
    if width > cursor {
        row.push(Span::raw(" ".repeat(width - cursor)));
    }
    row
}
