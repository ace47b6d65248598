//! TUI module for keyblend
//!
//! Draws the visible octaves with each key's blended color, plus a status bar.

mod keyboard;
mod status;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use super::app::App;

use keyboard::render_keyboard;
use status::render_status;

/// Render the whole UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status bar
            Constraint::Min(8),    // Keyboard
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_status(frame, chunks[0], app);
    render_keyboard(frame, chunks[1], app);

    let help = Paragraph::new(" [A-'] Play  [W E T Y U O P] Sharps  [Z/X] Octave  [Q] Quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[2]);
}
