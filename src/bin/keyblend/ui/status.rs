//! Status bar widget - asset state, local color, and voice counts

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, AssetStatus};

/// Render the status bar
pub fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title(" keyblend ").borders(Borders::ALL);

    let (assets, assets_color) = match &app.assets {
        AssetStatus::Loading => ("loading samples…".to_string(), Color::Yellow),
        AssetStatus::Ready => ("ready".to_string(), Color::Green),
        AssetStatus::Failed(err) => (format!("no samples: {}", err), Color::Red),
    };

    let me = app.local.participant();
    let releases = if app.enhanced_keys {
        "key-up"
    } else {
        "auto-fade"
    };

    let line = Line::from(vec![
        Span::styled(format!(" {}  ", assets), Style::default().fg(assets_color)),
        Span::styled(
            format!("● {}  ", me.name),
            Style::default().fg(Color::Rgb(me.color.r, me.color.g, me.color.b)),
        ),
        Span::styled(
            format!("voices: {}  ", app.engine.voices().live_count()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("releases: {}", releases),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
