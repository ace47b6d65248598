//! keyblend - shared piano keyboard in the terminal
//!
//! Run with: cargo run
//! Set KEYBLEND_ASSETS to a directory of Ogg samples to use them instead of
//! the built-in tones. Logs go to keyblend.log (filter with RUST_LOG).

mod app;
mod ui;

use std::fs::File;
use std::sync::Mutex;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use app::App;

const LOG_FILE: &str = "keyblend.log";

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_tracing()?;

    let app = App::new()?;

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    result
}

fn init_tracing() -> EyreResult<()> {
    let file = File::create(LOG_FILE).wrap_err_with(|| format!("failed to create {}", LOG_FILE))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keyblend=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
