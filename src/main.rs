//! fleet-console - A terminal console for fleet operations records
//!
//! Lists fuel reports and vendors with search, filters, sorting and
//! paging, and manages fuel reports. It uses the Component Architecture
//! pattern from ratatui.

mod action;
mod app;
mod component;
mod components;
mod config;
mod error;
mod listing;
mod logging;
mod management;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::component::Component;
use crate::config::Config;
use crate::model::ui::Tab;
use crate::services::MemoryStore;
use crate::tui::Tui;
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyModifiers};
use std::path::Path;

/// Command-line flags; each one overrides the saved config
#[derive(Debug, Parser)]
#[command(name = "fleet-console", version, about)]
struct Args {
    /// YAML dataset to load and persist to
    #[arg(long, value_name = "PATH")]
    data: Option<String>,

    /// Listing to open: fuel-reports or vendors
    #[arg(long, default_value = "fuel-reports")]
    route: String,

    /// Initial query string, e.g. 'page=2&status=["active"]'
    #[arg(long, value_name = "QUERY")]
    query: Option<String>,

    /// Page size when the query does not set one
    #[arg(long)]
    limit: Option<u32>,

    /// Log file
    #[arg(long, value_name = "PATH")]
    log: Option<String>,

    /// Leave the mouse to the terminal (text selection) instead of the table
    #[arg(long)]
    no_mouse: bool,

    /// Write the effective configuration to the config file and continue
    #[arg(long)]
    save_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (mut config, config_warning) = Config::load();
    if let Some(data) = args.data {
        config.data_path = data;
    }
    if let Some(limit) = args.limit {
        config.default_limit = limit;
    }
    if let Some(log) = args.log {
        config.log_path = log;
    }
    if args.no_mouse {
        config.mouse = false;
    }

    logging::init(Path::new(&config.log_path))?;
    if let Some(warning) = config_warning {
        tracing::warn!(%warning, "config unreadable, using defaults");
    }
    if args.save_config {
        config.save()?;
        tracing::info!("config saved");
    }

    let tab = Tab::from_route_name(&args.route)
        .with_context(|| format!("unknown route '{}', expected fuel-reports or vendors", args.route))?;
    let store = MemoryStore::load(&config.data_path, config.default_limit)
        .with_context(|| format!("loading dataset {}", config.data_path))?;
    let (tick_rate, mouse) = (config.tick_rate(), config.mouse);
    let mut app = App::new(config, store, tab, args.query.as_deref())?;
    app.init()?;
    tracing::info!(route = %args.route, "console started");

    // Setup terminal
    let mut tui = Tui::new(tick_rate, mouse)?;
    tui.enter()?;

    // Main event loop
    let result = run_app(&mut tui, &mut app);

    // Cleanup terminal
    tui.exit()?;

    // Handle any errors
    if let Err(err) = result {
        tracing::error!(error = ?err, "console stopped on error");
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    tracing::info!("console stopped");
    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        // Draw the UI
        tui.draw(|frame| {
            if let Err(e) = app.draw(frame, frame.area()) {
                tracing::error!(error = %e, "draw failed");
            }
        })?;

        // Poll for events
        if let Some(event) = tui.next_event()? {
            // Convert event to action
            let action = match event {
                Event::Key(key)
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL) =>
                {
                    Some(Action::ForceQuit)
                }
                Event::Key(key) => app.handle_key_event(key)?,
                Event::Mouse(mouse) => app.handle_mouse_event(mouse)?,
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                _ => None,
            };

            // Process the action
            if let Some(action) = action {
                // Action might produce a follow-up action
                let mut current_action = Some(action);
                while let Some(a) = current_action {
                    current_action = app.update(a)?;
                }
            }
        } else {
            // No event - send a tick for time-based updates
            app.update(Action::Tick)?;
        }
    }

    Ok(())
}
