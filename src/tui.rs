//! Terminal session
//!
//! Owns raw mode and the alternate screen for the lifetime of the console.
//! The terminal is put back on exit, on drop and on panic, whichever comes
//! first. Events are pre-filtered so the app only sees key presses, clicks,
//! wheel scrolls and resizes.

use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseEventKind},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::io::{self, Stdout};
use std::panic;
use std::sync::Once;
use std::time::Duration;

static PANIC_HOOK: Once = Once::new();

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// How long `next_event` waits before reporting a tick
    tick_rate: Duration,
    mouse: bool,
    active: bool,
}

impl Tui {
    pub fn new(tick_rate: Duration, mouse: bool) -> Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok(Self {
            terminal,
            tick_rate,
            mouse,
            active: false,
        })
    }

    /// Switch to raw mode on the alternate screen
    pub fn enter(&mut self) -> Result<()> {
        PANIC_HOOK.call_once(install_panic_hook);
        terminal::enable_raw_mode()?;
        crossterm::execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        if self.mouse {
            crossterm::execute!(io::stdout(), EnableMouseCapture)?;
        }
        self.active = true;
        self.terminal.clear()?;
        tracing::debug!(mouse = self.mouse, tick_ms = self.tick_rate.as_millis() as u64, "terminal entered");
        Ok(())
    }

    /// Give the terminal back; a no-op when it was never entered
    pub fn exit(&mut self) -> Result<()> {
        if !std::mem::take(&mut self.active) {
            return Ok(());
        }
        restore_terminal()?;
        tracing::debug!("terminal restored");
        Ok(())
    }

    /// Wait up to one tick for an event the console reacts to
    ///
    /// `None` means the tick elapsed. Key releases, pointer motion and
    /// drags are swallowed here.
    pub fn next_event(&self) -> Result<Option<Event>> {
        if !event::poll(self.tick_rate)? {
            return Ok(None);
        }
        Ok(Some(event::read()?).filter(is_relevant))
    }

    pub fn draw<F>(&mut self, render: F) -> Result<()>
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal.draw(render)?;
        Ok(())
    }
}

fn is_relevant(event: &Event) -> bool {
    match event {
        // Windows reports releases too
        Event::Key(key) => key.kind == KeyEventKind::Press,
        Event::Mouse(mouse) => matches!(
            mouse.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        ),
        Event::Resize(_, _) => true,
        _ => false,
    }
}

fn restore_terminal() -> io::Result<()> {
    terminal::disable_raw_mode()?;
    crossterm::execute!(
        io::stdout(),
        DisableMouseCapture,
        LeaveAlternateScreen,
        cursor::Show
    )
}

/// Restore the terminal before the default hook prints the panic message
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        tracing::error!(%info, "panic");
        previous(info);
    }));
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{
        KeyCode, KeyEvent, KeyEventState, KeyModifiers, MouseButton, MouseEvent,
    };

    fn mouse(kind: MouseEventKind) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: 4,
            row: 2,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_only_presses_clicks_and_scrolls_pass() {
        assert!(is_relevant(&Event::Key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE))));
        let release = KeyEvent {
            code: KeyCode::Char('j'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(!is_relevant(&Event::Key(release)));

        assert!(is_relevant(&mouse(MouseEventKind::Down(MouseButton::Left))));
        assert!(is_relevant(&mouse(MouseEventKind::ScrollDown)));
        assert!(!is_relevant(&mouse(MouseEventKind::Moved)));
        assert!(!is_relevant(&mouse(MouseEventKind::Drag(MouseButton::Left))));
        assert!(is_relevant(&Event::Resize(80, 24)));
        assert!(!is_relevant(&Event::FocusGained));
    }
}
