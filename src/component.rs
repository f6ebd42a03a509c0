//! Component trait
//!
//! `App` is the root component. It hands key events to the top modal's
//! dialog or to the console, and turns clicks into table actions. Dialogs
//! and the console only translate input into `Action`s; every state change
//! happens in `App::update`.

use crate::action::Action;
use anyhow::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{layout::Rect, Frame};

pub trait Component {
    /// One-time setup before the first frame
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Translate a key press into an action; no state changes here
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let _ = key;
        Ok(None)
    }

    /// Translate a click or wheel scroll into an action
    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        let _ = mouse;
        Ok(None)
    }

    /// Apply an action
    ///
    /// A returned action is fed straight back in, so one input can chain,
    /// e.g. a row-action menu confirming into `RunRowAction`.
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let _ = action;
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()>;
}
