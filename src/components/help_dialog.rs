//! Help dialog component
//!
//! Displays all keyboard shortcuts available in the application.

use crate::action::Action;
use crate::component::Component;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Help dialog showing all keyboard shortcuts
///
/// The scroll offset lives on the open `Modal::Help` so the app can move it
/// with the same modal actions every dialog uses.
#[derive(Default)]
pub struct HelpDialog;

impl HelpDialog {
    /// Largest useful scroll offset for a dialog of the given area
    pub fn max_scroll(area: Rect) -> usize {
        let visible_height = dialog_area(area).height.saturating_sub(2) as usize;
        build_help_content().len().saturating_sub(visible_height)
    }

    pub fn draw_with_offset(&mut self, frame: &mut Frame, area: Rect, scroll_offset: usize) -> Result<()> {
        let dialog_area = dialog_area(area);
        frame.render_widget(Clear, dialog_area);

        let content = build_help_content();
        let total = content.len();
        let visible_height = dialog_area.height.saturating_sub(2) as usize;

        // Clamp scroll offset
        let max_scroll = total.saturating_sub(visible_height);
        let scroll_offset = scroll_offset.min(max_scroll);

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Keyboard Shortcuts ")
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .scroll((scroll_offset as u16, 0));

        frame.render_widget(paragraph, dialog_area);

        // Render scrollbar if content exceeds visible area
        if total > visible_height {
            let mut scrollbar_state =
                ScrollbarState::new(total.saturating_sub(visible_height)).position(scroll_offset);

            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                dialog_area.inner(ratatui::layout::Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        Ok(())
    }
}

fn dialog_area(area: Rect) -> Rect {
    let margin = 4;
    Rect::new(
        area.x + margin,
        area.y + margin / 2,
        area.width.saturating_sub(margin * 2),
        area.height.saturating_sub(margin),
    )
}

impl Component for HelpDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Some(Action::CloseModal),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::ModalDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::ModalUp),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        self.draw_with_offset(frame, area, 0)
    }
}

/// Build the help content with all keyboard shortcuts
fn build_help_content() -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    // Helper to add a section header
    let add_section = |lines: &mut Vec<Line<'static>>, title: &str| {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {} ", title),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {}", "─".repeat(title.len() + 2)),
            Style::default().fg(Color::DarkGray),
        )));
    };

    // Helper to add a shortcut line
    let add_shortcut = |lines: &mut Vec<Line<'static>>, key: &str, description: &str| {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:12}", key),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(description.to_string(), Style::default().fg(Color::White)),
        ]));
    };

    // Navigation
    add_section(&mut lines, "Navigation");
    add_shortcut(&mut lines, "j / ↓", "Move to next row");
    add_shortcut(&mut lines, "k / ↑", "Move to previous row");
    add_shortcut(&mut lines, "g", "Jump to first row");
    add_shortcut(&mut lines, "G", "Jump to last row");
    add_shortcut(&mut lines, "h / ←", "Focus previous column");
    add_shortcut(&mut lines, "l / →", "Focus next column");
    add_shortcut(&mut lines, "Tab", "Next tab (Fuel Reports/Vendors)");
    add_shortcut(&mut lines, "Shift+Tab", "Previous tab");

    // Listing
    add_section(&mut lines, "Listing");
    add_shortcut(&mut lines, "n / PgDn", "Next page");
    add_shortcut(&mut lines, "p / PgUp", "Previous page");
    add_shortcut(&mut lines, "s", "Toggle sort on focused column");
    add_shortcut(&mut lines, "f", "Open column filters");
    add_shortcut(&mut lines, "R", "Refresh the listing");

    // Search
    add_section(&mut lines, "Search");
    add_shortcut(&mut lines, "/", "Enter search mode");
    add_shortcut(&mut lines, "Esc", "Exit search mode");
    add_shortcut(&mut lines, "Ctrl+u", "Clear the search");

    // Selection
    add_section(&mut lines, "Multi-Select");
    add_shortcut(&mut lines, "Space", "Toggle row selection");
    add_shortcut(&mut lines, "Ctrl+a", "Toggle all rows");

    // Row actions
    add_section(&mut lines, "Records");
    add_shortcut(&mut lines, "Enter", "Open the focused record");
    add_shortcut(&mut lines, ".", "Open the row actions menu");
    add_shortcut(&mut lines, "c", "Create a fuel report");
    add_shortcut(&mut lines, "e", "Edit the focused fuel report");
    add_shortcut(&mut lines, "d", "Delete the focused fuel report");
    add_shortcut(&mut lines, "D", "Delete the selected fuel reports");
    add_shortcut(&mut lines, "x", "Export the listing to CSV");

    add_section(&mut lines, "Mouse");
    add_shortcut(&mut lines, "Click header", "Toggle sort on that column");
    add_shortcut(&mut lines, "Click link", "Open the record");
    add_shortcut(&mut lines, "Click [ ]", "Toggle row selection");
    add_shortcut(&mut lines, "Wheel", "Move between rows");

    // General
    add_section(&mut lines, "General");
    add_shortcut(&mut lines, "?", "Show this help");
    add_shortcut(&mut lines, "q", "Quit / Close dialog");
    add_shortcut(&mut lines, "Ctrl+c", "Quit immediately");

    // Footer
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Press q, Esc, or ? to close",
        Style::default().fg(Color::DarkGray),
    )));

    lines
}
