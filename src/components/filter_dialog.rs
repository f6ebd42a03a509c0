//! Column filter dialog component
//!
//! One entry per filterable column. Text and date-range entries take typed
//! input; multi-option entries list their options with checkboxes.

use crate::action::Action;
use crate::component::Component;
use crate::listing::columns::FilterKind;
use crate::model::modal::{FilterDialog, FilterEntry};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

#[derive(Default)]
pub struct FilterDialogComponent;

fn entry_lines(entry: &FilterEntry, focused: bool) -> Vec<Line<'static>> {
    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let marker = if focused { "▶" } else { " " };

    match &entry.kind {
        FilterKind::MultiOption(options) => {
            let mut lines = vec![Line::from(Span::styled(
                format!(" {} {}", marker, entry.label),
                label_style,
            ))];
            if focused {
                for (i, option) in options.iter().enumerate() {
                    let checked = if entry.selected.contains(option) { "[x]" } else { "[ ]" };
                    let style = if i == entry.option_cursor {
                        Style::default().fg(Color::Black).bg(Color::Cyan)
                    } else {
                        Style::default().fg(Color::White)
                    };
                    lines.push(Line::from(Span::styled(
                        format!("      {} {}", checked, option),
                        style,
                    )));
                }
            } else if !entry.selected.is_empty() {
                let chosen: Vec<&str> = entry.selected.iter().map(String::as_str).collect();
                lines.push(Line::from(Span::styled(
                    format!("      {}", chosen.join(", ")),
                    Style::default().fg(Color::Yellow),
                )));
            }
            lines
        }
        kind => {
            let hint = match kind {
                FilterKind::DateRange => "YYYY-MM-DD..YYYY-MM-DD",
                _ => "contains",
            };
            let cursor = if focused { "_" } else { "" };
            vec![Line::from(vec![
                Span::styled(format!(" {} {:<14}", marker, entry.label), label_style),
                Span::styled(
                    format!("{}{}", entry.input, cursor),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(format!("  ({})", hint), Style::default().fg(Color::DarkGray)),
            ])]
        }
    }
}

impl FilterDialogComponent {
    pub fn draw_with_dialog(&mut self, frame: &mut Frame, area: Rect, dialog: &FilterDialog) -> Result<()> {
        let margin = 6;
        let dialog_area = Rect::new(
            area.x + margin,
            area.y + 2,
            area.width.saturating_sub(margin * 2),
            area.height.saturating_sub(4),
        );
        frame.render_widget(Clear, dialog_area);

        let mut lines = vec![Line::from("")];
        for (i, entry) in dialog.entries.iter().enumerate() {
            lines.extend(entry_lines(entry, i == dialog.cursor));
        }
        lines.push(Line::from(""));
        if let Some(error) = &dialog.error {
            lines.push(Line::from(Span::styled(
                format!(" {}", error),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw("Apply  "),
            Span::styled(" Tab ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw("Next filter  "),
            Span::styled(" Space ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw("Toggle option  "),
            Span::styled(" Ctrl+u ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw("Clear  "),
            Span::styled(" Esc ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw("Cancel"),
        ]));

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta))
                .title(" Filters ")
                .title_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
        );
        frame.render_widget(paragraph, dialog_area);
        Ok(())
    }
}

impl Component for FilterDialogComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Enter => Some(Action::ConfirmModal),
            KeyCode::Tab => Some(Action::ModalDown),
            KeyCode::BackTab => Some(Action::ModalUp),
            KeyCode::Down => Some(Action::ModalRight),
            KeyCode::Up => Some(Action::ModalLeft),
            KeyCode::Backspace => Some(Action::ModalBackspace),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::ModalClear)
            }
            KeyCode::Char(c) => Some(Action::ModalInput(c)),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        Ok(())
    }
}
