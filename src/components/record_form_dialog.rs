//! Record form dialog component
//!
//! Renders a `FormModal`: one line per input, the focused input highlighted,
//! the accept button reflecting the loading state and any error underneath.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::modal::FormModal;
use crate::model::FieldKind;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

#[derive(Default)]
pub struct RecordFormDialog;

impl RecordFormDialog {
    pub fn draw_with_form(&mut self, frame: &mut Frame, area: Rect, form: &FormModal) -> Result<()> {
        let height = (form.inputs.len() as u16 + 8).min(area.height);
        let popup_area = centered_popup(area, 70, height);
        frame.render_widget(Clear, popup_area);

        let mut lines = vec![Line::from("")];
        for (i, input) in form.inputs.iter().enumerate() {
            let focused = i == form.focus;
            let label_style = if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let marker = if input.field.required { "*" } else { " " };
            let value = match input.field.kind {
                FieldKind::Choice(_) => format!("‹ {} ›", input.value),
                _ if focused => format!("{}_", input.value),
                _ => input.value.clone(),
            };
            let value_style = if input.is_dirty() {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" {:>14}{} ", input.field.label, marker), label_style),
                Span::styled(value, value_style),
            ]));
        }
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                format!(" {} ", error),
                Style::default().fg(Color::Red),
            )));
        }

        let accept = if form.is_loading() {
            " Saving... ".to_string()
        } else {
            format!(" Enter {} ", form.options.accept_button_text)
        };
        lines.push(Line::from(vec![
            Span::styled(accept, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::styled(" Esc ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw("Cancel  "),
            Span::styled(" Tab ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw("Next field"),
        ]));

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Green))
                    .title(format!(" {} ", form.options.title))
                    .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            )
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}

impl Component for RecordFormDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Enter => Some(Action::ConfirmModal),
            KeyCode::Tab | KeyCode::Down => Some(Action::ModalDown),
            KeyCode::BackTab | KeyCode::Up => Some(Action::ModalUp),
            KeyCode::Left => Some(Action::ModalLeft),
            KeyCode::Right => Some(Action::ModalRight),
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
        // Drawing goes through draw_with_form, which needs the open form
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_map_to_form_actions() {
        let mut dialog = RecordFormDialog;
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);

        assert_eq!(dialog.handle_key_event(key(KeyCode::Char('q'))).unwrap(), Some(Action::ModalInput('q')));
        assert_eq!(dialog.handle_key_event(key(KeyCode::Tab)).unwrap(), Some(Action::ModalDown));
        assert_eq!(dialog.handle_key_event(key(KeyCode::Enter)).unwrap(), Some(Action::ConfirmModal));
        assert_eq!(
            dialog
                .handle_key_event(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL))
                .unwrap(),
            Some(Action::ModalClear)
        );
    }
}
