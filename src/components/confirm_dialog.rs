//! Confirmation dialogs
//!
//! The quit confirmation and every CRUD prompt (delete, bulk delete, export)
//! share one look: a title, a short body, and accept/cancel keys.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::modal::ConfirmPrompt;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Body lines shown before the list is elided
const MAX_BODY_LINES: usize = 8;

#[derive(Default)]
pub struct ConfirmDialog;

impl ConfirmDialog {
    pub fn draw_quit(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let popup_area = centered_popup(area, 40, 7);
        frame.render_widget(Clear, popup_area);

        let content = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Are you sure you want to quit?",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            accept_line("Yes, quit", Color::Green),
        ];
        render_popup(frame, popup_area, content, " Quit? ", Color::Yellow);
        Ok(())
    }

    pub fn draw_prompt(&mut self, frame: &mut Frame, area: Rect, prompt: &ConfirmPrompt) -> Result<()> {
        let mut content = vec![Line::from("")];
        for line in prompt.body.iter().take(MAX_BODY_LINES) {
            content.push(Line::from(Span::styled(
                line.clone(),
                Style::default().fg(Color::White),
            )));
        }
        if prompt.body.len() > MAX_BODY_LINES {
            content.push(Line::from(Span::styled(
                format!("... and {} more", prompt.body.len() - MAX_BODY_LINES),
                Style::default().fg(Color::DarkGray),
            )));
        }
        content.push(Line::from(""));
        if let Some(error) = &prompt.error {
            content.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
            content.push(Line::from(""));
        }
        if prompt.is_loading() {
            content.push(Line::from(Span::styled(
                "Working...",
                Style::default().fg(Color::Yellow),
            )));
        } else {
            content.push(accept_line(&prompt.accept_button_text, Color::Red));
        }

        let height = content.len() as u16 + 2;
        let popup_area = centered_popup(area, 60, height);
        frame.render_widget(Clear, popup_area);
        render_popup(
            frame,
            popup_area,
            content,
            &format!(" {} ", prompt.title),
            Color::Red,
        );
        Ok(())
    }
}

fn accept_line(accept: &str, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(" y ", Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(format!("{}  ", accept)),
        Span::styled(" n/Esc ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw("Cancel"),
    ])
}

fn render_popup(frame: &mut Frame, area: Rect, content: Vec<Line>, title: &str, color: Color) {
    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title.to_string())
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

impl Component for ConfirmDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(Action::ConfirmModal),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Action::CloseModal),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        self.draw_quit(frame, area)
    }
}
