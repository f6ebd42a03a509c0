//! Row-action dropdown component
//!
//! Separators render as dividers; the cursor never lands on them.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::listing::columns::MenuItem;
use crate::model::modal::RowActionsMenu;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
    Frame,
};

#[derive(Default)]
pub struct RowActionsDialog;

impl RowActionsDialog {
    pub fn draw_with_menu(&mut self, frame: &mut Frame, area: Rect, menu: &RowActionsMenu) -> Result<()> {
        let width = 32;
        let popup_area = centered_popup(area, width, menu.items().len() as u16 + 2);
        frame.render_widget(Clear, popup_area);

        let items: Vec<ListItem> = menu
            .items()
            .iter()
            .map(|item| match item {
                MenuItem::Action { label, .. } => ListItem::new(Line::from(Span::styled(
                    format!(" {}", label),
                    Style::default().fg(Color::White),
                ))),
                MenuItem::Separator => ListItem::new(Line::from(Span::styled(
                    "─".repeat(width.saturating_sub(2) as usize),
                    Style::default().fg(Color::DarkGray),
                ))),
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(format!(" {} ", menu.menu.menu_label))
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .title_bottom(Line::from(Span::styled(
                        format!(" {} ", truncate_name(&menu.record_name, width as usize - 4)),
                        Style::default().fg(Color::Gray),
                    ))),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );

        let mut state = ListState::default().with_selected(Some(menu.cursor));
        frame.render_stateful_widget(list, popup_area, &mut state);
        Ok(())
    }
}

fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        let kept: String = name.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

impl Component for RowActionsDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::CloseModal),
            KeyCode::Enter => Some(Action::ConfirmModal),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::ModalDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::ModalUp),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        Ok(())
    }
}
