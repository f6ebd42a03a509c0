//! Console component - Main application screen
//!
//! Displays the listing tabs, the search bar, the active listing table,
//! the status line and the help bar. Owns tab and search-mode state.

use crate::action::Action;
use crate::component::Component;
use crate::components::calculate_console_layout;
use crate::components::listing_table::draw_listing;
use crate::listing::Listing;
use crate::model::ui::Tab;
use crate::model::{FuelReport, Vendor};
use crate::services::{LoadingState, Notification, NotificationLevel};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Console Component
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct ConsoleComponent {
    /// Current active tab
    pub active_tab: Tab,

    /// Whether keystrokes go to the search bar
    pub search_mode: bool,
}

impl ConsoleComponent {
    pub fn new(active_tab: Tab) -> Self {
        Self {
            active_tab,
            search_mode: false,
        }
    }

    pub fn next_tab(&mut self) {
        self.active_tab = self.active_tab.next();
        self.search_mode = false;
    }

    pub fn previous_tab(&mut self) {
        self.active_tab = self.active_tab.previous();
        self.search_mode = false;
    }

    fn search_key(&self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => Some(Action::ExitSearchMode),
            KeyCode::Backspace => Some(Action::SearchBackspace),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::ClearSearch)
            }
            KeyCode::Char(c) => Some(Action::SearchInput(c)),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for ConsoleComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.search_mode {
            return Ok(self.search_key(key));
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let action = match key.code {
            // Navigation
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NextItem),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevItem),
            KeyCode::Char('g') => Some(Action::FirstItem),
            KeyCode::Char('G') => Some(Action::LastItem),
            KeyCode::Char('h') | KeyCode::Left => Some(Action::PrevColumn),
            KeyCode::Char('l') | KeyCode::Right => Some(Action::NextColumn),
            KeyCode::Tab => Some(Action::NextTab),
            KeyCode::BackTab => Some(Action::PrevTab),

            // Paging, sorting, filtering
            KeyCode::Char('n') | KeyCode::PageDown => Some(Action::NextPage),
            KeyCode::Char('p') | KeyCode::PageUp => Some(Action::PrevPage),
            KeyCode::Char('s') => Some(Action::ToggleSort),
            KeyCode::Char('f') => Some(Action::OpenFilters),
            KeyCode::Char('R') => Some(Action::Refresh),

            // Search
            KeyCode::Char('/') => Some(Action::EnterSearchMode),
            KeyCode::Char('u') if ctrl => Some(Action::ClearSearch),

            // Selection
            KeyCode::Char(' ') => Some(Action::ToggleRowSelection),
            KeyCode::Char('a') if ctrl => Some(Action::ToggleAllRows),

            // Records
            KeyCode::Enter => Some(Action::ActivateRow),
            KeyCode::Char('.') => Some(Action::OpenRowActions),
            KeyCode::Char('c') => Some(Action::CreateRecord),
            KeyCode::Char('e') => Some(Action::EditRecord),
            KeyCode::Char('d') => Some(Action::DeleteRecord),
            KeyCode::Char('D') => Some(Action::BulkDelete),
            KeyCode::Char('x') => Some(Action::Export),

            // Modals
            KeyCode::Char('?') => Some(Action::OpenHelp),
            KeyCode::Char('q') => Some(Action::OpenQuitDialog),

            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Drawing is done through draw_console_screen which takes full context
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rendering Functions
// ═══════════════════════════════════════════════════════════════════════════════

/// Context needed for rendering the console screen
pub struct ConsoleRenderContext<'a> {
    pub fuel_reports: &'a Listing<FuelReport>,
    pub vendors: &'a Listing<Vendor>,
    /// Current route URL, e.g. `/vendors?page=2`
    pub url: String,
    pub notification: Option<&'a Notification>,
    pub loading: Option<&'a LoadingState>,
    pub error: Option<&'a str>,
}

/// Draw the console screen
pub fn draw_console_screen(
    frame: &mut Frame,
    area: Rect,
    console: &ConsoleComponent,
    ctx: &ConsoleRenderContext,
) -> Result<()> {
    let layout = calculate_console_layout(area);

    render_tabs(frame, layout.tabs, console);
    let (input, pending) = match console.active_tab {
        Tab::FuelReports => (ctx.fuel_reports.search_input(), ctx.fuel_reports.search_pending()),
        Tab::Vendors => (ctx.vendors.search_input(), ctx.vendors.search_pending()),
    };
    render_search_bar(frame, layout.search, console, input, pending);

    match console.active_tab {
        Tab::FuelReports => draw_listing(frame, layout.table, ctx.fuel_reports, "Fuel Reports", ctx.loading),
        Tab::Vendors => draw_listing(frame, layout.table, ctx.vendors, "Vendors", ctx.loading),
    }

    render_status_bar(frame, layout.status, ctx);
    render_help_bar(frame, layout.help, console);
    Ok(())
}

fn render_tabs(frame: &mut Frame, area: Rect, console: &ConsoleComponent) {
    let all_tabs = Tab::all();
    let titles: Vec<&str> = all_tabs.iter().map(|t| t.name()).collect();
    let selected = all_tabs
        .iter()
        .position(|t| *t == console.active_tab)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::BOTTOM))
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_search_bar(frame: &mut Frame, area: Rect, console: &ConsoleComponent, input: &str, pending: bool) {
    let border = if console.search_mode { Color::Cyan } else { Color::DarkGray };
    let mut spans = vec![Span::styled(
        format!(" {}", input),
        Style::default().fg(Color::White),
    )];
    if console.search_mode {
        spans.push(Span::styled("_", Style::default().fg(Color::Cyan)));
    } else if input.is_empty() {
        spans = vec![Span::styled(
            " Press / to search",
            Style::default().fg(Color::DarkGray),
        )];
    }
    if pending {
        spans.push(Span::styled("  …", Style::default().fg(Color::Yellow)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search ")
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, ctx: &ConsoleRenderContext) {
    let mut spans = vec![Span::styled(
        format!(" {} ", ctx.url),
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::raw(" "));

    if let Some(loading) = ctx.loading {
        spans.push(Span::styled(
            format!(
                "{} {:.1}s ",
                loading.message,
                loading.since.elapsed().as_secs_f32()
            ),
            Style::default().fg(Color::Yellow),
        ));
    }

    if let Some(notification) = ctx.notification {
        let color = match notification.level {
            NotificationLevel::Success => Color::Green,
            NotificationLevel::Error => Color::Red,
        };
        spans.push(Span::styled(
            format!(" {} ", notification.message),
            Style::default().fg(color),
        ));
    }

    // Error message if present
    if let Some(error) = ctx.error {
        spans.push(Span::styled(
            format!(" Error: {} ", error),
            Style::default().fg(Color::Red),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans));
    frame.render_widget(paragraph, area);
}

fn key_span(key: &str, color: Color) -> Span<'static> {
    Span::styled(
        format!(" {} ", key),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

fn render_help_bar(frame: &mut Frame, area: Rect, console: &ConsoleComponent) {
    let help_spans = if console.search_mode {
        vec![
            key_span("Esc", Color::Yellow),
            Span::raw("Done  "),
            key_span("Ctrl+u", Color::Cyan),
            Span::raw("Clear"),
        ]
    } else {
        let mut spans = vec![
            key_span("q", Color::Yellow),
            Span::raw("Quit "),
            key_span("/", Color::Cyan),
            Span::raw("Search "),
            key_span("s", Color::Cyan),
            Span::raw("Sort "),
            key_span("f", Color::Cyan),
            Span::raw("Filter "),
            key_span("n/p", Color::Cyan),
            Span::raw("Page "),
            key_span(".", Color::Magenta),
            Span::raw("Actions "),
        ];
        if console.active_tab == Tab::FuelReports {
            spans.extend([
                key_span("c", Color::Green),
                Span::raw("New "),
                key_span("e", Color::Green),
                Span::raw("Edit "),
                key_span("d", Color::Red),
                Span::raw("Delete "),
                key_span("D", Color::Red),
                Span::raw("Bulk "),
                key_span("x", Color::Blue),
                Span::raw("Export "),
            ]);
        }
        spans.extend([key_span("?", Color::White), Span::raw("Help")]);
        spans
    };

    let paragraph = Paragraph::new(Line::from(help_spans))
        .alignment(ratatui::layout::Alignment::Left);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_search_mode_captures_letters() {
        let mut console = ConsoleComponent::new(Tab::FuelReports);
        assert_eq!(console.handle_key_event(key(KeyCode::Char('q'))).unwrap(), Some(Action::OpenQuitDialog));

        console.search_mode = true;
        assert_eq!(console.handle_key_event(key(KeyCode::Char('q'))).unwrap(), Some(Action::SearchInput('q')));
        assert_eq!(console.handle_key_event(key(KeyCode::Esc)).unwrap(), Some(Action::ExitSearchMode));
    }

    #[test]
    fn test_tab_switch_leaves_search_mode() {
        let mut console = ConsoleComponent::new(Tab::FuelReports);
        console.search_mode = true;
        console.next_tab();
        assert_eq!(console.active_tab, Tab::Vendors);
        assert!(!console.search_mode);
    }

    #[test]
    fn test_ctrl_a_toggles_all_rows() {
        let mut console = ConsoleComponent::default();
        let action = console
            .handle_key_event(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL))
            .unwrap();
        assert_eq!(action, Some(Action::ToggleAllRows));
    }
}
