//! Layout calculations for the UI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Console screen layout areas
pub struct ConsoleLayout {
    pub tabs: Rect,
    pub search: Rect,
    pub table: Rect,
    pub status: Rect,
    pub help: Rect,
}

/// Calculate centered popup area
pub fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_x = area.x + (area.width.saturating_sub(width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(
        popup_x,
        popup_y,
        width.min(area.width),
        height.min(area.height),
    )
}

/// Calculate the console layout: tabs, search bar, table, status line, help bar
pub fn calculate_console_layout(area: Rect) -> ConsoleLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    ConsoleLayout {
        tabs: chunks[0],
        search: chunks[1],
        table: chunks[2],
        status: chunks[3],
        help: chunks[4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_popup_fits_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_popup(area, 60, 10);
        assert_eq!(popup, Rect::new(20, 15, 60, 10));

        let small = centered_popup(Rect::new(0, 0, 30, 5), 60, 10);
        assert_eq!(small.width, 30);
        assert_eq!(small.height, 5);
    }

    #[test]
    fn test_console_layout_gives_table_the_rest() {
        let layout = calculate_console_layout(Rect::new(0, 0, 120, 40));
        assert_eq!(layout.tabs.height, 2);
        assert_eq!(layout.search.height, 3);
        assert_eq!(layout.table.height, 33);
        assert_eq!(layout.help.y, 39);
    }
}
