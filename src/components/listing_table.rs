//! Listing table rendering
//!
//! Draws any `Listing` as a table: a selection column, one column per visible
//! descriptor, sort markers in the header and the focused column highlighted.
//! `hit_test` maps a click back onto the same geometry.

use crate::listing::columns::{CellKind, ColumnDescriptor};
use crate::listing::Listing;
use crate::model::Record;
use crate::services::loader::{LoadingState, MAIN_CONTENT};
use ratatui::{
    layout::{Alignment, Constraint, Flex, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cut `text` to at most `width` terminal cells, marking the cut with `…`
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

pub fn status_style(status: &str) -> Style {
    let color = match status {
        "approved" | "active" => Color::Green,
        "pending" => Color::Yellow,
        "rejected" | "inactive" => Color::Red,
        _ => Color::Gray,
    };
    Style::default().fg(color)
}

fn header_label<R: Record>(listing: &Listing<R>, column: &ColumnDescriptor) -> String {
    let marker = match (listing.query().sort(), column.sort_key()) {
        (Some(sort), Some(key)) if sort.key == key && sort.descending => " ▼",
        (Some(sort), Some(key)) if sort.key == key => " ▲",
        _ => "",
    };
    format!("{}{}", column.label, marker)
}

const HIGHLIGHT_SYMBOL: &str = "▶ ";
const SELECT_WIDTH: u16 = 3;
const COLUMN_SPACING: u16 = 1;
/// Header row plus its bottom margin
const HEADER_HEIGHT: u16 = 2;

/// Part of the listing table under a click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableHit {
    /// The `[ ]` box in the header
    SelectAll,
    /// Header of the visible column at this index
    Header(usize),
    /// The `[ ]` box of a row
    SelectRow(usize),
    Cell { row: usize, column: usize },
}

fn column_widths(columns: &[&ColumnDescriptor], inner_width: u16) -> Vec<u16> {
    columns.iter().map(|c| c.width.cells(inner_width)).collect()
}

/// Locate a click at (`x`, `y`) in a listing drawn into `area`
pub fn hit_test<R: Record>(listing: &Listing<R>, area: Rect, x: u16, y: u16) -> Option<TableHit> {
    let inner = Rect::new(
        area.x + 1,
        area.y + 1,
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    );
    let inside = x >= inner.x && x < inner.right() && y >= inner.y && y < inner.bottom();
    let table_view = listing.table();
    if !inside || table_view.is_empty() {
        return None;
    }

    enum Slot {
        Select,
        Column(usize),
    }
    let columns = listing.columns().visible();
    let mut left = inner.x + HIGHLIGHT_SYMBOL.width() as u16;
    let slot = if x < left {
        return None;
    } else if x < left + SELECT_WIDTH {
        Slot::Select
    } else {
        left += SELECT_WIDTH + COLUMN_SPACING;
        let index = column_widths(&columns, inner.width).into_iter().position(|w| {
            let hit = x >= left && x < left + w;
            left += w + COLUMN_SPACING;
            hit
        })?;
        Slot::Column(index)
    };

    if y == inner.y {
        return Some(match slot {
            Slot::Select => TableHit::SelectAll,
            Slot::Column(index) => TableHit::Header(index),
        });
    }
    let data_top = inner.y + HEADER_HEIGHT;
    if y < data_top {
        return None;
    }

    // Rows scroll just far enough to keep the cursor on screen
    let visible_rows = inner.height.saturating_sub(HEADER_HEIGHT) as usize;
    let offset = table_view
        .cursor()
        .saturating_sub(visible_rows.saturating_sub(1));
    let row = offset + (y - data_top) as usize;
    if row >= table_view.len() {
        return None;
    }
    Some(match slot {
        Slot::Select => TableHit::SelectRow(row),
        Slot::Column(column) => TableHit::Cell { row, column },
    })
}

fn cell<'a, R: Record>(
    listing: &Listing<R>,
    index: usize,
    column: &ColumnDescriptor,
    width: usize,
) -> Cell<'a> {
    let value = || {
        column
            .value_path
            .as_deref()
            .and_then(|path| listing.table().cell_value(index, path))
            .unwrap_or_default()
    };
    match &column.cell {
        CellKind::Text => Cell::from(truncate(&value(), width)),
        CellKind::Anchor { .. } => Cell::from(Span::styled(
            truncate(&value(), width),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::UNDERLINED),
        )),
        CellKind::Status => {
            let status = value();
            Cell::from(Span::styled(truncate(&status, width), status_style(&status)))
        }
        CellKind::Dropdown(menu) => Cell::from(Span::styled(
            menu.button_text.clone().unwrap_or_else(|| "⋯".to_string()),
            Style::default().fg(Color::DarkGray),
        )),
    }
}

/// Draw a listing, or its loading indicator while the table region is loading
pub fn draw_listing<R: Record>(
    frame: &mut Frame,
    area: Rect,
    listing: &Listing<R>,
    title: &str,
    loading: Option<&LoadingState>,
) {
    let meta = listing.meta();
    let table_view = listing.table();
    let mut block_title = format!(
        " {} ({}) page {}/{} ",
        title, meta.total, meta.page, meta.last_page
    );
    if table_view.selected_count() > 0 {
        block_title = format!("{}[{}✓] ", block_title, table_view.selected_count());
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .title(block_title)
        .border_style(Style::default().fg(Color::DarkGray));

    if let Some(loading) = loading.filter(|l| l.region == MAIN_CONTENT) {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                loading.message.clone(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    if table_view.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            format!("No {} found", title.to_lowercase()),
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let columns = listing.columns().visible();
    let inner_width = area.width.saturating_sub(2);
    let widths = column_widths(&columns, inner_width);
    let focused_column = table_view
        .column_cursor()
        .min(columns.len().saturating_sub(1));

    let select_marker = if table_view.all_toggled() { "[x]" } else { "[ ]" };
    let mut header_cells = vec![Cell::from(select_marker)];
    header_cells.extend(columns.iter().enumerate().map(|(i, column)| {
        let style = if i == focused_column {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        };
        Cell::from(Span::styled(header_label(listing, column), style))
    }));
    let header = Row::new(header_cells).bottom_margin(1);

    let rows: Vec<Row> = table_view
        .rows()
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let selected = table_view.is_selected(record);
            let mut cells = vec![Cell::from(Span::styled(
                if selected { "[x]" } else { "[ ]" },
                Style::default().fg(if selected { Color::Green } else { Color::DarkGray }),
            ))];
            cells.extend(
                columns
                    .iter()
                    .zip(&widths)
                    .map(|(column, width)| cell(listing, index, column, *width as usize)),
            );
            Row::new(cells)
        })
        .collect();

    let mut constraints = vec![Constraint::Length(SELECT_WIDTH)];
    constraints.extend(widths.iter().map(|w| Constraint::Length(*w)));

    let table = Table::new(rows, constraints)
        .header(header)
        .block(block)
        .column_spacing(COLUMN_SPACING)
        .flex(Flex::Start)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(HIGHLIGHT_SYMBOL);

    let mut state = TableState::default().with_selected(Some(table_view.cursor()));
    frame.render_stateful_widget(table, area, &mut state);
}
