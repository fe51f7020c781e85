// Static horizontal bar chart rendered off-screen with ratatui, dark palette.

use ratatui::buffer::Buffer;
use ratatui::layout::{Direction, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Widget};

use crate::error::TableError;
use crate::table::{ColumnKind, MarketTable};

// Bar lengths are integers; keep two decimals of resolution.
const VALUE_SCALE: f64 = 100.0;

/// One bar per record (in table order), labelled by `label_column` and sized by
/// `value_column`. Returns the rendered rows as text, one line per terminal row.
pub fn render_bar_chart(
    table: &MarketTable,
    label_column: &str,
    value_column: &str,
    title: &str,
    width: u16,
) -> Result<String, TableError> {
    let label_idx = table.column_index(label_column)?;
    let value_idx = table.column_index(value_column)?;
    if table.schema().columns()[value_idx].kind == ColumnKind::Text {
        return Err(TableError::NotNumeric(value_column.to_string()));
    }

    let bars: Vec<Bar> = table
        .records()
        .iter()
        .map(|r| {
            let value = r.cells[value_idx].as_f64().unwrap_or(0.0).max(0.0);
            Bar::default()
                .label(Line::from(r.cells[label_idx].to_string()))
                .value((value * VALUE_SCALE).round() as u64)
                .text_value(format!("{:.2}", value))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD))
        .label_style(Style::default().fg(Color::Gray))
        .style(Style::default().bg(Color::Black).fg(Color::White))
        .data(BarGroup::default().bars(&bars));

    // one row per bar plus the two border rows
    let height = u16::try_from(bars.len()).unwrap_or(u16::MAX).saturating_add(2);
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    chart.render(area, &mut buffer);

    let mut out = String::new();
    for y in area.top()..area.bottom() {
        let mut row = String::new();
        for x in area.left()..area.right() {
            row.push_str(buffer.get(x, y).symbol());
        }
        out.push_str(row.trim_end());
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, ColumnSpec, MarketRecord, Schema};
    use std::sync::Arc;

    fn volumes() -> MarketTable {
        let schema = Arc::new(Schema::new(vec![
            ColumnSpec::text("Exchange"),
            ColumnSpec::number("24h Volume (B USD)"),
        ]));
        let records = [("Uni", 2.5), ("Curve", 1.25), ("Pancake", 0.5)]
            .iter()
            .map(|(n, v)| MarketRecord {
                id: n.to_lowercase(),
                cells: vec![Cell::from(*n), Cell::Number(*v)],
                label: None,
            })
            .collect();
        MarketTable::new(schema, records)
    }

    #[test]
    fn renders_one_row_per_bar_plus_borders() {
        let out =
            render_bar_chart(&volumes(), "Exchange", "24h Volume (B USD)", "DEX 24h Volume", 60)
                .unwrap();
        assert_eq!(out.lines().count(), 5);
        assert!(out.lines().next().unwrap().contains("DEX 24h Volume"));
    }

    #[test]
    fn text_value_column_is_rejected() {
        let err = render_bar_chart(&volumes(), "Exchange", "Exchange", "x", 40).unwrap_err();
        assert_eq!(err, TableError::NotNumeric("Exchange".into()));
    }
}
