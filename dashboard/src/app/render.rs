use super::state::*;
use hbdm::OrderRecord;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame,
};

/// Rows shown in the order table; the exchange may return more.
const ORDER_ROWS: usize = 20;

pub fn draw(f: &mut Frame, state: &AppState) {
    let area = f.area();

    if state.orders_enabled() {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(10),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(8),
            ])
            .split(area);

        draw_title(f, state, vertical[0]);
        draw_charts(f, state, vertical[1]);
        draw_forms(f, state, vertical[2]);
        draw_status(f, state, vertical[3]);
        draw_orders(f, &state.orders, vertical[4]);
    } else {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(area);

        draw_title(f, state, vertical[0]);
        draw_charts(f, state, vertical[1]);
        draw_status(f, state, vertical[2]);
    }
}

fn draw_title(f: &mut Frame, state: &AppState, area: Rect) {
    let keys = if state.orders_enabled() {
        "q quit | Tab field | b buy | s sell | r refresh"
    } else {
        "q quit | r refresh"
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", state.symbol),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "[{}] {}  live {}/{}  ",
            state.profile.as_str(),
            format_ts_local(state.now_unix),
            state.live.len(),
            state.live.capacity(),
        )),
        Span::styled(keys, Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_charts(f: &mut Frame, state: &AppState, area: Rect) {
    if state.charts.is_empty() {
        let live = state.live.chart_data();
        draw_line_chart(f, " Live ", &live, Color::Yellow, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let live = state.live.chart_data();
    draw_line_chart(f, " Live ", &live, Color::Yellow, rows[0]);

    let n = state.charts.len() as u32;
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(state.charts.iter().map(|_| Constraint::Ratio(1, n)))
        .split(rows[1]);

    for (chart, col) in state.charts.iter().zip(cols.iter()) {
        let title = match chart.rebuilt_at {
            Some(ts) => format!(
                " {} x{} @ {} ",
                chart.spec.interval,
                chart.spec.count,
                format_ts_local(ts)
            ),
            None => format!(" {} x{} ", chart.spec.interval, chart.spec.count),
        };
        let data = chart.chart_data();
        draw_line_chart(f, &title, &data, Color::Cyan, *col);
    }
}

/// Min/max of x and y, widened so a flat series still gets a visible range.
fn bounds(data: &[(f64, f64)]) -> Option<([f64; 2], [f64; 2])> {
    let first = data.first()?;
    let (mut x0, mut x1, mut y0, mut y1) = (first.0, first.0, first.1, first.1);
    for &(x, y) in data {
        x0 = x0.min(x);
        x1 = x1.max(x);
        y0 = y0.min(y);
        y1 = y1.max(y);
    }
    if x1 <= x0 {
        x1 = x0 + 1.0;
    }
    if y1 <= y0 {
        let pad = (y0.abs() * 0.001).max(0.01);
        y0 -= pad;
        y1 += pad;
    }
    Some(([x0, x1], [y0, y1]))
}

fn draw_line_chart(f: &mut Frame, title: &str, data: &[(f64, f64)], color: Color, area: Rect) {
    let block = Block::default()
        .title(Span::styled(
            title.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);

    let Some((xb, yb)) = bounds(data) else {
        f.render_widget(block, area);
        return;
    };

    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(data);

    let x_axis = Axis::default().bounds(xb).labels(vec![
        Span::raw(format_ts_local(xb[0] as i64)),
        Span::raw(format_ts_local(xb[1] as i64)),
    ]);
    let y_axis = Axis::default().bounds(yb).labels(vec![
        Span::raw(format!("{:.2}", yb[0])),
        Span::raw(format!("{:.2}", yb[1])),
    ]);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis);
    f.render_widget(chart, area);
}

fn draw_forms(f: &mut Frame, state: &AppState, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let forms = [
        (" BUY (b) ", [Field::BuyPrice, Field::BuyQuantity], Color::Green),
        (" SELL (s) ", [Field::SellPrice, Field::SellQuantity], Color::Red),
    ];

    for ((title, fields, color), half) in forms.into_iter().zip(halves.iter()) {
        let mut spans = Vec::new();
        for field in fields {
            let focused = state.focus == field;
            let style = if focused {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            spans.push(Span::raw(format!(" {}: ", field.label())));
            spans.push(Span::styled(format!("{:<12}", state.field(field)), style));
        }
        let widget = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .title(Span::styled(title, Style::default().fg(color)))
                .borders(Borders::ALL),
        );
        f.render_widget(widget, *half);
    }
}

fn draw_status(f: &mut Frame, state: &AppState, area: Rect) {
    let mut spans = vec![Span::raw(state.status_line.clone())];
    if let Some(err) = &state.last_error {
        if !state.status_line.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(err.clone(), Style::default().fg(Color::Red)));
    }
    let widget = Paragraph::new(Line::from(spans))
        .block(Block::default().title(" Status ").borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn order_row(o: &OrderRecord) -> Row<'static> {
    let id = o.order_id_str.clone().unwrap_or_else(|| o.order_id.to_string());
    let price = o.price.map(|p| format!("{p:.2}")).unwrap_or_else(|| "-".to_string());
    let avg = o
        .trade_avg_price
        .map(|p| format!("{p:.2}"))
        .unwrap_or_else(|| "-".to_string());
    let side_style = if o.direction.eq_ignore_ascii_case("buy") {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };
    Row::new(vec![
        Cell::from(format_ms_local(o.create_date)),
        Cell::from(id),
        Cell::from(o.contract_code.clone().unwrap_or_else(|| o.symbol.clone())),
        Cell::from(format!("{}/{}", o.direction, o.offset)).style(side_style),
        Cell::from(price),
        Cell::from(format!("{}/{}", o.trade_volume, o.volume)),
        Cell::from(avg),
        Cell::from(o.status.to_string()),
    ])
}

fn draw_orders(f: &mut Frame, orders: &[OrderRecord], area: Rect) {
    let header = Row::new(vec!["time", "id", "contract", "side", "price", "filled", "avg", "status"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = orders.iter().take(ORDER_ROWS).map(order_row).collect();
    let widths = [
        Constraint::Length(15),
        Constraint::Length(20),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Length(10),
        Constraint::Length(6),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().title(" Orders ").borders(Borders::ALL));
    f.render_widget(table, area);
}
