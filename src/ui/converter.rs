//! Converter screen rendering
//!
//! Renders the unit tabs, current quotation, amount input, result, the
//! dismissable alert and the optional history panel.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, HISTORY_DAYS};
use crate::convert::{format_pesos, format_rate};
use crate::data::{Quotation, UnitKind};
use crate::ui::widgets::RateSparkline;

/// Width of the converter card
const CARD_WIDTH: u16 = 64;

/// Renders the converter screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let card = centered_column(CARD_WIDTH, area);

    let alert_height = if app.alert.is_some() { 4 } else { 0 };
    let history_height = if app.history.is_some() { 5 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),              // Tabs
            Constraint::Length(3),              // Current value
            Constraint::Length(3),              // Amount input
            Constraint::Length(1),              // Calculate button
            Constraint::Length(3),              // Result
            Constraint::Length(alert_height),   // Alert
            Constraint::Length(history_height), // History
            Constraint::Min(0),
            Constraint::Length(1), // Help text
        ])
        .split(card);

    render_tabs(frame, app, chunks[0]);
    render_current_value(frame, app, chunks[1]);
    render_input(frame, app, chunks[2]);
    render_calculate_button(frame, app, chunks[3]);
    render_result(frame, app, chunks[4]);

    if let Some(message) = &app.alert {
        render_alert(frame, message, chunks[5]);
    }
    if let Some(history) = &app.history {
        render_history(frame, app.active_unit, history, chunks[6]);
    }

    render_help(frame, chunks[8]);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = UnitKind::ALL
        .iter()
        .map(|kind| Line::from(format!(" {} ", kind.label())))
        .collect();
    let selected = UnitKind::ALL
        .iter()
        .position(|kind| *kind == app.active_unit)
        .unwrap_or(0);

    let title = Line::from(vec![
        Span::raw(" Conversor Indexa"),
        Span::styled("+ ", Style::default().fg(Color::Blue)),
    ]);

    let tabs = Tabs::new(titles)
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        )
        .divider("│");

    frame.render_widget(tabs, area);
}

fn render_current_value(frame: &mut Frame, app: &App, area: Rect) {
    let value = match app.active_quotation() {
        Some(quotation) => match quotation.rate() {
            Some(rate) => Line::from(vec![
                Span::styled(format_rate(rate), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("  ({})", quotation.effective_date),
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
            None => Line::from(Span::styled(
                "Quotation has no value",
                Style::default().fg(Color::Yellow),
            )),
        },
        None => Line::from(Span::styled(
            "Not available",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let paragraph = Paragraph::new(value)
        .block(Block::default().borders(Borders::ALL).title(" Current value "));

    frame.render_widget(paragraph, area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let enabled = app.can_calculate();

    let content = if app.input.is_empty() {
        Span::styled("0", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(app.input.as_str())
    };
    let mut spans = vec![content];
    if enabled && !app.calculating {
        spans.push(Span::styled("▏", Style::default().fg(Color::Cyan)));
    }

    let border_style = if enabled {
        Style::default().fg(Color::Blue)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ", app.active_unit.units_label())),
    );

    frame.render_widget(paragraph, area);
}

fn render_calculate_button(frame: &mut Frame, app: &App, area: Rect) {
    let style = if app.can_calculate() {
        Style::default()
            .fg(Color::White)
            .bg(Color::Blue)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let paragraph = Paragraph::new(Span::styled(" Calculate [Enter] ", style))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn render_result(frame: &mut Frame, app: &App, area: Rect) {
    let content = if app.calculating {
        Span::styled("Calculating...", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            format_pesos(app.result),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    };

    let paragraph = Paragraph::new(Line::from(content)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Result in Uruguayan pesos "),
    );

    frame.render_widget(paragraph, area);
}

fn render_alert(frame: &mut Frame, message: &str, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Red))),
        Line::from(Span::styled(
            "Esc to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Error "),
    );

    frame.render_widget(paragraph, area);
}

fn render_history(frame: &mut Frame, kind: UnitKind, history: &[Quotation], area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} - last {} days ", kind, HISTORY_DAYS));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let values: Vec<f64> = history.iter().filter_map(Quotation::rate).collect();
    if values.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("No data", Style::default().fg(Color::DarkGray))),
            inner,
        );
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    frame.render_widget(RateSparkline::new(&values), rows[0]);

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let summary = Line::from(vec![
        Span::styled("min ", Style::default().fg(Color::DarkGray)),
        Span::raw(format_rate(min)),
        Span::styled("  max ", Style::default().fg(Color::DarkGray)),
        Span::raw(format_rate(max)),
    ]);
    frame.render_widget(Paragraph::new(summary), rows[1]);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let help_text = Line::from(vec![
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Unit  "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Calculate  "),
        Span::styled("h", Style::default().fg(Color::Yellow)),
        Span::raw(" History  "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" Help  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ]);
    let paragraph = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));

    frame.render_widget(paragraph, area);
}

/// Horizontally centered column of at most `width` cells
pub(super) fn centered_column(width: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}
