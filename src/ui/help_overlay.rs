//! Help overlay listing the converter key bindings

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::converter::centered_column;

const OVERLAY_WIDTH: u16 = 50;

/// Key bindings grouped by section
const SECTIONS: [(&str, &[(&str, &str)]); 2] = [
    (
        "Converter",
        &[
            ("Tab, ←/→", "Switch between UI and UR"),
            ("0-9 . ,", "Type the amount of units"),
            ("Backspace", "Delete last digit"),
            ("Enter", "Convert to pesos"),
        ],
    ),
    (
        "Other",
        &[
            ("h", "Last 30 days of quotations"),
            ("Esc", "Dismiss error / Quit"),
            ("?", "Toggle this help"),
            ("q", "Quit application"),
        ],
    ),
];

/// Renders the help overlay on top of the converter
pub fn render(frame: &mut Frame) {
    let lines = help_lines();
    // Content plus the two border rows
    let height = lines.len() as u16 + 2;
    let overlay_area = centered_box(OVERLAY_WIDTH, height, frame.area());

    frame.render_widget(Clear, overlay_area);

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(paragraph, overlay_area);
}

fn help_lines() -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (title, bindings) in SECTIONS {
        lines.push(Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.extend(bindings.iter().map(|(key, description)| {
            Line::from(vec![
                Span::styled(format!("  {:<12}", key), Style::default().fg(Color::Yellow)),
                Span::raw(*description),
            ])
        }));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "Press Esc or ? to close",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

/// Box of `width` x `height` centered in `area`, clamped to it
fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let column = centered_column(width, area);
    let height = height.min(area.height);
    Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..column
    }
}
