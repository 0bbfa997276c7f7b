// Radar widget: projects the two teams' metric polygons onto a Chart.
//
// The core hands over closed (angle, value) polygons; this widget scales
// each axis against the larger team's magnitude and projects to cartesian
// coordinates, angle 0 pointing up and increasing clockwise.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use crate::radar::RadarPair;
use crate::tui::ViewState;

/// Chart bounds; polygons are normalized into the unit circle.
const BOUND: f64 = 1.2;

/// Render the radar panel into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(view) = &state.matchup else {
        render_message(
            frame,
            area,
            "Compare two teams to see the radar view.",
            Color::DarkGray,
        );
        return;
    };

    let Some(pair) = &view.radar else {
        let message = view
            .radar_error
            .clone()
            .unwrap_or_else(|| "Radar view unavailable.".to_string());
        render_message(frame, area, &message, Color::Red);
        return;
    };

    let (points_a, points_b) = normalized_points(pair);

    let datasets = vec![
        Dataset::default()
            .name(pair.shapes[0].team.clone())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&points_a),
        Dataset::default()
            .name(pair.shapes[1].team.clone())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Magenta))
            .data(&points_b),
    ];

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(pair.axes.len() as u16)])
        .split(area);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Radar: {}", pair.axes.join(" / "))),
        )
        .x_axis(Axis::default().bounds([-BOUND, BOUND]))
        .y_axis(Axis::default().bounds([-BOUND, BOUND]));
    frame.render_widget(chart, sections[0]);

    frame.render_widget(axis_legend(pair), sections[1]);
}

/// Project both closed polygons into cartesian points.
///
/// Each axis is scaled by the larger of the two teams' magnitudes on that
/// axis, so the stronger team touches the unit circle and the weaker one
/// sits proportionally inside. Negative or zero values collapse to the
/// center rather than flipping across it.
pub fn normalized_points(pair: &RadarPair) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let axis_count = pair.axes.len();
    let denominators: Vec<f64> = (0..axis_count)
        .map(|i| {
            pair.shapes[0].points[i]
                .1
                .abs()
                .max(pair.shapes[1].points[i].1.abs())
        })
        .collect();

    let project = |points: &[(f64, f64)]| {
        points
            .iter()
            .enumerate()
            .map(|(i, &(angle, value))| {
                // The closing vertex repeats axis 0.
                let denom = denominators[i % axis_count];
                let r = if denom > 0.0 {
                    (value / denom).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                // Angle 0 points up, increasing clockwise.
                (r * angle.sin(), r * angle.cos())
            })
            .collect::<Vec<_>>()
    };

    (
        project(&pair.shapes[0].points),
        project(&pair.shapes[1].points),
    )
}

/// Per-axis legend lines: metric name with both raw values.
fn axis_legend(pair: &RadarPair) -> Paragraph<'static> {
    let lines: Vec<Line> = pair
        .axes
        .iter()
        .enumerate()
        .map(|(i, axis)| {
            Line::from(vec![
                Span::styled(
                    format!("{:<10}", axis),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format!("{:>8.1}", pair.shapes[0].points[i].1),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("{:>8.1}", pair.shapes[1].points[i].1),
                    Style::default().fg(Color::Magenta),
                ),
            ])
        })
        .collect();
    Paragraph::new(lines)
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(color).add_modifier(Modifier::DIM),
    )))
    .block(Block::default().borders(Borders::ALL).title("Radar"));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
