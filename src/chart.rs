//! Inline line charts: a ratatui `Chart` rendered into an off-screen buffer
//! and printed to stdout row by row.

use crate::calendar::{moving_average, TREND_WINDOW};
use console::style;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget};

pub const MAX_WIDTH: u16 = 120;
const MAX_X_LABELS: usize = 20;

#[derive(Debug, Clone)]
pub struct LineSeries {
    pub name: String,
    pub color: Color,
    pub values: Vec<f64>,
    /// Trend lines are drawn with half blocks so they stand out from the data.
    pub trend: bool,
}

impl LineSeries {
    pub fn new(name: impl Into<String>, color: Color, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            color,
            values,
            trend: false,
        }
    }

    /// The 6-point moving average of `values`, if there are enough points.
    pub fn trend_of(values: &[f64], color: Color) -> Option<Self> {
        moving_average(values, TREND_WINDOW).map(|smoothed| Self {
            name: format!("{TREND_WINDOW}-month trend"),
            color,
            values: smoothed,
            trend: true,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub labels: Vec<String>,
    pub series: Vec<LineSeries>,
    pub width: u16,
    pub height: u16,
}

impl ChartSpec {
    pub fn new(title: impl Into<String>, y_title: impl Into<String>, labels: Vec<String>, height: u16) -> Self {
        Self {
            title: title.into(),
            x_title: "Timeline".to_string(),
            y_title: y_title.into(),
            labels,
            series: Vec::new(),
            width: terminal_width(),
            height,
        }
    }

    pub fn series(mut self, series: LineSeries) -> Self {
        self.series.push(series);
        self
    }

    pub fn maybe_series(mut self, series: Option<LineSeries>) -> Self {
        self.series.extend(series);
        self
    }
}

pub fn terminal_width() -> u16 {
    crossterm::terminal::size()
        .map(|(w, _)| w.min(MAX_WIDTH))
        .unwrap_or(MAX_WIDTH)
}

/// Evenly spaced (index, label) picks, at most `max` of them.
fn axis_labels(labels: &[String], max: usize) -> Vec<&str> {
    if labels.len() <= max {
        return labels.iter().map(String::as_str).collect();
    }
    let last = labels.len() - 1;
    (0..max)
        .map(|i| labels[i * last / (max - 1)].as_str())
        .collect()
}

pub fn render(spec: &ChartSpec) -> Buffer {
    let area = Rect::new(0, 0, spec.width.max(20), spec.height.max(8));
    let mut buf = Buffer::empty(area);

    let points: Vec<Vec<(f64, f64)>> = spec
        .series
        .iter()
        .map(|s| {
            s.values
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64, *v))
                .collect()
        })
        .collect();

    let datasets: Vec<Dataset> = spec
        .series
        .iter()
        .zip(points.iter())
        .map(|(s, data)| {
            Dataset::default()
                .name(s.name.clone())
                .marker(if s.trend { Marker::HalfBlock } else { Marker::Braille })
                .graph_type(GraphType::Line)
                .style(Style::default().fg(s.color))
                .data(data)
        })
        .collect();

    let max_x = spec
        .series
        .iter()
        .map(|s| s.values.len())
        .max()
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1) as f64;
    let max_y = spec
        .series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(0.0_f64, f64::max);
    let top = if max_y > 0.0 { max_y * 1.1 } else { 1.0 };

    let x_labels: Vec<Span> = axis_labels(&spec.labels, MAX_X_LABELS.min((area.width / 8) as usize).max(2))
        .into_iter()
        .map(|l| Span::raw(l.to_string()))
        .collect();
    let y_labels = vec![
        Span::raw("0"),
        Span::raw(format!("{:.1}", top / 2.0)),
        Span::raw(format!("{:.1}", top)),
    ];

    Chart::new(datasets)
        .block(
            Block::default()
                .title(spec.title.clone())
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title(spec.x_title.clone())
                .bounds([0.0, max_x])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(spec.y_title.clone())
                .bounds([0.0, top])
                .labels(y_labels),
        )
        .render(area, &mut buf);

    buf
}

/// Buffer rows as strings, coloured through `console` when `color` is set.
pub fn buffer_lines(buf: &Buffer, color: bool) -> Vec<String> {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            let mut line = String::new();
            for x in area.left()..area.right() {
                let cell = buf.get(x, y);
                if color {
                    line.push_str(&paint(cell.symbol(), cell.fg));
                } else {
                    line.push_str(cell.symbol());
                }
            }
            line.trim_end().to_string()
        })
        .collect()
}

fn paint(symbol: &str, fg: Color) -> String {
    let styled = style(symbol);
    let styled = match fg {
        Color::Red | Color::LightRed => styled.red(),
        Color::Green | Color::LightGreen => styled.green(),
        Color::Yellow | Color::LightYellow => styled.yellow(),
        Color::Blue | Color::LightBlue => styled.blue(),
        Color::Magenta | Color::LightMagenta => styled.magenta(),
        Color::Cyan | Color::LightCyan => styled.cyan(),
        Color::Gray | Color::DarkGray => styled.dim(),
        _ => styled,
    };
    styled.to_string()
}

pub fn print(spec: &ChartSpec) {
    let buf = render(spec);
    for line in buffer_lines(&buf, console::colors_enabled()) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("M{i}")).collect()
    }

    #[test]
    fn axis_labels_are_evenly_spaced() {
        let all = labels(5);
        assert_eq!(axis_labels(&all, 20), vec!["M0", "M1", "M2", "M3", "M4"]);

        let many = labels(41);
        let picked = axis_labels(&many, 5);
        assert_eq!(picked, vec!["M0", "M10", "M20", "M30", "M40"]);
    }

    #[test]
    fn trend_needs_six_points() {
        assert!(LineSeries::trend_of(&[1.0, 2.0, 3.0], Color::Green).is_none());
        let trend = LineSeries::trend_of(&[1.0; 8], Color::Green).unwrap();
        assert!(trend.trend);
        assert_eq!(trend.values.len(), 8);
        assert_eq!(trend.name, "6-month trend");
    }

    #[test]
    fn renders_title_and_plot() {
        let mut spec = ChartSpec::new("Monthly Productivity", "Avg", labels(8), 20)
            .series(LineSeries::new("avg", Color::Cyan, vec![1.0, 3.0, 2.0, 5.0, 4.0, 6.0, 2.0, 3.0]));
        spec.width = 80;

        let buf = render(&spec);
        assert_eq!(buf.area.width, 80);
        assert_eq!(buf.area.height, 20);

        let lines = buffer_lines(&buf, false);
        assert_eq!(lines.len(), 20);
        assert!(lines[0].contains("Monthly Productivity"));
        let braille = lines
            .iter()
            .flat_map(|l| l.chars())
            .filter(|c| ('\u{2801}'..='\u{28FF}').contains(c))
            .count();
        assert!(braille > 0, "expected braille points in:\n{}", lines.join("\n"));
    }
}
