use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine, Points};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::radar::{RadarChart, RadarSeries, polar_to_unit_xy};

pub const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::LightRed,
    Color::LightBlue,
];

// Room around the unit circle for axis labels.
const EXTENT: f64 = 1.45;
const LABEL_RADIUS: f64 = 1.12;
const TICK_LABEL_ANGLE: f64 = std::f64::consts::PI / 6.0;
const MAX_LABEL_CHARS: usize = 22;
const FILL_STEPS: usize = 8;

pub fn series_color(slot: usize) -> Color {
    PALETTE[slot % PALETTE.len()]
}

/// Draws a `RadarChart` on a braille canvas with a legend underneath.
pub struct RadarCanvas<'a> {
    chart: &'a RadarChart,
    block: Option<Block<'a>>,
    fill: bool,
}

impl<'a> RadarCanvas<'a> {
    pub fn new(chart: &'a RadarChart) -> Self {
        Self {
            chart,
            block: None,
            fill: true,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }
}

impl Widget for RadarCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width < 8 || inner.height < 6 {
            return;
        }

        let legend_rows = (self.chart.series.len() as u16).min(inner.height / 3);
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(legend_rows)])
            .split(inner);
        let plot = parts[0];

        let (half_w, half_h) = fit_bounds(plot.width, plot.height);
        let cell_w = 2.0 * half_w / f64::from(plot.width.max(1));
        let chart = self.chart;
        let fill = self.fill;

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([-half_w, half_w])
            .y_bounds([-half_h, half_h])
            .paint(move |ctx| {
                draw_web(ctx, chart);
                ctx.layer();
                if fill {
                    for series in &chart.series {
                        let coords = stipple(series, chart.radial_max);
                        ctx.draw(&Points {
                            coords: &coords,
                            color: series_color(series.slot),
                        });
                    }
                    ctx.layer();
                }
                for series in &chart.series {
                    draw_outline(ctx, series, chart.radial_max);
                }
                ctx.layer();
                draw_labels(ctx, chart, cell_w);
            })
            .render(plot, buf);

        if legend_rows > 0 {
            legend(chart).render(parts[1], buf);
        }
    }
}

/// Half-extents that keep the web round given ~2:1 terminal cells.
fn fit_bounds(width: u16, height: u16) -> (f64, f64) {
    let ratio = f64::from(width.max(1)) / (2.0 * f64::from(height.max(1)));
    if ratio >= 1.0 {
        (EXTENT * ratio, EXTENT)
    } else {
        (EXTENT, EXTENT / ratio)
    }
}

fn draw_web(ctx: &mut Context, chart: &RadarChart) {
    let web = Color::DarkGray;
    for tick in &chart.ticks {
        let ring: Vec<(f64, f64)> = chart
            .axes
            .iter()
            .map(|axis| polar_to_unit_xy(axis.angle, *tick, chart.radial_max))
            .collect();
        for (i, (x1, y1)) in ring.iter().enumerate() {
            let (x2, y2) = ring[(i + 1) % ring.len()];
            ctx.draw(&CanvasLine {
                x1: *x1,
                y1: *y1,
                x2,
                y2,
                color: web,
            });
        }
    }
    for axis in &chart.axes {
        let (x, y) = polar_to_unit_xy(axis.angle, chart.radial_max, chart.radial_max);
        ctx.draw(&CanvasLine {
            x1: 0.0,
            y1: 0.0,
            x2: x,
            y2: y,
            color: web,
        });
    }
}

/// Edges touching a missing value are left out, leaving a gap.
fn draw_outline(ctx: &mut Context, series: &RadarSeries, max: f64) {
    let color = series_color(series.slot);
    for pair in series.points.windows(2) {
        let (Some((x1, y1)), Some((x2, y2))) = (pair[0].unit_xy(max), pair[1].unit_xy(max)) else {
            continue;
        };
        ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color,
        });
    }
}

/// Point cloud over each (centre, v_i, v_i+1) triangle; stands in for a
/// translucent fill.
fn stipple(series: &RadarSeries, max: f64) -> Vec<(f64, f64)> {
    let mut coords = Vec::new();
    for pair in series.points.windows(2) {
        let (Some(a), Some(b)) = (pair[0].unit_xy(max), pair[1].unit_xy(max)) else {
            continue;
        };
        for i in 0..=FILL_STEPS {
            for j in 0..=(FILL_STEPS - i) {
                let u = i as f64 / FILL_STEPS as f64;
                let v = j as f64 / FILL_STEPS as f64;
                coords.push((u * a.0 + v * b.0, u * a.1 + v * b.1));
            }
        }
    }
    coords
}

fn draw_labels(ctx: &mut Context, chart: &RadarChart, cell_w: f64) {
    for tick in &chart.ticks {
        let (x, y) = polar_to_unit_xy(TICK_LABEL_ANGLE, *tick, chart.radial_max);
        ctx.print(
            x,
            y,
            Line::styled(format!("{tick:.0}"), Style::default().fg(Color::DarkGray)),
        );
    }
    for axis in &chart.axes {
        let label = truncate_label(&axis.label);
        let x = LABEL_RADIUS * axis.angle.sin();
        let y = LABEL_RADIUS * axis.angle.cos();
        let width = label.chars().count() as f64 * cell_w;
        let x = if x < -0.1 {
            x - width
        } else if x <= 0.1 {
            x - width / 2.0
        } else {
            x
        };
        ctx.print(x, y, Line::styled(label, Style::default().fg(Color::Gray)));
    }
}

fn truncate_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        return label.to_string();
    }
    let mut out: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
    out.push('…');
    out
}

fn legend(chart: &RadarChart) -> Paragraph<'static> {
    let lines: Vec<Line<'static>> = chart
        .series
        .iter()
        .map(|series| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(series_color(series.slot))),
                Span::raw(series.player.clone()),
            ])
        })
        .collect();
    Paragraph::new(lines)
}
