use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Painter, Shape},
        Block,
    },
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::ui::theme::{to_color, to_rgba};
use crate::wheel::geometry::normalize;
use crate::wheel::{DisplayList, DrawCommand, Rgba, Sector, Surface};

/// Visible extent of the wheel in world units. The canvas keeps terminal
/// cells (about twice as tall as wide) from squashing the circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub half_width: f64,
    pub half_height: f64,
    /// World units covered by one sample of the half-block grid.
    pub step: f64,
}

impl Viewport {
    pub fn fit(size: f64, cols: u16, rows: u16) -> Self {
        let half = size / 2.0;
        let cols = cols.max(1) as f64;
        let rows = rows.max(1) as f64;

        let (half_width, half_height) = if cols >= 2.0 * rows {
            (half * cols / (2.0 * rows), half)
        } else {
            (half, half * 2.0 * rows / cols)
        };

        Self {
            half_width,
            half_height,
            step: 2.0 * half_width / cols,
        }
    }

    /// World width of one terminal column.
    fn column_width(&self) -> f64 {
        self.step
    }

    /// World height of one terminal row.
    fn row_height(&self) -> f64 {
        self.step * 2.0
    }
}

/// Color of the wheel at a point in wheel-local coordinates (y down), or
/// `None` outside every shape.
pub fn color_at(commands: &[DrawCommand], x: f64, y: f64, background: Rgba, stroke: f64) -> Option<Rgba> {
    let distance = (x * x + y * y).sqrt();
    let angle = normalize(y.atan2(x));
    let mut painted: Option<Rgba> = None;

    for command in commands {
        match command {
            DrawCommand::FillSector { sector, color } => {
                if distance <= sector.radius && contains_angle(sector, angle) {
                    painted = Some(color.flatten(painted.unwrap_or(background)));
                }
            }
            DrawCommand::StrokeSector { sector, color, width } => {
                if on_outline(sector, x, y, distance, angle, stroke.max(*width)) {
                    painted = Some(color.flatten(painted.unwrap_or(background)));
                }
            }
            DrawCommand::FillCircle { radius, color } => {
                if distance <= *radius {
                    painted = Some(color.flatten(painted.unwrap_or(background)));
                }
            }
            DrawCommand::Text(_) => {}
        }
    }

    painted
}

fn contains_angle(sector: &Sector, angle: f64) -> bool {
    let span = sector.end - sector.start;
    span >= std::f64::consts::TAU || normalize(angle - sector.start) < span
}

fn on_outline(sector: &Sector, x: f64, y: f64, distance: f64, angle: f64, width: f64) -> bool {
    if distance > sector.radius + width / 2.0 {
        return false;
    }
    if (distance - sector.radius).abs() <= width / 2.0 && contains_angle(sector, angle) {
        return true;
    }
    if sector.end - sector.start >= std::f64::consts::TAU {
        return false;
    }

    // Distance to each radial edge
    [sector.start, sector.end].iter().any(|edge| {
        let (dx, dy) = (edge.cos(), edge.sin());
        let along = x * dx + y * dy;
        along >= 0.0 && along <= sector.radius && (x * dy - y * dx).abs() <= width / 2.0
    })
}

/// Canvas shape that rasterizes a recorded wheel render.
struct WheelShape<'a> {
    list: &'a DisplayList,
    viewport: Viewport,
    background: Rgba,
}

impl Shape for WheelShape<'_> {
    fn draw(&self, painter: &mut Painter) {
        let commands = self.list.commands();
        let step = self.viewport.step;
        let stroke = step;
        let limit = self.list.size() / 2.0;
        if !(step > 0.0 && step.is_finite() && limit > 0.0 && limit.is_finite()) {
            return;
        }

        let mut y = -limit;
        while y <= limit {
            let mut x = -limit;
            while x <= limit {
                if let Some(color) = color_at(commands, x, y, self.background, stroke) {
                    // Canvas y grows upwards
                    if let Some((px, py)) = painter.get_point(x, -y) {
                        painter.paint(px, py, to_color(color));
                    }
                }
                x += step;
            }
            y += step;
        }
    }
}

/// Draw a wheel with its pointer at the top of `area`.
pub fn render(
    f: &mut Frame,
    area: Rect,
    list: &DisplayList,
    block: Block,
    background: Color,
    pointer: Color,
) {
    let inner = block.inner(area);
    let viewport = Viewport::fit(list.size(), inner.width, inner.height);
    let shape = WheelShape {
        list,
        viewport,
        background: to_rgba(background),
    };
    let top = list.size() / 2.0;

    let canvas = Canvas::default()
        .block(block)
        .background_color(background)
        .marker(Marker::HalfBlock)
        .x_bounds([-viewport.half_width, viewport.half_width])
        .y_bounds([-viewport.half_height, viewport.half_height])
        .paint(|ctx| {
            ctx.draw(&shape);
            ctx.layer();

            for text in list.texts() {
                let count = text.lines.len() as f64;
                for (i, line) in text.lines.iter().enumerate() {
                    let width = line.width() as f64 * viewport.column_width();
                    let offset = (i as f64 - (count - 1.0) / 2.0) * viewport.row_height();
                    ctx.print(
                        text.x - width / 2.0,
                        -(text.y + offset),
                        Span::styled(
                            line.clone(),
                            Style::default()
                                .fg(to_color(text.color))
                                .add_modifier(Modifier::BOLD),
                        ),
                    );
                }
            }

            ctx.print(
                -viewport.column_width() / 2.0,
                (top + viewport.row_height() / 2.0).min(viewport.half_height),
                Span::styled("▼", Style::default().fg(pointer).add_modifier(Modifier::BOLD)),
            );
        });

    f.render_widget(canvas, area);
}
