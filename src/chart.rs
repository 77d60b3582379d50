//! Rate history chart.
//!
//! Draws the display history as a polyline across the full width of a
//! raster surface, plus a dashed reference line at the target rate. The
//! vertical scale always spans at least `[0, TARGET_RATE]`.

use crate::error::ChartError;
use crate::quality::TARGET_RATE;
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

/// Default chart width in logical pixels.
pub const CHART_WIDTH: u32 = 800;

/// Default chart height in logical pixels.
pub const CHART_HEIGHT: u32 = 100;

/// An RGBA colour with 8-bit channels and straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Stroke parameters for one path.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgba,
    pub width: f64,
    /// `(on, off)` lengths in pixels; `None` strokes a solid line.
    pub dash: Option<(f64, f64)>,
}

/// Rate polyline: `#00ff88`, 2 px.
pub const RATE_LINE_STYLE: StrokeStyle = StrokeStyle {
    color: Rgba::new(0x00, 0xff, 0x88, 0xff),
    width: 2.0,
    dash: None,
};

/// Target reference line: white at 30% alpha, dashed 5/5, 1 px.
pub const TARGET_LINE_STYLE: StrokeStyle = StrokeStyle {
    color: Rgba::new(0xff, 0xff, 0xff, 77),
    width: 1.0,
    dash: Some((5.0, 5.0)),
};

/// A raster target the chart can be drawn onto.
pub trait ChartSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Reset every pixel to transparent.
    fn clear(&mut self);
    /// Stroke a connected path through `points`.
    fn stroke_path(&mut self, points: &[(f64, f64)], style: &StrokeStyle);
}

/// Chart geometry computed from a display history.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGeometry {
    /// One point per sample, evenly spaced by index.
    pub line: Vec<(f64, f64)>,
    /// Vertical position of the target rate.
    pub target_y: f64,
}

/// Compute the chart geometry, `None` with fewer than two samples.
pub fn chart_geometry(history: &[u32], width: f64, height: f64) -> Option<ChartGeometry> {
    if history.len() < 2 {
        return None;
    }

    let max = history.iter().copied().fold(TARGET_RATE, u32::max);
    let min = history.iter().copied().fold(0, u32::min);
    let range = match max - min {
        0 => 1.0,
        r => f64::from(r),
    };
    let scale_y = |value: u32| height - (f64::from(value) - f64::from(min)) / range * height;

    let last = (history.len() - 1) as f64;
    let line = history
        .iter()
        .enumerate()
        .map(|(i, &rate)| (i as f64 / last * width, scale_y(rate)))
        .collect();

    Some(ChartGeometry {
        line,
        target_y: scale_y(TARGET_RATE),
    })
}

/// Redraw the rate chart from scratch.
///
/// The surface is always cleared; nothing else is drawn with fewer than
/// two samples.
pub fn render_rate_chart<S: ChartSurface + ?Sized>(surface: &mut S, history: &[u32]) {
    surface.clear();

    let width = f64::from(surface.width());
    let height = f64::from(surface.height());
    let Some(geometry) = chart_geometry(history, width, height) else {
        return;
    };

    surface.stroke_path(&geometry.line, &RATE_LINE_STYLE);
    surface.stroke_path(
        &[(0.0, geometry.target_y), (width, geometry.target_y)],
        &TARGET_LINE_STYLE,
    );
}

/// In-memory RGBA canvas backed by a `tiny_skia::Pixmap`.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    pixmap: Pixmap,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Result<Self, ChartError> {
        let pixmap =
            Pixmap::new(width, height).ok_or(ChartError::InvalidSize { width, height })?;
        Ok(Self { pixmap })
    }

    /// Canvas at the default chart size.
    pub fn chart() -> Result<Self, ChartError> {
        Self::new(CHART_WIDTH, CHART_HEIGHT)
    }

    /// Pixel at `(x, y)` with straight alpha, `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgba::new(c.red(), c.green(), c.blue(), c.alpha()))
    }

    /// Premultiplied RGBA bytes in row-major order.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Whether every pixel is transparent.
    pub fn is_blank(&self) -> bool {
        self.pixmap.data().iter().all(|&b| b == 0)
    }
}

impl ChartSurface for RasterCanvas {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    fn stroke_path(&mut self, points: &[(f64, f64)], style: &StrokeStyle) {
        let Some(((x0, y0), rest)) = points.split_first() else {
            return;
        };
        let mut builder = PathBuilder::new();
        builder.move_to(*x0 as f32, *y0 as f32);
        for &(x, y) in rest {
            builder.line_to(x as f32, y as f32);
        }
        // A single point yields no path
        let Some(path) = builder.finish() else {
            return;
        };

        let mut paint = Paint::default();
        let Rgba { r, g, b, a } = style.color;
        paint.set_color(Color::from_rgba8(r, g, b, a));
        paint.anti_alias = true;

        let stroke = Stroke {
            width: style.width as f32,
            dash: style
                .dash
                .and_then(|(on, off)| StrokeDash::new(vec![on as f32, off as f32], 0.0)),
            ..Stroke::default()
        };

        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}
