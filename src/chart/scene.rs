use eframe::egui::Color32;

use super::scale::{BandScale, LinearScale};
use crate::config::ChartConfig;

const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;
const TICK_FONT: f32 = 10.0;
const LABEL_FONT: f32 = 12.0;

// ---------------------------------------------------------------------------
// Drawing primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color32,
    pub width: f32,
}

impl Stroke {
    pub const fn new(width: f32, color: Color32) -> Self {
        Self { color, width }
    }
}

/// Horizontal text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

/// Vertical text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baseline {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    LineTo(Point),
    /// Two control points, then the end point.
    CubicTo(Point, Point, Point),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Rect {
        min: Point,
        width: f64,
        height: f64,
        fill: Option<Color32>,
        stroke: Option<Stroke>,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Color32,
    },
    Text {
        pos: Point,
        text: String,
        anchor: Anchor,
        baseline: Baseline,
        /// Degrees, clockwise (SVG convention).
        rotation: f64,
        size: f32,
        color: Color32,
    },
    Path {
        start: Point,
        segments: Vec<Segment>,
        stroke: Stroke,
    },
}

/// Drawing instructions for one chart, in pixel coordinates with the
/// origin at the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub primitives: Vec<Primitive>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            primitives: Vec::new(),
        }
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.push(Primitive::Line { from, to, stroke });
    }

    pub fn text(&mut self, pos: Point, text: impl Into<String>, anchor: Anchor, baseline: Baseline) {
        self.push(Primitive::Text {
            pos,
            text: text.into(),
            anchor,
            baseline,
            rotation: 0.0,
            size: LABEL_FONT,
            color: Color32::BLACK,
        });
    }

    /// All text primitives, in drawing order.
    #[cfg(test)]
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    // -- Axes --

    /// Category axis below the plot at height `y`, one tick per band centre.
    pub fn axis_bottom(&mut self, scale: &BandScale, y: f64, rotation: f64) {
        let stroke = Stroke::new(1.0, Color32::BLACK);
        let (r0, r1) = scale.range();
        self.push(Primitive::Path {
            start: Point::new(r0, y + TICK_SIZE),
            segments: vec![
                Segment::LineTo(Point::new(r0, y)),
                Segment::LineTo(Point::new(r1, y)),
                Segment::LineTo(Point::new(r1, y + TICK_SIZE)),
            ],
            stroke,
        });

        for key in scale.domain() {
            let Some(x) = scale.center(key) else {
                continue;
            };
            self.line(Point::new(x, y), Point::new(x, y + TICK_SIZE), stroke);
            let (anchor, baseline) = if rotation == 0.0 {
                (Anchor::Middle, Baseline::Top)
            } else {
                (Anchor::End, Baseline::Middle)
            };
            self.push(Primitive::Text {
                pos: Point::new(x, y + TICK_SIZE + TICK_PADDING),
                text: key.clone(),
                anchor,
                baseline,
                rotation,
                size: TICK_FONT,
                color: Color32::BLACK,
            });
        }
    }

    /// Value axis left of the plot at `x`.
    pub fn axis_left(&mut self, scale: &LinearScale, x: f64, count: usize) {
        let stroke = Stroke::new(1.0, Color32::BLACK);
        let (r0, r1) = scale.range();
        self.push(Primitive::Path {
            start: Point::new(x - TICK_SIZE, r0),
            segments: vec![
                Segment::LineTo(Point::new(x, r0)),
                Segment::LineTo(Point::new(x, r1)),
                Segment::LineTo(Point::new(x - TICK_SIZE, r1)),
            ],
            stroke,
        });

        for value in scale.ticks(count) {
            let y = scale.apply(value);
            self.line(Point::new(x - TICK_SIZE, y), Point::new(x, y), stroke);
            self.push(Primitive::Text {
                pos: Point::new(x - TICK_SIZE - TICK_PADDING, y),
                text: scale.tick_format(count, value),
                anchor: Anchor::End,
                baseline: Baseline::Middle,
                rotation: 0.0,
                size: TICK_FONT,
                color: Color32::BLACK,
            });
        }
    }

    /// Axis titles: x centred under the plot, y rotated along the left edge.
    pub fn axis_labels(&mut self, cfg: &ChartConfig) {
        if !cfg.x_label.is_empty() {
            self.text(
                Point::new(cfg.width / 2.0, cfg.height - 10.0),
                &cfg.x_label,
                Anchor::Middle,
                Baseline::Bottom,
            );
        }
        if !cfg.y_label.is_empty() {
            self.push(Primitive::Text {
                pos: Point::new(18.0, cfg.height / 2.0),
                text: cfg.y_label.clone(),
                anchor: Anchor::Middle,
                baseline: Baseline::Middle,
                rotation: -90.0,
                size: LABEL_FONT,
                color: Color32::BLACK,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_axis_ticks_at_band_centres() {
        let scale = BandScale::new(vec!["a".into(), "b".into()], (0.0, 100.0));
        let mut scene = Scene::new(100.0, 50.0);
        scene.axis_bottom(&scale, 40.0, 0.0);

        let tick_xs: Vec<f64> = scene
            .primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Line { from, .. } => Some(from.x),
                _ => None,
            })
            .collect();
        assert_eq!(tick_xs, vec![25.0, 75.0]);
        assert_eq!(scene.texts().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn left_axis_labels_every_tick() {
        let scale = LinearScale::new((0.0, 1000.0), (340.0, 30.0));
        let mut scene = Scene::new(700.0, 400.0);
        scene.axis_left(&scale, 60.0, 5);
        let labels: Vec<&str> = scene.texts().collect();
        assert_eq!(labels, ["0", "200", "400", "600", "800", "1,000"]);
    }

    #[test]
    fn axis_labels_skip_empty_titles() {
        let cfg = ChartConfig {
            y_label: String::new(),
            ..ChartConfig::boxplot()
        };
        let mut scene = Scene::new(cfg.width, cfg.height);
        scene.axis_labels(&cfg);
        assert_eq!(scene.texts().collect::<Vec<_>>(), ["Age Group"]);
    }
}
