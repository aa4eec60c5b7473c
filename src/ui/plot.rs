use eframe::egui::epaint::{CubicBezierShape, TextShape};
use eframe::egui::{
    self, Align, Align2, Color32, FontId, Pos2, Rect, RichText, Sense, StrokeKind, Ui, Vec2, emath::Rot2,
};

use crate::chart::scene::{Anchor, Baseline, Point, Primitive, Scene, Segment, Stroke};
use crate::chart::ChartError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Chart view (central panel)
// ---------------------------------------------------------------------------

/// Render the active chart in the central panel.
pub fn chart_view(ui: &mut Ui, state: &AppState) {
    match state.scene(state.active_chart) {
        Ok(scene) => paint_scene(ui, &scene),
        Err(ChartError::NoData(_)) if state.raw.is_none() => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a data file to draw the charts  (File → Open…)");
            });
        }
        Err(e) => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label(RichText::new(e.to_string()).color(Color32::RED));
            });
        }
    }
}

/// Maps scene pixels into the allocated screen rectangle, keeping the
/// scene's aspect ratio.
struct Viewport {
    origin: Pos2,
    scale: f32,
}

impl Viewport {
    fn fit(rect: Rect, scene: &Scene) -> Self {
        let scale = (rect.width() / scene.width as f32)
            .min(rect.height() / scene.height as f32)
            .max(0.1);
        let size = Vec2::new(scene.width as f32, scene.height as f32) * scale;
        Self {
            origin: rect.center() - size / 2.0,
            scale,
        }
    }

    fn pos(&self, p: Point) -> Pos2 {
        self.origin + Vec2::new(p.x as f32, p.y as f32) * self.scale
    }

    fn stroke(&self, stroke: &Stroke) -> egui::Stroke {
        egui::Stroke::new(stroke.width * self.scale, stroke.color)
    }
}

pub fn paint_scene(ui: &mut Ui, scene: &Scene) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
    let view = Viewport::fit(response.rect, scene);

    let page = Rect::from_min_max(
        view.pos(Point::new(0.0, 0.0)),
        view.pos(Point::new(scene.width, scene.height)),
    );
    painter.rect_filled(page, 0.0, Color32::WHITE);

    for primitive in &scene.primitives {
        match primitive {
            Primitive::Line { from, to, stroke } => {
                painter.line_segment([view.pos(*from), view.pos(*to)], view.stroke(stroke));
            }
            Primitive::Rect {
                min,
                width,
                height,
                fill,
                stroke,
            } => {
                let rect = Rect::from_min_size(
                    view.pos(*min),
                    Vec2::new(*width as f32, *height as f32) * view.scale,
                );
                if let Some(fill) = fill {
                    painter.rect_filled(rect, 0.0, *fill);
                }
                if let Some(stroke) = stroke {
                    painter.rect_stroke(rect, 0.0, view.stroke(stroke), StrokeKind::Middle);
                }
            }
            Primitive::Circle {
                center,
                radius,
                fill,
            } => {
                painter.circle_filled(view.pos(*center), *radius as f32 * view.scale, *fill);
            }
            Primitive::Text {
                pos,
                text,
                anchor,
                baseline,
                rotation,
                size,
                color,
            } => {
                let align = Align2([
                    match anchor {
                        Anchor::Start => Align::Min,
                        Anchor::Middle => Align::Center,
                        Anchor::End => Align::Max,
                    },
                    match baseline {
                        Baseline::Top => Align::Min,
                        Baseline::Middle => Align::Center,
                        Baseline::Bottom => Align::Max,
                    },
                ]);
                let font = FontId::proportional(size * view.scale);
                if *rotation == 0.0 {
                    painter.text(view.pos(*pos), align, text, font, *color);
                } else {
                    // TextShape rotates about its top-left corner.
                    let galley = painter.layout_no_wrap(text.clone(), font, *color);
                    let offset = Vec2::new(
                        galley.size().x * align.x().to_factor(),
                        galley.size().y * align.y().to_factor(),
                    );
                    let angle = (*rotation as f32).to_radians();
                    let top_left = view.pos(*pos) - Rot2::from_angle(angle) * offset;
                    painter.add(TextShape::new(top_left, galley, *color).with_angle(angle));
                }
            }
            Primitive::Path {
                start,
                segments,
                stroke,
            } => {
                let stroke = view.stroke(stroke);
                let mut current = view.pos(*start);
                for segment in segments {
                    match segment {
                        Segment::LineTo(p) => {
                            let next = view.pos(*p);
                            painter.line_segment([current, next], stroke);
                            current = next;
                        }
                        Segment::CubicTo(c1, c2, end) => {
                            let next = view.pos(*end);
                            painter.add(CubicBezierShape::from_points_stroke(
                                [current, view.pos(*c1), view.pos(*c2), next],
                                false,
                                Color32::TRANSPARENT,
                                stroke,
                            ));
                            current = next;
                        }
                    }
                }
            }
        }
    }
}
