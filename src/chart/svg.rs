use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use super::scene::{Anchor, Baseline, Point, Primitive, Scene, Segment, Stroke};
use crate::color::to_hex;

// ---------------------------------------------------------------------------
// Scene → standalone SVG document
// ---------------------------------------------------------------------------

pub fn to_svg(scene: &Scene) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = num(scene.width),
        h = num(scene.height),
    );
    for primitive in &scene.primitives {
        let _ = writeln!(out, "  {}", element(primitive));
    }
    out.push_str("</svg>\n");
    out
}

pub fn write_svg(scene: &Scene, path: &Path) -> Result<()> {
    std::fs::write(path, to_svg(scene)).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported chart to {}", path.display());
    Ok(())
}

fn element(primitive: &Primitive) -> String {
    match primitive {
        Primitive::Line { from, to, stroke } => format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" {}/>"#,
            num(from.x),
            num(from.y),
            num(to.x),
            num(to.y),
            stroke_attrs(stroke)
        ),
        Primitive::Rect {
            min,
            width,
            height,
            fill,
            stroke,
        } => format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" {}/>"#,
            num(min.x),
            num(min.y),
            num(*width),
            num(*height),
            fill.map(to_hex).unwrap_or_else(|| "none".into()),
            stroke.as_ref().map(stroke_attrs).unwrap_or_default()
        ),
        Primitive::Circle {
            center,
            radius,
            fill,
        } => format!(
            r#"<circle cx="{}" cy="{}" r="{}" fill="{}"/>"#,
            num(center.x),
            num(center.y),
            num(*radius),
            to_hex(*fill)
        ),
        Primitive::Text {
            pos,
            text,
            anchor,
            baseline,
            rotation,
            size,
            color,
        } => {
            let transform = if *rotation == 0.0 {
                String::new()
            } else {
                format!(
                    r#" transform="rotate({} {} {})""#,
                    num(*rotation),
                    num(pos.x),
                    num(pos.y)
                )
            };
            format!(
                r#"<text x="{}" y="{}" font-size="{}" fill="{}" text-anchor="{}" dominant-baseline="{}"{}>{}</text>"#,
                num(pos.x),
                num(pos.y),
                size,
                to_hex(*color),
                match anchor {
                    Anchor::Start => "start",
                    Anchor::Middle => "middle",
                    Anchor::End => "end",
                },
                match baseline {
                    Baseline::Top => "hanging",
                    Baseline::Middle => "middle",
                    Baseline::Bottom => "auto",
                },
                transform,
                escape(text)
            )
        }
        Primitive::Path {
            start,
            segments,
            stroke,
        } => {
            let mut d = format!("M{}", pair(*start));
            for segment in segments {
                match segment {
                    Segment::LineTo(p) => {
                        let _ = write!(d, "L{}", pair(*p));
                    }
                    Segment::CubicTo(c1, c2, end) => {
                        let _ = write!(d, "C{} {} {}", pair(*c1), pair(*c2), pair(*end));
                    }
                }
            }
            format!(r#"<path d="{}" fill="none" {}/>"#, d, stroke_attrs(stroke))
        }
    }
}

fn stroke_attrs(stroke: &Stroke) -> String {
    format!(
        r#"stroke="{}" stroke-width="{}""#,
        to_hex(stroke.color),
        stroke.width
    )
}

fn pair(p: Point) -> String {
    format!("{},{}", num(p.x), num(p.y))
}

/// Coordinates rounded to 1/1000 px, without trailing zeros.
fn num(v: f64) -> String {
    let text = format!("{:.3}", v);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::Color32;

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(60.0), "60");
        assert_eq!(num(17.5), "17.5");
        assert_eq!(num(1.0 / 3.0), "0.333");
        assert_eq!(num(-0.0001), "0");
    }

    #[test]
    fn document_contains_each_primitive() {
        let mut scene = Scene::new(700.0, 400.0);
        scene.line(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Stroke::new(2.0, Color32::from_rgb(0x55, 0x55, 0x55)),
        );
        scene.push(Primitive::Rect {
            min: Point::new(1.0, 2.0),
            width: 3.0,
            height: 4.0,
            fill: Some(Color32::WHITE),
            stroke: None,
        });
        scene.push(Primitive::Path {
            start: Point::new(0.0, 0.0),
            segments: vec![Segment::CubicTo(
                Point::new(1.0, 1.0),
                Point::new(2.0, 2.0),
                Point::new(3.0, 3.0),
            )],
            stroke: Stroke::new(1.0, Color32::BLACK),
        });
        scene.text(Point::new(5.0, 5.0), "Likes <&> \"fans\"", Anchor::Middle, Baseline::Middle);

        let svg = to_svg(&scene);
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r##"<line x1="0" y1="0" x2="10" y2="10" stroke="#555555" stroke-width="2"/>"##));
        assert!(svg.contains(r##"<rect x="1" y="2" width="3" height="4" fill="#ffffff" />"##));
        assert!(svg.contains(r#"d="M0,0C1,1 2,2 3,3""#));
        assert!(svg.contains("Likes &lt;&amp;&gt; &quot;fans&quot;"));
    }

    #[test]
    fn rotated_text_gets_transform() {
        let mut scene = Scene::new(10.0, 10.0);
        scene.push(Primitive::Text {
            pos: Point::new(18.0, 200.0),
            text: "Likes".into(),
            anchor: Anchor::Middle,
            baseline: Baseline::Middle,
            rotation: -90.0,
            size: 12.0,
            color: Color32::BLACK,
        });
        assert!(to_svg(&scene).contains(r#"transform="rotate(-90 18 200)""#));
    }

    #[test]
    fn write_svg_to_disk() {
        let path = std::env::temp_dir().join(format!("social-charts-{}-chart.svg", std::process::id()));
        write_svg(&Scene::new(1.0, 1.0), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(text.contains("viewBox=\"0 0 1 1\""));
    }
}
