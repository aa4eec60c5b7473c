use eframe::egui::Color32;

use super::scale::{BandScale, LinearScale};
use super::scene::{Point, Primitive, Scene, Segment, Stroke};
use super::ChartError;
use crate::config::ChartConfig;
use crate::data::model::Table;

const DOT_RADIUS: f64 = 3.0;

/// A line through one point per row, x from the `x_column` labels in row
/// order, smoothed with a natural cubic spline.
pub fn build(
    table: &Table,
    x_column: &str,
    y_column: &str,
    cfg: &ChartConfig,
) -> Result<Scene, ChartError> {
    if table.is_empty() {
        return Err(ChartError::NoData("line chart"));
    }
    table.require_column(x_column)?;
    table.require_column(y_column)?;
    let values = (0..table.len())
        .map(|i| table.numeric(i, y_column))
        .collect::<Result<Vec<f64>, _>>()?;
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let x = BandScale::point(
        table.column_labels(x_column),
        (cfg.inner_left(), cfg.inner_right()),
        cfg.padding,
    );
    let y = LinearScale::new((lo, hi), (cfg.inner_bottom(), cfg.inner_top())).nice(cfg.tick_count);

    let mut scene = Scene::new(cfg.width, cfg.height);
    scene.axis_bottom(&x, cfg.inner_bottom(), cfg.x_label_rotation);
    scene.axis_left(&y, cfg.inner_left(), cfg.tick_count);
    scene.axis_labels(cfg);

    let color = cfg
        .series_colors
        .first()
        .and_then(|hex| crate::color::parse_hex(hex))
        .unwrap_or(Color32::from_rgb(0x1f, 0x77, 0xb4));

    let points: Vec<Point> = values
        .iter()
        .enumerate()
        .filter_map(|(row, value)| {
            let px = x.position(&table.label(row, x_column))?;
            Some(Point::new(px, y.apply(*value)))
        })
        .collect();

    if let Some((start, segments)) = natural_curve(&points) {
        scene.push(Primitive::Path {
            start,
            segments,
            stroke: Stroke::new(2.0, color),
        });
    }
    for center in points {
        scene.push(Primitive::Circle {
            center,
            radius: DOT_RADIUS,
            fill: color,
        });
    }

    Ok(scene)
}

/// Path through `points` as d3's `curveNatural`: cubic segments whose
/// control points solve the natural spline system per coordinate.
pub fn natural_curve(points: &[Point]) -> Option<(Point, Vec<Segment>)> {
    let (&start, rest) = points.split_first()?;
    match rest.len() {
        0 => Some((start, Vec::new())),
        1 => Some((start, vec![Segment::LineTo(rest[0])])),
        _ => {
            let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
            let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
            let (ax, bx) = control_points(&xs);
            let (ay, by) = control_points(&ys);
            let segments = rest
                .iter()
                .enumerate()
                .map(|(i, end)| {
                    Segment::CubicTo(Point::new(ax[i], ay[i]), Point::new(bx[i], by[i]), *end)
                })
                .collect();
            Some((start, segments))
        }
    }
}

/// First and second Bézier control points for each of the `n` segments
/// between `x.len() = n + 1` knots (tridiagonal solve, natural ends).
fn control_points(x: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = x.len() - 1;
    let mut a = vec![0.0; n];
    let mut b = vec![0.0; n];
    let mut r = vec![0.0; n];

    a[0] = 0.0;
    b[0] = 2.0;
    r[0] = x[0] + 2.0 * x[1];
    for i in 1..n - 1 {
        a[i] = 1.0;
        b[i] = 4.0;
        r[i] = 4.0 * x[i] + 2.0 * x[i + 1];
    }
    a[n - 1] = 2.0;
    b[n - 1] = 7.0;
    r[n - 1] = 8.0 * x[n - 1] + x[n];

    for i in 1..n {
        let m = a[i] / b[i - 1];
        b[i] -= m;
        r[i] -= m * r[i - 1];
    }

    a[n - 1] = r[n - 1] / b[n - 1];
    for i in (0..n - 1).rev() {
        a[i] = (r[i] - a[i + 1]) / b[i];
    }
    b[n - 1] = (x[n] + a[n - 1]) / 2.0;
    for i in 0..n - 1 {
        b[i] = 2.0 * x[i + 1] - a[i + 1];
    }
    (a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::table;

    fn timeline() -> Table {
        table(
            &["Date", "AvgLikes"],
            &[
                &["3/1/2024 (Friday)", "120"],
                &["3/2/2024 (Saturday)", "340"],
                &["3/3/2024 (Sunday)", "260"],
                &["3/4/2024 (Monday)", "410"],
            ],
        )
    }

    #[test]
    fn collinear_points_give_straight_controls() {
        let pts: Vec<Point> = (0..4).map(|i| Point::new(i as f64 * 10.0, i as f64 * 10.0)).collect();
        let (start, segments) = natural_curve(&pts).unwrap();
        assert_eq!(start, pts[0]);
        assert_eq!(segments.len(), 3);
        for seg in segments {
            let Segment::CubicTo(c1, c2, _) = seg else {
                panic!("expected cubic segment");
            };
            assert!((c1.x - c1.y).abs() < 1e-9);
            assert!((c2.x - c2.y).abs() < 1e-9);
        }
    }

    #[test]
    fn control_points_match_natural_spline() {
        // Knots 0, 1, 0: the natural spline peaks between the thirds.
        let (a, b) = control_points(&[0.0, 1.0, 0.0]);
        assert!((a[0] - 0.5).abs() < 1e-12);
        assert!((b[0] - 1.0).abs() < 1e-12);
        assert!((a[1] - 1.0).abs() < 1e-12);
        assert!((b[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn short_inputs() {
        assert!(natural_curve(&[]).is_none());
        let one = [Point::new(1.0, 2.0)];
        assert_eq!(natural_curve(&one), Some((one[0], Vec::new())));
        let two = [Point::new(0.0, 0.0), Point::new(5.0, 5.0)];
        assert_eq!(natural_curve(&two), Some((two[0], vec![Segment::LineTo(two[1])])));
    }

    #[test]
    fn line_passes_through_every_row() {
        let cfg = ChartConfig::line();
        let scene = build(&timeline(), "Date", "AvgLikes", &cfg).unwrap();

        let dots: Vec<Point> = scene
            .primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Circle { center, .. } => Some(*center),
                _ => None,
            })
            .collect();
        assert_eq!(dots.len(), 4);
        assert!(dots.windows(2).all(|w| w[0].x < w[1].x));

        let path_end = scene.primitives.iter().find_map(|p| match p {
            Primitive::Path { segments, stroke, .. } if stroke.width == 2.0 => segments.last().copied(),
            _ => None,
        });
        assert!(matches!(path_end, Some(Segment::CubicTo(_, _, end)) if end == dots[3]));

        assert!(scene.texts().any(|t| t == "3/4/2024 (Monday)"));
    }

    #[test]
    fn non_numeric_values_are_reported() {
        let t = table(&["Date", "AvgLikes"], &[&["3/1", "n/a"]]);
        assert!(matches!(
            build(&t, "Date", "AvgLikes", &ChartConfig::line()),
            Err(ChartError::Column(_))
        ));
    }
}
