use eframe::egui::Color32;

use super::scale::{BandScale, LinearScale};
use super::scene::{Point, Primitive, Scene, Stroke};
use super::ChartError;
use crate::config::ChartConfig;
use crate::summary::GroupedResult;

const WHISKER: Stroke = Stroke::new(2.0, Color32::from_rgb(0x55, 0x55, 0x55));
const BOX_OUTLINE: Stroke = Stroke::new(1.5, Color32::from_rgb(0x33, 0x33, 0x33));
const MEDIAN: Stroke = Stroke::new(2.0, Color32::from_rgb(0x1b, 0x1f, 0x24));

/// Fraction of the band occupied by a box.
const BOX_WIDTH: f64 = 0.6;

/// One box per group: min–max whisker, q1–q3 box, median line.
pub fn build(result: &GroupedResult, cfg: &ChartConfig) -> Result<Scene, ChartError> {
    let (lo, hi) = result.value_extent().ok_or(ChartError::NoData("box plot"))?;

    let x = BandScale::new(
        result.keys().map(String::from).collect(),
        (cfg.inner_left(), cfg.inner_right()),
    )
    .with_padding(cfg.padding);
    let y = LinearScale::new((lo, hi), (cfg.inner_bottom(), cfg.inner_top())).nice(cfg.tick_count);

    let mut scene = Scene::new(cfg.width, cfg.height);
    scene.axis_bottom(&x, cfg.inner_bottom(), cfg.x_label_rotation);
    scene.axis_left(&y, cfg.inner_left(), cfg.tick_count);
    scene.axis_labels(cfg);

    let box_width = x.bandwidth() * BOX_WIDTH;
    for (group, s) in result.iter() {
        let Some(center) = x.center(group) else {
            continue;
        };

        scene.line(
            Point::new(center, y.apply(s.min)),
            Point::new(center, y.apply(s.max)),
            WHISKER,
        );

        scene.push(Primitive::Rect {
            min: Point::new(center - box_width / 2.0, y.apply(s.q3)),
            width: box_width,
            height: (y.apply(s.q1) - y.apply(s.q3)).max(1.0),
            fill: Some(Color32::WHITE),
            stroke: Some(BOX_OUTLINE),
        });

        scene.line(
            Point::new(center - box_width / 2.0, y.apply(s.median)),
            Point::new(center + box_width / 2.0, y.apply(s.median)),
            MEDIAN,
        );
    }

    Ok(scene)
}
