use eframe::egui::Color32;

use super::scale::{BandScale, LinearScale};
use super::scene::{Anchor, Baseline, Point, Primitive, Scene};
use super::ChartError;
use crate::color::ColorMap;
use crate::config::ChartConfig;
use crate::data::model::Table;

const LEGEND_OFFSET: f64 = 150.0;
const LEGEND_ROW: f64 = 20.0;
const SWATCH: f64 = 15.0;
/// Label baseline below the top of its swatch row.
const LEGEND_TEXT_DY: f64 = 12.0;

/// Column roles for a grouped bar chart.
#[derive(Debug, Clone, Copy)]
pub struct BarColumns<'a> {
    /// Outer grouping along the x axis (e.g. platform).
    pub category: &'a str,
    /// Bars within each group, coloured (e.g. post type).
    pub series: &'a str,
    pub value: &'a str,
}

/// One bar per row, grouped by category, coloured by series, with a legend.
pub fn build(table: &Table, columns: BarColumns<'_>, cfg: &ChartConfig) -> Result<Scene, ChartError> {
    if table.is_empty() {
        return Err(ChartError::NoData("bar chart"));
    }
    table.require_column(columns.category)?;
    table.require_column(columns.series)?;
    table.require_column(columns.value)?;

    let values = (0..table.len())
        .map(|i| table.numeric(i, columns.value))
        .collect::<Result<Vec<f64>, _>>()?;
    let lo = values.iter().copied().fold(0.0, f64::min);
    let hi = values.iter().copied().fold(0.0, f64::max);

    let series = table.column_labels(columns.series);
    let x0 = BandScale::new(
        table.column_labels(columns.category),
        (cfg.inner_left(), cfg.inner_right()),
    )
    .with_padding(cfg.padding);
    let x1 = BandScale::new(series.clone(), (0.0, x0.bandwidth())).with_padding(cfg.inner_padding);
    let y = LinearScale::new((lo, hi), (cfg.inner_bottom(), cfg.inner_top())).nice(cfg.tick_count);
    let colors = ColorMap::new(&series, &cfg.series_colors);

    let mut scene = Scene::new(cfg.width, cfg.height);
    scene.axis_bottom(&x0, cfg.inner_bottom(), cfg.x_label_rotation);
    scene.axis_left(&y, cfg.inner_left(), cfg.tick_count);
    scene.axis_labels(cfg);

    let baseline = y.apply(0.0);
    for (row, value) in values.iter().enumerate() {
        let category = table.label(row, columns.category);
        let label = table.label(row, columns.series);
        let (Some(group_x), Some(bar_x)) = (x0.position(&category), x1.position(&label)) else {
            continue;
        };
        let top = y.apply(*value);
        scene.push(Primitive::Rect {
            min: Point::new(group_x + bar_x, top.min(baseline)),
            width: x1.bandwidth(),
            height: (baseline - top).abs(),
            fill: Some(colors.color_for(&label)),
            stroke: None,
        });
    }

    legend(&mut scene, &colors, Point::new(cfg.width - LEGEND_OFFSET, cfg.margin.top));
    Ok(scene)
}

/// Swatch + label per series, one row every 20px from `origin`.
fn legend(scene: &mut Scene, colors: &ColorMap, origin: Point) {
    for (i, (label, color)) in colors.legend_entries().into_iter().enumerate() {
        let row_y = origin.y + i as f64 * LEGEND_ROW;
        scene.push(Primitive::Rect {
            min: Point::new(origin.x, row_y),
            width: SWATCH,
            height: SWATCH,
            fill: Some(color),
            stroke: None,
        });
        scene.push(Primitive::Text {
            pos: Point::new(origin.x + 20.0, row_y + LEGEND_TEXT_DY),
            text: label,
            anchor: Anchor::Start,
            baseline: Baseline::Middle,
            rotation: 0.0,
            size: 12.0,
            color: Color32::BLACK,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::table;

    const COLUMNS: BarColumns<'static> = BarColumns {
        category: "Platform",
        series: "PostType",
        value: "AvgLikes",
    };

    fn averages() -> Table {
        table(
            &["Platform", "PostType", "AvgLikes"],
            &[
                &["Instagram", "Image", "400"],
                &["Instagram", "Video", "800"],
                &["Twitter", "Image", "200"],
                &["Twitter", "Video", "100"],
            ],
        )
    }

    fn bars(scene: &Scene) -> Vec<(Point, f64, f64, Color32)> {
        scene
            .primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Rect { min, width, height, fill: Some(fill), stroke: None }
                    if *width != SWATCH =>
                {
                    Some((*min, *width, *height, *fill))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn bars_grouped_and_coloured_by_series() {
        let cfg = ChartConfig::bars();
        let scene = build(&averages(), COLUMNS, &cfg).unwrap();
        let bars = bars(&scene);
        assert_eq!(bars.len(), 4);

        // Same series → same colour, different series → different colour.
        assert_eq!(bars[0].3, bars[2].3);
        assert_ne!(bars[0].3, bars[1].3);

        // Bars stand on the x axis; the tallest reaches the nice maximum.
        for (min, _, height, _) in &bars {
            assert!((min.y + height - cfg.inner_bottom()).abs() < 1e-9);
        }
        assert!((bars[1].0.y - cfg.inner_top()).abs() < 1e-9);

        // Instagram's bars sit left of Twitter's.
        assert!(bars[1].0.x < bars[2].0.x);
    }

    #[test]
    fn legend_lists_series_once() {
        let cfg = ChartConfig::bars();
        let scene = build(&averages(), COLUMNS, &cfg).unwrap();
        let texts: Vec<&str> = scene.texts().collect();
        assert_eq!(texts.iter().filter(|t| **t == "Image").count(), 1);
        assert_eq!(texts.iter().filter(|t| **t == "Video").count(), 1);
        assert!(texts.contains(&"Instagram") && texts.contains(&"Average Likes"));

        let swatches = scene
            .primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Rect { min, width, .. } if *width == SWATCH && min.x == cfg.width - LEGEND_OFFSET))
            .count();
        assert_eq!(swatches, 2);

        let labels: Vec<Point> = scene
            .primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Text { pos, text, baseline: Baseline::Middle, .. }
                    if text == "Image" || text == "Video" =>
                {
                    Some(*pos)
                }
                _ => None,
            })
            .collect();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].x, cfg.width - LEGEND_OFFSET + 20.0);
        assert_eq!(labels[0].y, cfg.margin.top + 12.0);
        assert_eq!(labels[1].y, cfg.margin.top + 32.0);
    }

    #[test]
    fn missing_column_and_empty_table() {
        let cfg = ChartConfig::bars();
        let t = table(&["Platform", "AvgLikes"], &[&["Twitter", "1"]]);
        assert!(matches!(build(&t, COLUMNS, &cfg), Err(ChartError::Column(_))));
        assert!(matches!(
            build(&Table::default(), COLUMNS, &cfg),
            Err(ChartError::NoData(_))
        ));
    }
}
