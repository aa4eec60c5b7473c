/// Chart layer: pure functions from data + [`ChartConfig`] to a [`Scene`].
///
/// ```text
///   GroupedResult / Table
///        │
///        ▼
///   ┌────────────────────────┐
///   │ boxplot / bars / line   │  scales, axes, glyphs
///   └────────────────────────┘
///        │
///        ▼
///      Scene  ──▶ egui painter (ui::plot) / SVG (svg)
/// ```
///
/// [`ChartConfig`]: crate::config::ChartConfig

pub mod bars;
pub mod boxplot;
pub mod line;
pub mod scale;
pub mod scene;
pub mod svg;

use thiserror::Error;

use crate::data::model::ColumnError;
use crate::summary::SummaryError;

pub use scene::Scene;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("no data to draw the {0}")]
    NoData(&'static str),
    #[error(transparent)]
    Column(#[from] ColumnError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
}

/// The three charts the app draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    BoxPlot,
    GroupedBars,
    Line,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::BoxPlot, ChartKind::GroupedBars, ChartKind::Line];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::BoxPlot => "Likes by age group",
            ChartKind::GroupedBars => "Average likes by platform",
            ChartKind::Line => "Average likes over time",
        }
    }

    /// Default file stem for exports.
    pub fn slug(self) -> &'static str {
        match self {
            ChartKind::BoxPlot => "boxplot",
            ChartKind::GroupedBars => "barplot",
            ChartKind::Line => "lineplot",
        }
    }
}
