use std::collections::BTreeSet;
use std::path::Path;

use crate::chart::bars::BarColumns;
use crate::chart::{self, ChartError, ChartKind, Scene};
use crate::config::AppConfig;
use crate::data::aggregate::{mean_by, sort_chronologically};
use crate::data::filter::{filtered_rows, init_filter_state, FilterState};
use crate::data::model::{CellValue, Table};
use crate::summary::{summarize_ordered, GroupedResult};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which of the three input tables a file provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// One row per post (platform, post type, date, likes, age group).
    Raw,
    /// Average likes per platform and post type.
    Averages,
    /// Average likes per date.
    Timeline,
}

impl TableKind {
    pub fn label(self) -> &'static str {
        match self {
            TableKind::Raw => "raw posts",
            TableKind::Averages => "averages",
            TableKind::Timeline => "timeline",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Raw posts as loaded (None until a file is loaded).
    pub raw: Option<Table>,
    /// Prepared averages file, if one was loaded.
    pub averages: Option<Table>,
    /// Prepared timeline file, if one was loaded.
    pub timeline: Option<Table>,

    /// Per-column filter selections on the raw table.
    pub filters: FilterState,
    /// Indices of raw rows passing the current filters (cached).
    pub visible_rows: Vec<usize>,

    /// Box-plot summaries of the visible raw rows (cached).
    pub summaries: Option<GroupedResult>,
    /// Averages derived from the visible raw rows when no file was loaded.
    pub derived_averages: Option<Table>,
    /// Timeline derived from the visible raw rows when no file was loaded.
    pub derived_timeline: Option<Table>,

    pub active_chart: ChartKind,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            raw: None,
            averages: None,
            timeline: None,
            filters: FilterState::default(),
            visible_rows: Vec::new(),
            summaries: None,
            derived_averages: None,
            derived_timeline: None,
            active_chart: ChartKind::BoxPlot,
            status_message: None,
        }
    }

    /// Load whichever configured data files exist.
    pub fn load_startup_files(&mut self) {
        let files = [
            (TableKind::Raw, self.config.raw_path()),
            (TableKind::Averages, self.config.averages_path()),
            (TableKind::Timeline, self.config.timeline_path()),
        ];
        for (kind, path) in files {
            if path.exists() {
                self.load(kind, &path);
            } else {
                log::info!("No {} file at {}", kind.label(), path.display());
            }
        }
    }

    /// Load a file into the given slot; failures land in `status_message`.
    pub fn load(&mut self, kind: TableKind, path: &Path) {
        match crate::data::loader::load_file(path) {
            Ok(table) => self.set_table(kind, table),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded table and recompute everything derived from it.
    pub fn set_table(&mut self, kind: TableKind, table: Table) {
        match kind {
            TableKind::Raw => {
                self.filters = init_filter_state(&table);
                self.raw = Some(table);
            }
            TableKind::Averages => self.averages = Some(table),
            TableKind::Timeline => self.timeline = Some(table),
        }
        self.status_message = None;
        self.recompute();
    }

    /// Recompute visible rows, summaries and derived tables after a change.
    pub fn recompute(&mut self) {
        self.summaries = None;
        self.derived_averages = None;
        self.derived_timeline = None;

        let Some(raw) = &self.raw else {
            self.visible_rows.clear();
            return;
        };
        self.visible_rows = filtered_rows(raw, &self.filters);
        let visible = raw.subset(&self.visible_rows);
        let cols = &self.config.columns;

        match visible
            .observations(&cols.age_group, &cols.likes)
            .map_err(ChartError::from)
            .and_then(|obs| Ok(summarize_ordered(&obs, self.config.group_order)?))
        {
            Ok(result) => {
                log::debug!("{} groups from {} visible rows", result.len(), visible.len());
                self.summaries = Some(result);
            }
            Err(e) => {
                log::warn!("Box plot unavailable: {e}");
            }
        }

        if self.averages.is_none() {
            self.derived_averages = mean_by(
                &visible,
                &[cols.platform.as_str(), cols.post_type.as_str()],
                &cols.likes,
                &cols.avg_likes,
            )
            .inspect_err(|e| log::warn!("Cannot derive averages: {e}"))
            .ok();
        }
        if self.timeline.is_none() {
            self.derived_timeline = mean_by(&visible, &[cols.date.as_str()], &cols.likes, &cols.avg_likes)
                .map(|t| sort_chronologically(&t, &cols.date))
                .inspect_err(|e| log::warn!("Cannot derive timeline: {e}"))
                .ok();
        }
    }

    /// Averages table in use: the loaded file, else the derived one.
    pub fn averages_table(&self) -> Option<&Table> {
        self.averages.as_ref().or(self.derived_averages.as_ref())
    }

    /// Timeline table in use: the loaded file, else the derived one.
    pub fn timeline_table(&self) -> Option<&Table> {
        self.timeline.as_ref().or(self.derived_timeline.as_ref())
    }

    /// Build the drawing instructions for a chart.
    pub fn scene(&self, kind: ChartKind) -> Result<Scene, ChartError> {
        let cols = &self.config.columns;
        match kind {
            ChartKind::BoxPlot => {
                let result = self.summaries.as_ref().ok_or(ChartError::NoData("box plot"))?;
                chart::boxplot::build(result, &self.config.boxplot)
            }
            ChartKind::GroupedBars => {
                let table = self.averages_table().ok_or(ChartError::NoData("bar chart"))?;
                let columns = BarColumns {
                    category: &cols.platform,
                    series: &cols.post_type,
                    value: &cols.avg_likes,
                };
                chart::bars::build(table, columns, &self.config.bars)
            }
            ChartKind::Line => {
                let table = self.timeline_table().ok_or(ChartError::NoData("line chart"))?;
                chart::line::build(table, &cols.date, &cols.avg_likes, &self.config.line)
            }
        }
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: &str) {
        if let Some(raw) = &self.raw {
            if let Some(all_vals) = raw.unique_values.get(column) {
                self.filters.insert(column.to_string(), all_vals.clone());
                self.recompute();
            }
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: &str) {
        self.filters.insert(column.to_string(), BTreeSet::new());
        self.recompute();
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        let selected = self.filters.entry(column.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.recompute();
    }
}
