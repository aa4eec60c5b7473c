use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

use crate::summary::GroupOrder;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "SOCIAL_CHARTS_CONFIG";

// ---------------------------------------------------------------------------
// Chart geometry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// Size, margins, labels and band spacing of one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub x_label: String,
    pub y_label: String,
    /// Padding of the outer band scale (fraction of a step).
    pub padding: f64,
    /// Padding of the inner band scale on grouped charts.
    pub inner_padding: f64,
    /// Approximate number of ticks on the value axis.
    pub tick_count: usize,
    /// Rotation of the category-axis labels, in degrees.
    pub x_label_rotation: f64,
    /// Series colours as `#rrggbb`; generated hues extend the list.
    pub series_colors: Vec<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 700.0,
            height: 400.0,
            margin: Margin::new(30.0, 30.0, 60.0, 60.0),
            x_label: String::new(),
            y_label: String::new(),
            padding: 0.3,
            inner_padding: 0.05,
            tick_count: 10,
            x_label_rotation: 0.0,
            series_colors: crate::color::CATEGORY10.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ChartConfig {
    pub fn boxplot() -> Self {
        Self {
            x_label: "Age Group".into(),
            y_label: "Likes".into(),
            ..Self::default()
        }
    }

    pub fn bars() -> Self {
        Self {
            margin: Margin::new(20.0, 20.0, 60.0, 60.0),
            x_label: "Platform".into(),
            y_label: "Average Likes".into(),
            padding: 0.1,
            ..Self::default()
        }
    }

    pub fn line() -> Self {
        Self {
            margin: Margin::new(20.0, 30.0, 90.0, 60.0),
            x_label: "Date".into(),
            y_label: "Average Likes".into(),
            padding: 0.5,
            x_label_rotation: -45.0,
            ..Self::default()
        }
    }

    /// Left edge of the plotting area.
    pub fn inner_left(&self) -> f64 {
        self.margin.left
    }

    pub fn inner_right(&self) -> f64 {
        self.width - self.margin.right
    }

    pub fn inner_top(&self) -> f64 {
        self.margin.top
    }

    pub fn inner_bottom(&self) -> f64 {
        self.height - self.margin.bottom
    }
}

/// Fields a config file may set on one chart; the rest come from the
/// chart's own preset.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChartOverride {
    width: Option<f64>,
    height: Option<f64>,
    margin: Option<Margin>,
    x_label: Option<String>,
    y_label: Option<String>,
    padding: Option<f64>,
    inner_padding: Option<f64>,
    tick_count: Option<usize>,
    x_label_rotation: Option<f64>,
    series_colors: Option<Vec<String>>,
}

impl ChartOverride {
    fn apply(self, base: ChartConfig) -> ChartConfig {
        ChartConfig {
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            margin: self.margin.unwrap_or(base.margin),
            x_label: self.x_label.unwrap_or(base.x_label),
            y_label: self.y_label.unwrap_or(base.y_label),
            padding: self.padding.unwrap_or(base.padding),
            inner_padding: self.inner_padding.unwrap_or(base.inner_padding),
            tick_count: self.tick_count.unwrap_or(base.tick_count),
            x_label_rotation: self.x_label_rotation.unwrap_or(base.x_label_rotation),
            series_colors: self.series_colors.unwrap_or(base.series_colors),
        }
    }
}

fn boxplot_config<'de, D: Deserializer<'de>>(d: D) -> Result<ChartConfig, D::Error> {
    ChartOverride::deserialize(d).map(|o| o.apply(ChartConfig::boxplot()))
}

fn bars_config<'de, D: Deserializer<'de>>(d: D) -> Result<ChartConfig, D::Error> {
    ChartOverride::deserialize(d).map(|o| o.apply(ChartConfig::bars()))
}

fn line_config<'de, D: Deserializer<'de>>(d: D) -> Result<ChartConfig, D::Error> {
    ChartOverride::deserialize(d).map(|o| o.apply(ChartConfig::line()))
}

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Columns {
    pub age_group: String,
    pub likes: String,
    pub platform: String,
    pub post_type: String,
    pub date: String,
    pub avg_likes: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            age_group: "AgeGroup".into(),
            likes: "Likes".into(),
            platform: "Platform".into(),
            post_type: "PostType".into(),
            date: "Date".into(),
            avg_likes: "AvgLikes".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory searched for the data files at startup.
    pub data_dir: PathBuf,
    pub raw_file: String,
    pub averages_file: String,
    pub timeline_file: String,
    pub columns: Columns,
    pub group_order: GroupOrder,
    #[serde(deserialize_with = "boxplot_config")]
    pub boxplot: ChartConfig,
    #[serde(deserialize_with = "bars_config")]
    pub bars: ChartConfig,
    #[serde(deserialize_with = "line_config")]
    pub line: ChartConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            raw_file: "socialMedia.csv".into(),
            averages_file: "socialMediaAvg.csv".into(),
            timeline_file: "socialMediaTime.csv".into(),
            columns: Columns::default(),
            group_order: GroupOrder::FirstSeen,
            boxplot: ChartConfig::boxplot(),
            bars: ChartConfig::bars(),
            line: ChartConfig::line(),
        }
    }
}

impl AppConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Config from the file named by [`CONFIG_ENV`], or the defaults.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Self::default();
        };
        match Self::load(Path::new(&path)) {
            Ok(config) => {
                log::info!("Using config {}", Path::new(&path).display());
                config
            }
            Err(e) => {
                log::warn!("Falling back to default config: {e:#}");
                Self::default()
            }
        }
    }

    pub fn raw_path(&self) -> PathBuf {
        self.data_dir.join(&self.raw_file)
    }

    pub fn averages_path(&self) -> PathBuf {
        self.data_dir.join(&self.averages_file)
    }

    pub fn timeline_path(&self) -> PathBuf {
        self.data_dir.join(&self.timeline_file)
    }
}
