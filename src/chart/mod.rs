//! Chart requests: resolve against the table, shape the series, render to PNG.

pub mod fonts;
pub mod output;
pub mod render;
pub mod render_lock;
pub mod series;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::data::Table;
use crate::error::ChartError;
use crate::query::{best_country_match, find_by_continent, normalize_name};

pub use output::{chart_path, clear_rendered_images};
pub use render::{render_bar, render_pie};
pub use render_lock::RenderLocks;
pub use series::{series_for_continent, series_for_country, CountryShare, YearPopulation, DEFAULT_TOP_N};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Pie,
}

impl ChartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Pie => "pie",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartRequest {
    Bar { country: String },
    Pie { continent: String, top_n: usize },
}

impl ChartRequest {
    pub fn bar(country: &str) -> Self {
        Self::Bar {
            country: normalize_name(country),
        }
    }

    pub fn pie(continent: &str, top_n: usize) -> Self {
        Self::Pie {
            continent: normalize_name(continent),
            top_n,
        }
    }

    pub fn kind(&self) -> ChartKind {
        match self {
            Self::Bar { .. } => ChartKind::Bar,
            Self::Pie { .. } => ChartKind::Pie,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Years(Vec<YearPopulation>),
    Shares { shares: Vec<CountryShare>, top_n: usize },
}

/// A request resolved against the table: the entity to title the chart with and its data.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlan {
    pub entity: String,
    pub series: Series,
}

impl ChartPlan {
    pub fn kind(&self) -> ChartKind {
        match self.series {
            Series::Years(_) => ChartKind::Bar,
            Series::Shares { .. } => ChartKind::Pie,
        }
    }

    pub fn output_path(&self, dir: &Path) -> PathBuf {
        chart_path(dir, self.kind(), &self.entity)
    }

    pub fn render(&self, dir: &Path) -> Result<PathBuf, ChartError> {
        match &self.series {
            Series::Years(points) => render_bar(points, &self.entity, dir),
            Series::Shares { shares, top_n } => render_pie(shares, &self.entity, *top_n, dir),
        }
    }
}

/// Bar charts are titled with the matched country's own name; pie charts with the
/// normalized continent as requested, since a substring may span several continents.
pub fn plan(table: &Table, request: &ChartRequest) -> Result<ChartPlan, ChartError> {
    match request {
        ChartRequest::Bar { country } => {
            let record = best_country_match(table, country).ok_or_else(|| ChartError::NotFound {
                kind: ChartKind::Bar,
                name: country.clone(),
            })?;
            Ok(ChartPlan {
                entity: record.country.clone(),
                series: Series::Years(series_for_country(record)),
            })
        }
        ChartRequest::Pie { continent, top_n } => {
            let records = find_by_continent(table, continent);
            if records.is_empty() {
                return Err(ChartError::NotFound {
                    kind: ChartKind::Pie,
                    name: continent.clone(),
                });
            }
            Ok(ChartPlan {
                entity: continent.clone(),
                series: Series::Shares {
                    shares: series_for_continent(&records, *top_n),
                    top_n: *top_n,
                },
            })
        }
    }
}
