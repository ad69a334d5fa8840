use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

pub const COUNTRY_COLUMN: &str = "Country";
pub const CONTINENT_COLUMN: &str = "Continent";
pub const PERCENTAGE_COLUMN: &str = "World Population Percentage";

/// A descriptive column value kept as-is from the source file, typed on load.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn parse(raw: &str) -> Self {
        if let Ok(value) = raw.parse::<i64>() {
            return Self::Integer(value);
        }
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Float(value),
            _ => Self::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// One row of the dataset: a single country.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub country: String,
    pub continent: String,
    /// Year -> population, built from every `<year> Population` column.
    pub populations: BTreeMap<i32, u64>,
    pub world_population_percentage: f64,
    /// Remaining columns in header order.
    pub extra: Vec<(String, Cell)>,
}

impl Record {
    pub fn population(&self, year: i32) -> Option<u64> {
        self.populations.get(&year).copied()
    }

    /// Display text for one column of the schema.
    pub fn cell_text(&self, column: &Column) -> String {
        match column {
            Column::Country => self.country.clone(),
            Column::Continent => self.continent.clone(),
            Column::Population(year) => self
                .population(*year)
                .map(|value| value.to_string())
                .unwrap_or_default(),
            Column::Percentage => self.world_population_percentage.to_string(),
            Column::Extra(index) => self
                .extra
                .get(*index)
                .map(|(_, cell)| cell.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Serialized as a flat object keyed by the dataset's column names.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3 + self.populations.len() + self.extra.len()))?;
        map.serialize_entry(COUNTRY_COLUMN, &self.country)?;
        map.serialize_entry(CONTINENT_COLUMN, &self.continent)?;
        for (year, population) in self.populations.iter().rev() {
            map.serialize_entry(&population_header(*year), population)?;
        }
        map.serialize_entry(PERCENTAGE_COLUMN, &self.world_population_percentage)?;
        for (name, cell) in &self.extra {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

/// What a header column maps to on a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Country,
    Continent,
    Population(i32),
    Percentage,
    /// Index into [`Record::extra`].
    Extra(usize),
}

pub fn population_header(year: i32) -> String {
    format!("{year} Population")
}

/// Parse `"<4-digit-year> Population"` headers. Anything else is not a year column.
pub fn parse_population_header(header: &str) -> Option<i32> {
    let year = header.trim().strip_suffix(" Population")?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    year.parse().ok()
}

/// The full, immutable dataset.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<(String, Column)>,
    years: BTreeSet<i32>,
    records: Vec<Record>,
}

impl Table {
    pub fn new(columns: Vec<(String, Column)>, records: Vec<Record>) -> Self {
        let years = columns
            .iter()
            .filter_map(|(_, column)| match column {
                Column::Population(year) => Some(*year),
                _ => None,
            })
            .collect();
        Self {
            columns,
            years,
            records,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Header names paired with their meaning, in source order.
    pub fn columns(&self) -> &[(String, Column)] {
        &self.columns
    }

    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    pub fn has_year(&self, year: i32) -> bool {
        self.years.contains(&year)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
