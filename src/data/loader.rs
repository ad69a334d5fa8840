//! Load the population CSV into a [`Table`]. Runs once at startup.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, info};

use crate::data::record::{
    parse_population_header, Cell, Column, Record, Table, CONTINENT_COLUMN, COUNTRY_COLUMN,
    PERCENTAGE_COLUMN,
};
use crate::error::DataSourceError;

const COUNTRY_ALIASES: &[&str] = &[COUNTRY_COLUMN, "Country/Territory"];

pub fn load_table(path: impl AsRef<Path>) -> Result<Table, DataSourceError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DataSourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let table = load_table_from_reader(file)?;
    info!(
        "loaded {} records with {} year columns from '{}'",
        table.len(),
        table.years().len(),
        path.display()
    );
    Ok(table)
}

pub fn load_table_from_reader<R: Read>(reader: R) -> Result<Table, DataSourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(DataSourceError::MissingHeader);
    }

    let columns = classify_headers(headers.iter())?;
    let mut records = Vec::new();

    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let line = row.position().map_or(index + 2, |pos| pos.line() as usize);
        records.push(parse_row(&columns, &row, line)?);
    }

    debug!("parsed {} data rows", records.len());
    Ok(Table::new(columns, records))
}

fn classify_headers<'a>(
    headers: impl Iterator<Item = &'a str>,
) -> Result<Vec<(String, Column)>, DataSourceError> {
    let mut extra_index = 0;
    let columns: Vec<(String, Column)> = headers
        .map(|header| {
            let column = if COUNTRY_ALIASES
                .iter()
                .any(|alias| header.eq_ignore_ascii_case(alias))
            {
                Column::Country
            } else if header.eq_ignore_ascii_case(CONTINENT_COLUMN) {
                Column::Continent
            } else if header.eq_ignore_ascii_case(PERCENTAGE_COLUMN) {
                Column::Percentage
            } else if let Some(year) = parse_population_header(header) {
                Column::Population(year)
            } else {
                extra_index += 1;
                Column::Extra(extra_index - 1)
            };
            (header.to_string(), column)
        })
        .collect();

    for (required, name) in [
        (Column::Country, COUNTRY_COLUMN),
        (Column::Continent, CONTINENT_COLUMN),
        (Column::Percentage, PERCENTAGE_COLUMN),
    ] {
        if !columns.iter().any(|(_, column)| *column == required) {
            return Err(DataSourceError::MissingColumn(name));
        }
    }

    Ok(columns)
}

fn parse_row(
    columns: &[(String, Column)],
    row: &csv::StringRecord,
    line: usize,
) -> Result<Record, DataSourceError> {
    let mut record = Record {
        country: String::new(),
        continent: String::new(),
        populations: Default::default(),
        world_population_percentage: 0.0,
        extra: Vec::new(),
    };

    for ((header, column), raw) in columns.iter().zip(row.iter()) {
        let invalid = || DataSourceError::InvalidValue {
            row: line,
            column: header.clone(),
            value: raw.to_string(),
        };
        match column {
            Column::Country => record.country = raw.to_string(),
            Column::Continent => record.continent = raw.to_string(),
            Column::Population(year) => {
                let population = parse_population(raw).ok_or_else(invalid)?;
                record.populations.insert(*year, population);
            }
            Column::Percentage => {
                record.world_population_percentage = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .ok_or_else(invalid)?;
            }
            Column::Extra(_) => record.extra.push((header.clone(), Cell::parse(raw))),
        }
    }

    Ok(record)
}

/// Accepts plain integers and integral floats such as `"1234.0"`.
fn parse_population(raw: &str) -> Option<u64> {
    if let Ok(value) = raw.parse::<u64>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}
