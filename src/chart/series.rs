//! Shape query results into (label, value) series for the renderer.

use std::cmp::Ordering;

use serde::Serialize;

use crate::data::Record;

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearPopulation {
    pub year: i32,
    pub population: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryShare {
    pub country: String,
    pub percentage: f64,
}

/// Every year column on the record, ascending by year.
pub fn series_for_country(record: &Record) -> Vec<YearPopulation> {
    record
        .populations
        .iter()
        .map(|(&year, &population)| YearPopulation { year, population })
        .collect()
}

/// Countries by descending world population share, cut to `top_n`.
pub fn series_for_continent(records: &[&Record], top_n: usize) -> Vec<CountryShare> {
    let mut shares: Vec<CountryShare> = records
        .iter()
        .map(|record| CountryShare {
            country: record.country.clone(),
            percentage: record.world_population_percentage,
        })
        .collect();

    shares.sort_by(|a, b| match b.percentage.total_cmp(&a.percentage) {
        Ordering::Equal => a.country.cmp(&b.country),
        other => other,
    });
    shares.truncate(top_n);
    shares
}
