//! Lookups over the in-memory [`Table`]. All functions are pure and scan the full table.

use crate::data::{Record, Table};
use crate::error::QueryError;

/// How a normalized name is compared against a column. Comparison is always case-insensitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    #[default]
    Contains,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameField {
    Country,
    Continent,
}

impl NameField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Continent => "continent",
        }
    }

    fn value(self, record: &Record) -> &str {
        match self {
            Self::Country => &record.country,
            Self::Continent => &record.continent,
        }
    }
}

/// Underscores become spaces, whitespace is collapsed, and each word is title-cased
/// (`south_america` -> `South America`, `guinea-bissau` -> `Guinea-Bissau`).
pub fn normalize_name(raw: &str) -> String {
    let spaced = raw.replace('_', " ");
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut out = String::with_capacity(collapsed.len());
    let mut previous_is_letter = false;
    for ch in collapsed.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(ch);
            previous_is_letter = false;
        }
    }
    out
}

pub fn find_by_field<'t>(
    table: &'t Table,
    field: NameField,
    name: &str,
    mode: MatchMode,
) -> Vec<&'t Record> {
    let needle = normalize_name(name).to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    table
        .records()
        .iter()
        .filter(|record| {
            let haystack = field.value(record).to_lowercase();
            match mode {
                MatchMode::Exact => haystack == needle,
                MatchMode::Contains => haystack.contains(&needle),
            }
        })
        .collect()
}

pub fn find_by_country<'t>(table: &'t Table, name: &str) -> Vec<&'t Record> {
    find_by_field(table, NameField::Country, name, MatchMode::default())
}

pub fn find_by_continent<'t>(table: &'t Table, name: &str) -> Vec<&'t Record> {
    find_by_field(table, NameField::Continent, name, MatchMode::default())
}

/// Exact country match if there is one, otherwise the first substring match.
/// Keeps `niger` from resolving to Nigeria when Niger is in the table.
pub fn best_country_match<'t>(table: &'t Table, name: &str) -> Option<&'t Record> {
    find_by_field(table, NameField::Country, name, MatchMode::Exact)
        .into_iter()
        .next()
        .or_else(|| find_by_country(table, name).into_iter().next())
}

pub fn parse_year(raw: &str) -> Result<i32, QueryError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| QueryError::UnknownYear(raw.to_string()))
}

pub fn find_by_population_threshold(
    table: &Table,
    year: i32,
    min_population: u64,
) -> Result<Vec<&Record>, QueryError> {
    if !table.has_year(year) {
        return Err(QueryError::UnknownYear(year.to_string()));
    }
    Ok(table
        .records()
        .iter()
        .filter(|record| {
            record
                .population(year)
                .is_some_and(|population| population >= min_population)
        })
        .collect())
}
