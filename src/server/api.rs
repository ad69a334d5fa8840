use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::data::{Record, Table};
use crate::error::{ChartError, QueryError};
use crate::query::{
    find_by_continent, find_by_country, find_by_population_threshold, parse_year, NameField,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "status": "error",
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::UnknownYear(_) => Self::bad_request(err.to_string()),
        }
    }
}

impl From<ChartError> for ApiError {
    fn from(err: ChartError) -> Self {
        match err {
            ChartError::NotFound { .. } => Self::not_found(err.to_string()),
            ChartError::EmptySeries(_) => Self::bad_request(err.to_string()),
            ChartError::Io(_) | ChartError::Drawing(_) => {
                log::error!("chart rendering failed: {err}");
                Self::internal(err.to_string())
            }
        }
    }
}

/// Name lookups answer 200 either way: the matches, or a message when there are none.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LookupPayload<'t> {
    Records(Vec<&'t Record>),
    Message { message: String },
}

impl LookupPayload<'_> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Message { .. })
    }
}

fn lookup_payload<'t>(records: Vec<&'t Record>, field: NameField, name: &str) -> LookupPayload<'t> {
    if records.is_empty() {
        LookupPayload::Message {
            message: format!("No data found for the {} {name}", field.label()),
        }
    } else {
        LookupPayload::Records(records)
    }
}

pub fn country_payload<'t>(table: &'t Table, name: &str) -> LookupPayload<'t> {
    lookup_payload(find_by_country(table, name), NameField::Country, name)
}

pub fn continent_payload<'t>(table: &'t Table, name: &str) -> LookupPayload<'t> {
    lookup_payload(find_by_continent(table, name), NameField::Continent, name)
}

/// Unknown year or bad threshold is a 400; no country meeting the threshold is a 404.
pub fn population_payload<'t>(
    table: &'t Table,
    year: &str,
    min_population: &str,
) -> Result<Vec<&'t Record>, ApiError> {
    let year = parse_year(year)?;
    let min_population = min_population.trim().parse::<u64>().map_err(|_| {
        ApiError::bad_request(format!("invalid population threshold '{min_population}'"))
    })?;

    let records = find_by_population_threshold(table, year, min_population)?;
    if records.is_empty() {
        return Err(ApiError::not_found(
            "No countries meet the population criteria.",
        ));
    }
    Ok(records)
}

pub fn routes_payload(bind_addr: &str) -> serde_json::Value {
    let base = format!("http://{bind_addr}");
    serde_json::json!({
        "routes": [
            format!("Full Data: {base}/data"),
            format!("Countries: {base}/country/{{name_country}}"),
            format!("Continent: {base}/continent/{{name_continent}}"),
            format!("Population in Year (YYYY): {base}/population/{{year}}/{{population}}"),
            format!("Visualize Data: {base}/visualize"),
            format!("Generate Bar Chart: {base}/generate_bar_chart/{{country_name}}"),
            format!("Generate Pie Chart: {base}/generate_pie_chart/{{continent_name}}?top={{n}}"),
            format!("Rendered Images: {base}/img/{{file_name}}"),
            "Note: Use underscores (_) instead of spaces in names (e.g., 'South_America' or 'North_America').",
        ]
    })
}

pub fn visualize_html(table: &Table) -> String {
    let mut html = String::from(
        "<html><head><meta charset=\"utf-8\" /><title>World Population</title></head><body>\n\
         <table border=\"1\" class=\"dataframe\">\n<thead><tr><th></th>",
    );
    for (header, _) in table.columns() {
        html.push_str("<th>");
        html.push_str(&escape_html(header));
        html.push_str("</th>");
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for (index, record) in table.records().iter().enumerate() {
        html.push_str(&format!("<tr><th>{index}</th>"));
        for (_, column) in table.columns() {
            html.push_str("<td>");
            html.push_str(&escape_html(&record.cell_text(column)));
            html.push_str("</td>");
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n</body></html>\n");
    html
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
