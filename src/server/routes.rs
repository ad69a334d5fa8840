use std::sync::Arc;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::chart::ChartRequest;
use crate::context::AppContext;
use crate::server::{api, static_files};

type AppState = State<Arc<AppContext>>;

pub fn router(ctx: Arc<AppContext>) -> Router {
    let images = static_files::image_service(&ctx.config.image_dir);
    Router::new()
        .route("/", get(index))
        .route("/data", get(data))
        .route("/country/:name", get(country))
        .route("/continent/:name", get(continent))
        .route("/population/:year/:min_population", get(population))
        .route("/visualize", get(visualize))
        .route("/generate_bar_chart/:country", get(bar_chart))
        .route("/generate_pie_chart/:continent", get(pie_chart))
        .nest_service("/img", images)
        .fallback(not_found)
        .with_state(ctx)
}

async fn index(State(ctx): AppState) -> Json<serde_json::Value> {
    Json(api::routes_payload(&ctx.config.bind_addr))
}

async fn data(State(ctx): AppState) -> Response {
    Json(ctx.table.records()).into_response()
}

// Extractors are taken as `Result` so malformed paths and queries still get the
// JSON error body.
type PathParam<T> = Result<Path<T>, PathRejection>;

async fn country(State(ctx): AppState, name: PathParam<String>) -> Result<Response, api::ApiError> {
    let Path(name) = name?;
    Ok(Json(api::country_payload(&ctx.table, &name)).into_response())
}

async fn continent(
    State(ctx): AppState,
    name: PathParam<String>,
) -> Result<Response, api::ApiError> {
    let Path(name) = name?;
    Ok(Json(api::continent_payload(&ctx.table, &name)).into_response())
}

async fn population(
    State(ctx): AppState,
    params: PathParam<(String, String)>,
) -> Result<Response, api::ApiError> {
    let Path((year, min_population)) = params?;
    let records = api::population_payload(&ctx.table, &year, &min_population)?;
    Ok(Json(records).into_response())
}

async fn visualize(State(ctx): AppState) -> Html<String> {
    Html(api::visualize_html(&ctx.table))
}

async fn bar_chart(
    State(ctx): AppState,
    country: PathParam<String>,
) -> Result<Response, api::ApiError> {
    let Path(country) = country?;
    render_png(ctx, ChartRequest::bar(&country)).await
}

#[derive(Debug, Deserialize)]
struct PieParams {
    top: Option<usize>,
}

async fn pie_chart(
    State(ctx): AppState,
    continent: PathParam<String>,
    params: Result<Query<PieParams>, QueryRejection>,
) -> Result<Response, api::ApiError> {
    let Path(continent) = continent?;
    let Query(params) = params?;
    let top_n = params.top.unwrap_or(ctx.config.pie_top_n);
    render_png(ctx, ChartRequest::pie(&continent, top_n)).await
}

/// Rendering is blocking file I/O, so it runs off the async workers.
async fn render_png(ctx: Arc<AppContext>, request: ChartRequest) -> Result<Response, api::ApiError> {
    let bytes = tokio::task::spawn_blocking(move || ctx.render_chart_bytes(&request))
        .await
        .map_err(|err| api::ApiError::internal(format!("render task failed: {err}")))??;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response())
}

async fn not_found() -> api::ApiError {
    api::ApiError::not_found("Route not found")
}
