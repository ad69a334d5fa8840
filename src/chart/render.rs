//! Draw bar and pie charts to PNG files with plotters.
//!
//! Geometry (bars, slices) is required and any failure is an error. Text layers are
//! best-effort: without a registered font the chart is still written, just unlabeled.

use std::f64::consts::PI;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::chart::fonts::{ensure_font, FONT_FAMILY};
use crate::chart::output::{chart_path, write_atomically};
use crate::chart::series::{CountryShare, YearPopulation};
use crate::chart::ChartKind;
use crate::error::ChartError;

pub const CHART_SIZE: (u32, u32) = (640, 480);

const PALETTE: [RGBColor; 10] = [
    RGBColor(0xFF, 0x57, 0x33),
    RGBColor(0x33, 0xFF, 0x57),
    RGBColor(0x33, 0x66, 0xFF),
    RGBColor(0xFF, 0x33, 0xFF),
    RGBColor(0xFF, 0xC3, 0x00),
    RGBColor(0x33, 0xFF, 0xD0),
    RGBColor(0x80, 0x33, 0xFF),
    RGBColor(0x4C, 0xAF, 0x50),
    RGBColor(0xD5, 0x00, 0xF9),
    RGBColor(0xFF, 0x98, 0x00),
];
const SUBTITLE_COLOR: RGBColor = RGBColor(0x5F, 0x61, 0x5F);
const TICK_COLOR: RGBColor = RGBColor(0x7E, 0x80, 0x7E);
const GRID_COLOR: RGBColor = RGBColor(0xC3, 0xC9, 0xC5);

const PIE_START_ANGLE: f64 = 140.0;
const PIE_RADIUS: f64 = 150.0;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

pub fn palette_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// `12 M` for large values, one decimal below ten million.
pub fn format_millions(value: f64) -> String {
    let millions = value / 1e6;
    if millions.abs() < 10.0 {
        format!("{millions:.1} M")
    } else {
        format!("{millions:.0} M")
    }
}

fn drawing<E: fmt::Display>(err: E) -> ChartError {
    ChartError::Drawing(err.to_string())
}

fn best_effort<T, E: fmt::Display>(layer: &str, result: Result<T, E>) {
    if let Err(err) = result {
        debug!("skipped chart {layer}: {err}");
    }
}

fn text(size: u32) -> TextStyle<'static> {
    (FONT_FAMILY, f64::from(size)).into_font().color(&BLACK)
}

/// Population per year for one country. Returns the written path.
pub fn render_bar(
    series: &[YearPopulation],
    entity: &str,
    dir: &Path,
) -> Result<PathBuf, ChartError> {
    let (Some(min_year), Some(max_year)) = (
        series.iter().map(|point| point.year).min(),
        series.iter().map(|point| point.year).max(),
    ) else {
        return Err(ChartError::EmptySeries(entity.to_string()));
    };

    ensure_font(None);
    fs::create_dir_all(dir)?;
    let path = chart_path(dir, ChartKind::Bar, entity);
    write_atomically(&path, |staging| -> Result<(), ChartError> {
        let root = BitMapBackend::new(staging, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;
        draw_bars(&root, series)?;

        best_effort(
            "title",
            root.draw(&Text::new(format!("Population of {entity}"), (24, 12), text(24))),
        );
        best_effort(
            "subtitle",
            root.draw(&Text::new(
                format!("Population between {min_year} and {max_year}"),
                (24, 44),
                (FONT_FAMILY, 13.0).into_font().color(&SUBTITLE_COLOR),
            )),
        );
        root.present().map_err(drawing)
    })?;

    info!("rendered bar chart for {entity} to '{}'", path.display());
    Ok(path)
}

fn draw_bars(root: &Area<'_>, series: &[YearPopulation]) -> Result<(), ChartError> {
    let count = series.len() as f64;
    let peak = series.iter().map(|point| point.population).max().unwrap_or(0).max(1) as f64;

    let mut chart = ChartBuilder::on(root)
        .margin(16)
        .margin_top(80)
        .x_label_area_size(28)
        .y_label_area_size(72)
        .build_cartesian_2d(0f64..count, 0f64..peak * 1.15)
        .map_err(drawing)?;

    best_effort(
        "mesh",
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(0)
            .y_labels(6)
            .y_label_formatter(&|value| format_millions(*value))
            .y_label_style((FONT_FAMILY, 11.0).into_font().color(&TICK_COLOR))
            .y_desc("Population in Millions")
            .axis_desc_style(text(13))
            .bold_line_style(GRID_COLOR.mix(0.4))
            .light_line_style(WHITE.mix(0.0))
            .draw(),
    );

    chart
        .draw_series(series.iter().enumerate().map(|(index, point)| {
            let x = index as f64;
            Rectangle::new(
                [(x + 0.2, 0.0), (x + 0.8, point.population as f64)],
                palette_color(index).filled(),
            )
        }))
        .map_err(drawing)?;

    let centered_below = text(11).pos(Pos::new(HPos::Center, VPos::Top));
    let centered_above = text(10).pos(Pos::new(HPos::Center, VPos::Bottom));
    for (index, point) in series.iter().enumerate() {
        let x = index as f64 + 0.5;
        let (bar_x, bar_top) = chart.backend_coord(&(x, point.population as f64));
        let (_, axis_y) = chart.backend_coord(&(x, 0.0));

        best_effort(
            "value label",
            root.draw(&Text::new(
                format_millions(point.population as f64),
                (bar_x, bar_top - 3),
                centered_above.clone(),
            )),
        );
        best_effort(
            "year label",
            root.draw(&Text::new(
                point.year.to_string(),
                (bar_x, axis_y + 6),
                centered_below.clone(),
            )),
        );
    }

    Ok(())
}

/// Share of world population for the top countries of a continent.
pub fn render_pie(
    series: &[CountryShare],
    entity: &str,
    top_n: usize,
    dir: &Path,
) -> Result<PathBuf, ChartError> {
    let total: f64 = series.iter().map(|share| share.percentage).sum();
    if series.is_empty() || total.is_nan() || total <= 0.0 {
        return Err(ChartError::EmptySeries(entity.to_string()));
    }

    ensure_font(None);
    fs::create_dir_all(dir)?;
    let path = chart_path(dir, ChartKind::Pie, entity);
    write_atomically(&path, |staging| -> Result<(), ChartError> {
        let root = BitMapBackend::new(staging, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;
        draw_slices(&root, series, total)?;

        best_effort(
            "title",
            root.draw(&Text::new(
                format!("Top {top_n} Population Percentage for {entity}"),
                (CHART_SIZE.0 as i32 / 2, 16),
                text(18).pos(Pos::new(HPos::Center, VPos::Top)),
            )),
        );
        root.present().map_err(drawing)
    })?;

    info!("rendered pie chart for {entity} to '{}'", path.display());
    Ok(path)
}

fn draw_slices(root: &Area<'_>, series: &[CountryShare], total: f64) -> Result<(), ChartError> {
    let center = (CHART_SIZE.0 as i32 / 2, CHART_SIZE.1 as i32 / 2 + 20);

    root.draw(&Circle::new(
        (center.0 + 4, center.1 + 4),
        PIE_RADIUS as i32,
        BLACK.mix(0.15).filled(),
    ))
    .map_err(drawing)?;

    let mut start = PIE_START_ANGLE;
    for (index, share) in series.iter().enumerate() {
        let sweep = share.percentage / total * 360.0;
        root.draw(&Polygon::new(
            sector_points(center, PIE_RADIUS, start, sweep),
            palette_color(index).filled(),
        ))
        .map_err(drawing)?;

        let middle = start + sweep / 2.0;
        let (label_x, label_y) = polar(center, PIE_RADIUS * 1.12, middle);
        let hpos = if label_x >= center.0 { HPos::Left } else { HPos::Right };
        best_effort(
            "slice label",
            root.draw(&Text::new(
                share.country.clone(),
                (label_x, label_y),
                text(12).pos(Pos::new(hpos, VPos::Center)),
            )),
        );
        best_effort(
            "percentage label",
            root.draw(&Text::new(
                format!("{:.1}%", share.percentage / total * 100.0),
                polar(center, PIE_RADIUS * 0.6, middle),
                text(11).pos(Pos::new(HPos::Center, VPos::Center)),
            )),
        );

        start += sweep;
    }
    Ok(())
}

/// Pixel position at `radius` and `degrees` (counter-clockwise from 3 o'clock).
fn polar(center: (i32, i32), radius: f64, degrees: f64) -> (i32, i32) {
    let radians = degrees * PI / 180.0;
    (
        center.0 + (radius * radians.cos()).round() as i32,
        center.1 - (radius * radians.sin()).round() as i32,
    )
}

fn sector_points(center: (i32, i32), radius: f64, start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = (sweep.abs().ceil() as usize).max(2);
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for step in 0..=steps {
        points.push(polar(center, radius, start + sweep * step as f64 / steps as f64));
    }
    points
}
