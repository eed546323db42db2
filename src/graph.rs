#![cfg(not(tarpaulin_include))]
use plotters::prelude::*;
use std::error::Error as StdError;
use std::f64::consts::PI;
use std::path::Path;
use std::str::FromStr;

use crate::dashboard::{ChartEntry, DashboardData};
use crate::error::{Error, Result};

/// Colours used for bars and slices, cycled in order
const PALETTE: [RGBColor; 5] = [
    RGBColor(0x00, 0x88, 0xFE),
    RGBColor(0x00, 0xC4, 0x9F),
    RGBColor(0xFF, 0xBB, 0x28),
    RGBColor(0xFF, 0x80, 0x42),
    RGBColor(0x88, 0x84, 0xD8),
];

/// Line colour of the age chart
const LINE_COLOR: RGBColor = RGBColor(0x88, 0x84, 0xD8);

fn palette(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// The charts shown on the dashboard
///
/// Each one has a fixed file name under `/dashboard/charts/`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    /// Bar chart of students per course
    Course,

    /// Pie chart of students per gender
    Gender,

    /// Line chart of students per five-year age group
    Age,
}

impl ChartKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ChartKind::Course => "course.png",
            ChartKind::Gender => "gender.png",
            ChartKind::Age => "age.png",
        }
    }

    /// Default look for this chart
    pub fn options(&self) -> GraphOptions {
        let (title, x_label) = match self {
            ChartKind::Course => ("Course Distribution", "Course"),
            ChartKind::Gender => ("Gender Distribution", ""),
            ChartKind::Age => ("Age Distribution", "Age group"),
        };

        GraphOptions {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: "Students".to_string(),
            ..GraphOptions::default()
        }
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim_end_matches(".png") {
            "course" => Ok(ChartKind::Course),
            "gender" => Ok(ChartKind::Gender),
            "age" => Ok(ChartKind::Age),
            other => Err(format!("Unknown chart: {}", other)),
        }
    }
}

/// Configuration options for chart rendering
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Title displayed at the top of the chart
    pub title: String,

    /// Label for the X-axis
    pub x_label: String,

    /// Label for the Y-axis
    pub y_label: String,

    /// Width of the image in pixels
    pub width: u32,

    /// Height of the image in pixels
    pub height: u32,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            title: "Chart".to_string(),
            x_label: String::new(),
            y_label: String::new(),
            width: 640,
            height: 360,
        }
    }
}

/// Render one dashboard chart as PNG
///
/// # Arguments
/// * `kind` - Which chart to draw
/// * `data` - Dashboard figures to draw it from
///
/// # Returns
/// * `Result<Vec<u8>>` - PNG bytes, or an error if the series is empty or drawing fails
pub fn render_chart(kind: ChartKind, data: &DashboardData) -> Result<Vec<u8>> {
    let entries = match kind {
        ChartKind::Course => &data.course_data,
        ChartKind::Gender => &data.gender_data,
        ChartKind::Age => &data.age_data,
    };

    if entries.is_empty() {
        return Err(Error::Chart(format!("no data for {}", kind.file_name())));
    }

    let options = kind.options();
    let file = tempfile::Builder::new()
        .prefix("chart-")
        .suffix(".png")
        .tempfile()?;

    let drawn = match kind {
        ChartKind::Course => draw_bar_chart(file.path(), entries, &options),
        ChartKind::Gender => draw_pie_chart(file.path(), entries, &options),
        ChartKind::Age => draw_line_chart(file.path(), entries, &options),
    };
    drawn.map_err(|e| Error::Chart(e.to_string()))?;

    Ok(std::fs::read(file.path())?)
}

// Axis label for a category index; blank between categories.
fn category_label(entries: &[ChartEntry], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    entries
        .get(index as usize)
        .map(|e| e.name.clone())
        .unwrap_or_default()
}

fn max_value(entries: &[ChartEntry]) -> f64 {
    entries.iter().map(|e| e.value).max().unwrap_or(0) as f64 + 1.0
}

/// Draws a bar per entry, coloured from the palette
fn draw_bar_chart(
    path: &Path,
    entries: &[ChartEntry],
    options: &GraphOptions,
) -> std::result::Result<(), Box<dyn StdError>> {
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = -0.5..entries.len() as f64 - 0.5;
    let mut chart = ChartBuilder::on(&root)
        .caption(&options.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(x_range, 0.0..max_value(entries))?;

    let label = |x: &f64| category_label(entries, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(entries.len())
        .x_label_formatter(&label)
        .y_label_formatter(&|y| format!("{:.0}", y))
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    chart.draw_series(entries.iter().enumerate().map(|(i, entry)| {
        let x = i as f64;
        Rectangle::new(
            [(x - 0.35, 0.0), (x + 0.35, entry.value as f64)],
            palette(i).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Draws one slice per entry, labelled `name (pct%)`
fn draw_pie_chart(
    path: &Path,
    entries: &[ChartEntry],
    options: &GraphOptions,
) -> std::result::Result<(), Box<dyn StdError>> {
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(&options.title, ("sans-serif", 24).into_font())?;

    let (width, height) = area.dim_in_pixel();
    let center = (width as f64 / 2.0, height as f64 / 2.0);
    let radius = width.min(height) as f64 * 0.35;
    let total: usize = entries.iter().map(|e| e.value).sum();

    let mut start = -PI / 2.0;
    for (i, entry) in entries.iter().enumerate() {
        let share = entry.value as f64 / total as f64;
        let sweep = share * 2.0 * PI;
        let steps = ((sweep / (2.0 * PI)) * 90.0).ceil().max(2.0) as usize;

        let mut points = vec![(center.0 as i32, center.1 as i32)];
        for step in 0..=steps {
            let angle = start + sweep * step as f64 / steps as f64;
            points.push(point_on_circle(center, radius, angle));
        }
        area.draw(&Polygon::new(points, palette(i).filled()))?;

        let middle = start + sweep / 2.0;
        let (lx, ly) = point_on_circle(center, radius + 18.0, middle);
        let text = format!("{} ({:.0}%)", entry.name, share * 100.0);
        let anchor_left = middle.cos() < 0.0;
        let offset = if anchor_left { text.len() as i32 * 7 } else { 0 };
        area.draw(&Text::new(
            text,
            (lx - offset, ly - 7),
            ("sans-serif", 14).into_font(),
        ))?;

        start += sweep;
    }

    root.present()?;
    Ok(())
}

fn point_on_circle(center: (f64, f64), radius: f64, angle: f64) -> (i32, i32) {
    (
        (center.0 + radius * angle.cos()) as i32,
        (center.1 + radius * angle.sin()) as i32,
    )
}

/// Draws the entries as a line with a marker on each point
fn draw_line_chart(
    path: &Path,
    entries: &[ChartEntry],
    options: &GraphOptions,
) -> std::result::Result<(), Box<dyn StdError>> {
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = -0.5..entries.len() as f64 - 0.5;
    let mut chart = ChartBuilder::on(&root)
        .caption(&options.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(x_range, 0.0..max_value(entries))?;

    let label = |x: &f64| category_label(entries, *x);
    chart
        .configure_mesh()
        .x_labels(entries.len())
        .x_label_formatter(&label)
        .y_label_formatter(&|y| format!("{:.0}", y))
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    let points: Vec<(f64, f64)> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (i as f64, e.value as f64))
        .collect();

    chart.draw_series(LineSeries::new(points.clone(), LINE_COLOR.stroke_width(2)))?;
    chart.draw_series(
        points
            .into_iter()
            .map(|p| Circle::new(p, 4, LINE_COLOR.filled())),
    )?;

    root.present()?;
    Ok(())
}
