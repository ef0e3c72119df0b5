use chrono::NaiveDate;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::pipeline::{PredictionResult, RequestSource};
use crate::time_index::{date_from_index, index_from_date};

const OBSERVED: RGBColor = RGBColor(122, 122, 122);
const OBSERVED_POINT: RGBColor = RGBColor(255, 165, 0);
const FITTED: RGBColor = RGBColor(0, 204, 102);
const AUTOMATIC: RGBColor = RGBColor(0, 122, 204);
const MANUAL: RGBColor = RGBColor(255, 51, 170);

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightPoint {
    pub timestamp: NaiveDate,
    pub value: f64,
    pub label: String,
    pub source: RequestSource,
}

impl HighlightPoint {
    pub fn from_result(result: &PredictionResult) -> Self {
        HighlightPoint {
            timestamp: result.timestamp,
            value: result.value,
            label: format!("{:.8}", result.value),
            source: result.source,
        }
    }
}

/// Everything a renderer needs to draw one chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub historical: Vec<(NaiveDate, f64)>,
    pub fitted: Vec<(NaiveDate, f64)>,
    pub highlights: Vec<HighlightPoint>,
}

pub trait SeriesRenderer {
    fn render(&self, chart: &ChartData) -> Result<()>;
}

/// Writes the chart as a PNG bitmap.
pub struct PlottersRenderer {
    path: PathBuf,
    size: (u32, u32),
    title: String,
}

impl PlottersRenderer {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        PlottersRenderer {
            path: path.as_ref().to_path_buf(),
            size: (1200, 600),
            title: "NO2 Concentration Prediction".to_string(),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

fn highlight_color(source: RequestSource) -> RGBColor {
    match source {
        RequestSource::Automatic => AUTOMATIC,
        RequestSource::ManualIndex | RequestSource::ManualDate => MANUAL,
    }
}

/// Padded `[min, max]` of all values, never zero-width.
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let pad = if hi > lo { (hi - lo) * 0.1 } else { 1.0 };
    (lo - pad, hi + pad)
}

impl SeriesRenderer for PlottersRenderer {
    fn render(&self, data: &ChartData) -> Result<()> {
        let origin = data
            .historical
            .first()
            .map(|(t, _)| *t)
            .ok_or_else(|| Error::Render("no historical data to draw".to_string()))?;
        let x = |t: &NaiveDate| index_from_date(origin, *t);

        let x_values = data
            .historical
            .iter()
            .chain(data.fitted.iter())
            .map(|(t, _)| x(t))
            .chain(data.highlights.iter().map(|p| x(&p.timestamp)));
        let (x_min, x_max) = x_values.fold((i64::MAX, i64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));

        let (y_min, y_max) = value_range(
            data.historical
                .iter()
                .chain(data.fitted.iter())
                .map(|(_, v)| *v)
                .chain(data.highlights.iter().map(|p| p.value)),
        );

        let root = BitMapBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, ("sans-serif", 30))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min - 1..x_max + 2, y_min..y_max)
            .map_err(render_err)?;

        let date_label = |d: &i64| {
            date_from_index(origin, *d)
                .map(|date| date.format("%d-%m-%Y").to_string())
                .unwrap_or_default()
        };

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("NO2 (µg/m³)")
            .x_label_formatter(&date_label)
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(LineSeries::new(
                data.historical.iter().map(|(t, v)| (x(t), *v)),
                OBSERVED.stroke_width(2),
            ))
            .map_err(render_err)?
            .label("Observed")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], OBSERVED));

        chart
            .draw_series(
                data.historical
                    .iter()
                    .map(|(t, v)| Circle::new((x(t), *v), 4, OBSERVED_POINT.filled())),
            )
            .map_err(render_err)?;

        chart
            .draw_series(LineSeries::new(
                data.fitted.iter().map(|(t, v)| (x(t), *v)),
                FITTED.stroke_width(2),
            ))
            .map_err(render_err)?
            .label("Model fit")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], FITTED));

        chart
            .draw_series(data.highlights.iter().map(|p| {
                let color = highlight_color(p.source);
                EmptyElement::at((x(&p.timestamp), p.value))
                    + Circle::new((0, 0), 6, color.filled())
                    + Text::new(
                        p.label.clone(),
                        (8, -18),
                        ("sans-serif", 15).into_font().color(&color),
                    )
            }))
            .map_err(render_err)?;

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        info!(path = %self.path.display(), "chart written");
        Ok(())
    }
}
