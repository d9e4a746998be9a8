use crate::domain::model::{BenchReport, ChartData};
use crate::utils::error::{BenchError, Result};
use crate::utils::validation::Validate;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error;
use std::ops::Range;
use std::path::Path;

pub const CHART_SIZE: (u32, u32) = (1000, 600);
const BAR_WIDTH: f64 = 0.4;
const MIN_STARTUP_AXIS: f64 = 20.0;
const MIN_TICK_AXIS: f64 = 60.0;
const HEADROOM: f64 = 1.15;

const STARTUP_COLOUR: RGBColor = RGBColor(31, 119, 180);
const TICK_COLOUR: RGBColor = RGBColor(214, 39, 40);
const TARGET_COLOUR: RGBColor = RGBColor(128, 128, 128);

impl Validate for ChartData {
    fn validate(&self) -> Result<()> {
        let len = self.labels.len();
        if len == 0 {
            return Err(BenchError::ChartError {
                message: "Chart needs at least one label".to_string(),
            });
        }
        if self.startup_times.len() != len || self.tick_times_ms.len() != len {
            return Err(BenchError::ChartError {
                message: format!(
                    "Array lengths differ: {} labels, {} startup times, {} tick times",
                    len,
                    self.startup_times.len(),
                    self.tick_times_ms.len()
                ),
            });
        }
        if self.bar_count > len {
            return Err(BenchError::ChartError {
                message: format!("bar_count {} exceeds {} entries", self.bar_count, len),
            });
        }
        let values = self
            .startup_times
            .iter()
            .chain(self.tick_times_ms.iter())
            .chain(std::iter::once(&self.target_tick_ms));
        for value in values {
            if !value.is_finite() || *value < 0.0 {
                return Err(BenchError::ChartError {
                    message: format!("Invalid value {} in chart data", value),
                });
            }
        }
        Ok(())
    }
}

impl ChartData {
    /// Measured startup times from a `metal-bench` report; tick times stay estimates.
    pub fn from_report(report: &BenchReport) -> Result<Self> {
        let defaults = ChartData::default();
        let comparison = &report.comparison;
        let sides = [
            (&comparison.baseline_label, comparison.baseline, defaults.tick_times_ms[0]),
            (&comparison.optimized_label, comparison.optimized, defaults.tick_times_ms[1]),
        ];

        let mut data = ChartData {
            labels: Vec::new(),
            startup_times: Vec::new(),
            tick_times_ms: Vec::new(),
            bar_count: 0,
            ..defaults
        };
        for (label, time, tick) in sides {
            if let Some(time) = time {
                data.labels.push(label.clone());
                data.startup_times.push(time.as_secs());
                data.tick_times_ms.push(tick);
            } else {
                tracing::warn!("⚠️ No startup time for '{}', leaving it off the chart", label);
            }
        }
        data.bar_count = data.labels.len();

        if data.labels.is_empty() {
            return Err(BenchError::ChartError {
                message: "Report contains no measured startup times".to_string(),
            });
        }
        Ok(data)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub center: f64,
    pub left: f64,
    pub right: f64,
    pub height: f64,
}

/// Axis ranges and bar geometry, computed before anything is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub x_range: Range<f64>,
    pub startup_range: Range<f64>,
    pub tick_range: Range<f64>,
    pub bars: Vec<Bar>,
    pub tick_points: Vec<(f64, f64)>,
}

fn axis_max(minimum: f64, values: impl Iterator<Item = f64>) -> f64 {
    let peak = values.fold(0.0f64, f64::max) * HEADROOM;
    if peak > minimum {
        peak.ceil()
    } else {
        minimum
    }
}

impl ChartLayout {
    pub fn for_data(data: &ChartData) -> Self {
        let n = data.labels.len() as f64;
        let bars = data
            .startup_times
            .iter()
            .take(data.bar_count)
            .enumerate()
            .map(|(idx, &height)| {
                let center = idx as f64;
                Bar {
                    center,
                    left: center - BAR_WIDTH / 2.0,
                    right: center + BAR_WIDTH / 2.0,
                    height,
                }
            })
            .collect::<Vec<_>>();

        let tick_points = data
            .tick_times_ms
            .iter()
            .enumerate()
            .map(|(idx, &ms)| (idx as f64, ms))
            .collect();

        let startup_max = axis_max(MIN_STARTUP_AXIS, bars.iter().map(|b| b.height));
        let tick_max = axis_max(
            MIN_TICK_AXIS,
            data.tick_times_ms
                .iter()
                .copied()
                .chain(std::iter::once(data.target_tick_ms)),
        );

        Self {
            x_range: -0.5..n - 0.5,
            startup_range: 0.0..startup_max,
            tick_range: 0.0..tick_max,
            bars,
            tick_points,
        }
    }
}

fn category_label(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn draw<DB>(
    root: DrawingArea<DB, Shift>,
    data: &ChartData,
    layout: &ChartLayout,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&data.title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .right_y_label_area_size(70)
        .build_cartesian_2d(layout.x_range.clone(), layout.startup_range.clone())?
        .set_secondary_coord(layout.x_range.clone(), layout.tick_range.clone());

    let labels = data.labels.clone();
    let label_formatter = move |x: &f64| category_label(&labels, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Server Variant")
        .y_desc("Startup Time (s)")
        .x_labels(data.labels.len() * 2 + 1)
        .x_label_formatter(&label_formatter)
        .axis_desc_style(("sans-serif", 16).into_font().color(&STARTUP_COLOUR))
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_desc("Est. Tick Time (ms) - Lower is Better")
        .axis_desc_style(("sans-serif", 16).into_font().color(&TICK_COLOUR))
        .draw()?;

    chart
        .draw_series(layout.bars.iter().map(|bar| {
            Rectangle::new(
                [(bar.left, 0.0), (bar.right, bar.height)],
                STARTUP_COLOUR.mix(0.6).filled(),
            )
        }))?
        .label("Startup Time")
        .legend(|(x, y)| {
            Rectangle::new(
                [(x, y - 5), (x + 20, y + 5)],
                STARTUP_COLOUR.mix(0.6).filled(),
            )
        });

    let bar_text = ("sans-serif", 14)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(layout.bars.iter().map(|bar| {
        Text::new(
            format!("{:.2}s", bar.height),
            (bar.center, bar.height),
            bar_text.clone(),
        )
    }))?;

    chart
        .draw_secondary_series(DashedLineSeries::new(
            layout.tick_points.clone(),
            10,
            6,
            TICK_COLOUR.stroke_width(2),
        ))?
        .label("Runtime Latency (Est)")
        .legend(|(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], TICK_COLOUR.stroke_width(2))
        });
    chart.draw_secondary_series(
        layout
            .tick_points
            .iter()
            .map(|&point| Circle::new(point, 5, TICK_COLOUR.filled())),
    )?;

    let target = data.target_tick_ms;
    chart
        .draw_secondary_series(DashedLineSeries::new(
            vec![(layout.x_range.start, target), (layout.x_range.end, target)],
            2,
            4,
            TARGET_COLOUR.stroke_width(1),
        ))?
        .label(format!("Target ({}ms)", target))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TARGET_COLOUR));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Renders `data` to `path`; `.svg` selects the SVG backend, anything else is PNG.
pub fn render(data: &ChartData, path: &Path) -> Result<()> {
    data.validate()?;
    let layout = ChartLayout::for_data(data);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let is_svg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    let drawn = if is_svg {
        draw(SVGBackend::new(path, CHART_SIZE).into_drawing_area(), data, &layout)
    } else {
        draw(BitMapBackend::new(path, CHART_SIZE).into_drawing_area(), data, &layout)
    };
    drawn.map_err(|e| BenchError::ChartError {
        message: e.to_string(),
    })?;

    tracing::info!("📈 Chart written to {}", path.display());
    Ok(())
}
