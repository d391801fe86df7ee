use plotters::{
    drawing::IntoDrawingArea,
    prelude::{
        ChartBuilder, IntoSegmentedCoord, LabelAreaPosition, Rectangle, SVGBackend, SegmentValue,
        WHITE,
    },
    style::{Color, RGBColor},
};
use std::error::Error;
use std::path::{Path, PathBuf};

use crate::error::{AntibiogramError, Result};
use crate::measurement::Measurement;

pub const GRAPHS_DIR: &str = "graphs";
pub const GRAPH_FILE: &str = "antibiogram.svg";

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 800;
const MARGIN: u32 = 100;
const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);

/// Bar chart of measurements in store order, one bar per measurement.
pub fn plot_measurements(measurements: &[Measurement], directory: &Path) -> Result<PathBuf> {
    if measurements.is_empty() {
        return Err(AntibiogramError::InsufficientData {
            required: 1,
            found: 0,
        });
    }
    let directory = directory.join(GRAPHS_DIR);
    std::fs::create_dir_all(&directory)?;
    let output_name = directory.join(GRAPH_FILE);
    draw_bars(measurements, &output_name)
        .map_err(|e| AntibiogramError::Plot(e.to_string()))?;
    Ok(output_name)
}

fn draw_bars(
    measurements: &[Measurement],
    output_name: &Path,
) -> std::result::Result<(), Box<dyn Error>> {
    let diameter_max = measurements
        .iter()
        .map(|measurement| measurement.diameter)
        .fold(0f64, f64::max);
    let diameter_min = measurements
        .iter()
        .map(|measurement| measurement.diameter)
        .fold(0f64, f64::min);

    let root_drawing_area = SVGBackend::new(output_name, (WIDTH, HEIGHT)).into_drawing_area();
    root_drawing_area.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root_drawing_area)
        .caption("Antibiotic Resistance Results", ("sans-serif", 40))
        .set_label_area_size(LabelAreaPosition::Left, MARGIN)
        .set_label_area_size(LabelAreaPosition::Bottom, MARGIN)
        .margin(20)
        .build_cartesian_2d(
            (0..measurements.len()).into_segmented(),
            diameter_min..(diameter_max * 1.1).max(1.0),
        )?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(measurements.len())
        .x_label_formatter(&|segment| match segment {
            SegmentValue::CenterOf(index) => measurements
                .get(*index)
                .map(|measurement| measurement.antibiotic.to_owned())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc("Antibiotic")
        .axis_desc_style(("sans-serif", 30))
        .x_label_style(("sans-serif", 20))
        .y_desc("Inhibition Zone Diameter (mm)")
        .y_label_style(("sans-serif", 20))
        .draw()?;

    ctx.draw_series(measurements.iter().enumerate().map(|(index, measurement)| {
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(index), 0.0),
                (SegmentValue::Exact(index + 1), measurement.diameter),
            ],
            SKY_BLUE.filled(),
        );
        bar.set_margin(0, 0, 5, 5);
        bar
    }))?;

    root_drawing_area.present()?;
    Ok(())
}
