use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("creating plots directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to render plot: {0}")]
    Render(String),
}

/// Renders the bankroll trajectory as a PNG line chart.
///
/// Rendering runs under `catch_unwind`: plotters panics on hosts without
/// font support, and a missing chart should not take down the run.
pub fn render_bankroll_curve(
    points: &[(usize, f64)],
    dir: impl AsRef<Path>,
) -> Result<PathBuf, PlotError> {
    let dir = dir.as_ref();
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)?;
    }
    let output_path = dir.join("bankroll_curve.png");
    let points = points.to_vec();

    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));

    let plot_attempt = std::panic::catch_unwind(move || {
        let root = BitMapBackend::new(&output_path, (960, 540)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| PlotError::Render(e.to_string()))?;

        let max_round = points.last().map(|(round, _)| *round).unwrap_or(1).max(1);
        let (mut y_min, mut y_max) = points
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), (_, y)| {
                (lo.min(*y), hi.max(*y))
            });
        if !y_min.is_finite() || !y_max.is_finite() {
            y_min = 0.0;
            y_max = 1.0;
        }
        let margin = ((y_max - y_min).abs() * 0.1).max(1.0);

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption("Bankroll per round", ("sans-serif", 22))
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(0..max_round, (y_min - margin)..(y_max + margin))
            .map_err(|e| PlotError::Render(e.to_string()))?;

        chart
            .configure_mesh()
            .y_desc("Bankroll ($)")
            .x_desc("Round")
            .draw()
            .map_err(|e| PlotError::Render(e.to_string()))?;

        let path: Vec<(usize, f64)> = points.to_vec();
        chart
            .draw_series(std::iter::once(PathElement::new(path, BLUE)))
            .map_err(|e| PlotError::Render(e.to_string()))?;

        drop(chart);

        root.present()
            .map_err(|e| PlotError::Render(e.to_string()))?;

        drop(root);

        Ok(output_path)
    });

    std::panic::set_hook(prev_hook);

    match plot_attempt {
        Ok(result) => result,
        Err(_) => Err(PlotError::Render(
            "plotters panicked while rendering (missing font support?)".into(),
        )),
    }
}
