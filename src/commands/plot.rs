use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};

use super::trajectory::Trajectory;
use crate::error::{HandtraceError, Result};

#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub yaw: f64,
    pub pitch: f64,
    pub scale: f64,
}

impl RenderOptions {
    /// Defaults for `input`: the plot lands next to it as `<stem>.svg`.
    pub fn for_input(input: &Path) -> Self {
        Self {
            output: input.with_extension("svg"),
            width: 1200,
            height: 600,
            yaw: 0.5,
            pitch: 0.3,
            scale: 0.8,
        }
    }
}

/// Render both trajectories side by side and return the written path.
pub fn render(pair: &(Trajectory, Trajectory), options: &RenderOptions) -> Result<PathBuf> {
    draw(pair, options)
        .map_err(|e| HandtraceError::Custom(format!("Rendering failed: {e}")))?;
    tracing::info!(
        "Plotted {} and {} points to {}",
        pair.0.len(),
        pair.1.len(),
        options.output.display()
    );
    Ok(options.output.clone())
}

fn draw(
    pair: &(Trajectory, Trajectory),
    options: &RenderOptions,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root =
        SVGBackend::new(&options.output, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((1, 2));
    for (area, trajectory) in panels.iter().zip([&pair.0, &pair.1]) {
        draw_panel(area, trajectory, options)?;
    }

    root.present()?;
    Ok(())
}

fn draw_panel(
    area: &DrawingArea<SVGBackend<'_>, plotters::coord::Shift>,
    trajectory: &Trajectory,
    options: &RenderOptions,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let [xr, yr, zr] = axis_ranges(trajectory);

    let mut chart = ChartBuilder::on(area)
        .caption(&trajectory.field, ("sans-serif", 20).into_font())
        .margin(20)
        .build_cartesian_3d(xr.clone(), yr.clone(), zr.clone())?;

    chart.with_projection(|mut pb| {
        pb.yaw = options.yaw;
        pb.pitch = options.pitch;
        pb.scale = options.scale;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .draw()?;

    let points: Vec<(f64, f64, f64)> = trajectory.points.iter().map(|p| p.as_tuple()).collect();

    chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
    chart.draw_series(points.iter().map(|&p| Circle::new(p, 3, RED.filled())))?;

    let labels = [
        ("X", (xr.end, yr.start, zr.start)),
        ("Y", (xr.start, yr.end, zr.start)),
        ("Z", (xr.start, yr.start, zr.end)),
    ];
    chart.draw_series(
        labels
            .into_iter()
            .map(|(label, pos)| Text::new(label, pos, ("sans-serif", 16).into_font())),
    )?;

    Ok(())
}

/// Data extents per axis. A flat axis is widened by 0.5 each way; no data gives 0..1.
fn axis_ranges(trajectory: &Trajectory) -> [Range<f64>; 3] {
    match trajectory.bounds() {
        None => [0.0..1.0, 0.0..1.0, 0.0..1.0],
        Some(bounds) => bounds.map(|(lo, hi)| {
            if lo == hi {
                (lo - 0.5)..(hi + 0.5)
            } else {
                lo..hi
            }
        }),
    }
}

/// Hand the rendered file to the platform viewer and return immediately.
pub fn open_in_viewer(path: &Path) -> Result<()> {
    let mut cmd = if cfg!(target_os = "windows") {
        let mut c = std::process::Command::new("cmd.exe");
        c.args(["/c", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        std::process::Command::new("open")
    } else {
        std::process::Command::new("xdg-open")
    };

    cmd.arg(path)
        .spawn()
        .map_err(|e| HandtraceError::Custom(format!("Failed to open {}: {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::trajectory::Point3;

    fn trajectory(field: &str, points: &[(f64, f64, f64)]) -> Trajectory {
        Trajectory {
            field: field.into(),
            points: points.iter().map(|&(x, y, z)| Point3::new(x, y, z)).collect(),
        }
    }

    #[test]
    fn test_axis_ranges() {
        let t = trajectory("a", &[(0.0, 1.0, 2.0), (1.0, 1.0, -2.0)]);
        assert_eq!(axis_ranges(&t), [0.0..1.0, 0.5..1.5, -2.0..2.0]);

        let empty = trajectory("a", &[]);
        assert_eq!(axis_ranges(&empty), [0.0..1.0, 0.0..1.0, 0.0..1.0]);
    }

    #[test]
    fn test_render_writes_both_panels() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = RenderOptions::for_input(&dir.path().join("capture.json"));
        options.width = 800;
        options.height = 400;

        let pair = (
            trajectory("palmNormal", &[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0)]),
            trajectory("stabilizedPalmPosition", &[(1.0, 1.0, 1.0), (2.0, 2.0, 2.0)]),
        );
        let written = render(&pair, &options).unwrap();
        assert_eq!(written, dir.path().join("capture.svg"));

        let svg = std::fs::read_to_string(&written).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("palmNormal"));
        assert!(svg.contains("stabilizedPalmPosition"));
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn test_render_empty_trajectories() {
        let dir = tempfile::tempdir().unwrap();
        let options = RenderOptions::for_input(&dir.path().join("empty.json"));
        let pair = (trajectory("a", &[]), trajectory("b", &[]));
        let written = render(&pair, &options).unwrap();
        assert!(written.exists());
    }
}
