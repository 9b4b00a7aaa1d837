//! nxplot: inspect, project and render NeXus data from the command line.
//!
//! Projections are written as JSON documents that `project` and `render`
//! accept as input again, so a projection can be projected further.

mod document;

use clap::{ArgAction, Parser, Subcommand};
use log::info;

use nxplot_core::NxData;
use nxplot_view::{PlotConfig, PlotOptions, PlotView, RecordingRenderer};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    NxplotIo(#[from] nxplot_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] nxplot_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    Argument(String),
}

/// Inspect, project and render NeXus data.
#[derive(Parser)]
#[command(name = "nxplot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Plot settings (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the NXdata groups of a file
    Inspect {
        /// Input NeXus file
        input: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Project a group onto one or two dimensions and write it as JSON
    Project {
        /// Input NeXus file or JSON document
        input: PathBuf,

        /// NXdata group path (default: first group with a signal)
        #[arg(short, long)]
        group: Option<String>,

        /// Dimension for the horizontal axis
        #[arg(long)]
        x: Option<usize>,

        /// Dimension for the vertical axis (omit with --x for a 1-D projection)
        #[arg(long)]
        y: Option<usize>,

        /// Value limits of a dimension, as DIM=LO:HI (repeatable)
        #[arg(long = "limit", value_parser = parse_limit)]
        limits: Vec<(usize, f64, f64)>,

        /// Sum over collapsed ranges instead of taking their first index
        #[arg(long, action = ArgAction::Set)]
        summed: Option<bool>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Plot a group and print the resolved scene as JSON
    Render {
        /// Input NeXus file or JSON document
        input: PathBuf,

        /// NXdata group path (default: first group with a signal)
        #[arg(short, long)]
        group: Option<String>,

        /// Log intensity scale
        #[arg(long)]
        log: bool,

        /// Log x axis
        #[arg(long)]
        logx: bool,

        /// Log y axis
        #[arg(long)]
        logy: bool,

        /// Colormap name
        #[arg(long)]
        cmap: Option<String>,

        /// Lower intensity limit
        #[arg(long, allow_negative_numbers = true)]
        vmin: Option<f64>,

        /// Upper intensity limit
        #[arg(long, allow_negative_numbers = true)]
        vmax: Option<f64>,

        /// Treat the last dimension as RGB(A) channels
        #[arg(long)]
        image: bool,
    },
}

fn parse_limit(text: &str) -> std::result::Result<(usize, f64, f64), String> {
    let (dim, range) = text
        .split_once('=')
        .ok_or_else(|| format!("expected DIM=LO:HI, got {text}"))?;
    let (lo, hi) = range
        .split_once(':')
        .ok_or_else(|| format!("expected LO:HI, got {range}"))?;
    let dim = dim.trim().parse().map_err(|e| format!("dimension {dim}: {e}"))?;
    let lo = lo.trim().parse().map_err(|e| format!("limit {lo}: {e}"))?;
    let hi = hi.trim().parse().map_err(|e| format!("limit {hi}: {e}"))?;
    Ok((dim, lo, hi))
}

fn load_config(path: Option<&Path>) -> Result<PlotConfig> {
    match path {
        Some(path) => {
            let file = std::fs::File::open(path)?;
            Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
        }
        None => Ok(PlotConfig::default()),
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(feature = "hdf5")]
fn load(input: &Path, group: Option<&str>) -> Result<NxData> {
    if is_json(input) {
        return document::read(input);
    }
    let group = match group {
        Some(group) => group.to_string(),
        None => nxplot_io::list_nxdata(input)?
            .into_iter()
            .find(|info| info.signal.is_some())
            .map(|info| info.path)
            .ok_or_else(|| {
                CliError::Argument(format!("{} has no plottable NXdata group", input.display()))
            })?,
    };
    Ok(nxplot_io::read_nxdata(input, &group)?)
}

#[cfg(not(feature = "hdf5"))]
fn load(input: &Path, _group: Option<&str>) -> Result<NxData> {
    if is_json(input) {
        return document::read(input);
    }
    Err(CliError::Argument(format!(
        "{}: built without HDF5 support",
        input.display()
    )))
}

fn inspect(input: &Path, as_json: bool) -> Result<()> {
    #[cfg(feature = "hdf5")]
    let groups = nxplot_io::list_nxdata(input)?;
    #[cfg(not(feature = "hdf5"))]
    let groups: Vec<nxplot_io::NxDataInfo> = {
        return Err(CliError::Argument(format!(
            "{}: built without HDF5 support",
            input.display()
        )));
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else {
        println!("File: {}", input.display());
        for info in &groups {
            println!("  {info}");
            if let Some(title) = &info.title {
                println!("    title: {title}");
            }
        }
        println!("{} NXdata group(s)", groups.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect { input, json } => inspect(&input, json)?,

        Commands::Project {
            input,
            group,
            x,
            y,
            limits,
            summed,
            output,
        } => {
            let data = load(&input, group.as_deref())?;
            let mut view = PlotView::new("project", config, RecordingRenderer::new());
            view.plot(data.shared(), &PlotOptions::default())?;

            let panel = view.open_panel()?;
            match (x, y) {
                (Some(x), y) => {
                    panel.set_x(x);
                    panel.set_y(y);
                }
                (None, Some(y)) => panel.set_y(Some(y)),
                (None, None) => {}
            }
            for (dim, lo, hi) in limits {
                panel.set_limits(dim, lo, hi);
            }
            if let Some(summed) = summed {
                panel.set_summed(summed);
            }

            let projected = view.project()?;
            info!("Projected to shape {:?}", projected.shape());
            let text = serde_json::to_string_pretty(&document::DataDocument::from_data(&projected)?)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, text)?;
                    println!("Wrote {:?} projection to {}", projected.shape(), path.display());
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    writeln!(stdout, "{text}")?;
                }
            }
        }

        Commands::Render {
            input,
            group,
            log,
            logx,
            logy,
            cmap,
            vmin,
            vmax,
            image,
        } => {
            let data = load(&input, group.as_deref())?;
            let options = PlotOptions {
                log,
                logx,
                logy,
                cmap,
                vmin,
                vmax,
                image,
                ..PlotOptions::default()
            };
            let mut view = PlotView::new("render", config, RecordingRenderer::new());
            view.plot(data.shared(), &options)?;
            let scene = view
                .scene()
                .ok_or_else(|| CliError::Argument("nothing was rendered".to_string()))?;
            println!(
                "{}",
                serde_json::to_string_pretty(&document::scene_summary(scene))?
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn};
    use nxplot_core::NxField;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit("2=0.5:-1"), Ok((2, 0.5, -1.0)));
        assert!(parse_limit("2:0:1").is_err());
        assert!(parse_limit("x=0:1").is_err());
    }

    #[test]
    fn test_document_keeps_nan() {
        let values = Array::from_shape_vec(IxDyn(&[2, 2]), vec![1.0, f64::NAN, 3.0, 4.0]).unwrap();
        let data = NxData::new(NxField::new("counts", values)).with_title("t");
        let text = serde_json::to_string(&document::DataDocument::from_data(&data).unwrap()).unwrap();
        assert!(text.contains("null"));
        let back: document::DataDocument = serde_json::from_str(&text).unwrap();
        let back = back.into_data().unwrap();
        assert_eq!(back.shape(), &[2, 2]);
        assert!(back.signal().unwrap().values[[0, 1]].is_nan());
        assert_eq!(back.title.as_deref(), Some("t"));
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"overlay_padding": 0.1, "autoscale": true}"#).unwrap();
        let config = load_config(Some(path.as_path())).unwrap();
        assert!(config.autoscale);
        assert!((config.overlay_padding - 0.1).abs() < 1e-12);
        assert_eq!(config.slideshow_interval_ms, 1000);
    }
}
