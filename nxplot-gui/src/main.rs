//! NXPlot GUI application entry point.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod message;
mod pipeline;
mod state;
mod ui;
mod util;
mod viewer;

use std::path::{Path, PathBuf};

use anyhow::Context;
use app::NxPlotApp;
use clap::Parser;
use eframe::egui;
use nxplot_view::PlotConfig;

#[derive(Parser, Debug)]
#[command(name = "nxplot-gui", version, about = "Desktop viewer for NeXus NXdata groups")]
struct Args {
    /// JSON file with plot settings
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn plot_config(&self) -> anyhow::Result<PlotConfig> {
        self.config
            .as_deref()
            .map_or_else(|| Ok(PlotConfig::default()), read_config)
    }
}

fn read_config(path: &Path) -> anyhow::Result<PlotConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::init();
    let config = args.plot_config()?;
    log::info!("starting with {config:?}");
    let opts = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "NXPlot",
        opts,
        Box::new(|cc| {
            ui::theme::configure_style(&cc.egui_ctx);
            Ok(Box::new(NxPlotApp::new(config)))
        }),
    )
    .map_err(|err| anyhow::anyhow!("{err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"slideshow_interval_ms": 250}}"#).unwrap();
        let config = read_config(file.path()).unwrap();
        assert_eq!(config.slideshow_interval_ms, 250);
        assert!(config.summed);
    }

    #[test]
    fn test_config_argument() {
        let args = Args::try_parse_from(["nxplot-gui", "--config=plot.json"]).unwrap();
        assert_eq!(args.config.as_deref(), Some(Path::new("plot.json")));
        let args = Args::try_parse_from(["nxplot-gui"]).unwrap();
        assert_eq!(args.plot_config().unwrap(), PlotConfig::default());
        assert!(Args::try_parse_from(["nxplot-gui", "--colour"]).is_err());
    }

    #[test]
    fn test_read_config_missing() {
        assert!(read_config(Path::new("/nonexistent/nxplot.json")).is_err());
    }
}
