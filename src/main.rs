#[macro_use]
extern crate tracing;

use std::env;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use trellis::backend::Headless;
use trellis::cli::{Cli, HeadlessOutput, Sub};
use trellis::config::config_path;
use trellis::layout::{LayoutElement, OutputLayoutManager};
use trellis::utils::geometry::Rectangle;
use trellis::utils::version;
use trellis::window::{Mapped, WindowId};
use trellis_config::Config;
use trellis_ipc::OutputHead;

#[derive(Serialize)]
struct LayoutReport {
    outputs: Vec<OutputHead>,
    windows: Vec<WindowReport>,
}

#[derive(Serialize)]
struct WindowReport {
    id: WindowId,
    title: String,
    hidden: bool,
    geometry: Rectangle,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let directives = env::var("RUST_LOG").unwrap_or_else(|_| "trellis=debug,info".to_owned());
    let env_filter = EnvFilter::builder().parse_lossy(directives);
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();

    let _client = tracy_client::Client::start();

    debug!("starting version {}", &version());

    let path = config_path(cli.config)?;
    let config = path.load()?;

    match cli.subcommand {
        Sub::Validate => {
            info!("config is valid");
        }
        Sub::Layout {
            outputs,
            windows,
            json,
        } => {
            let report = run_layout(&config, &outputs, windows);
            if json {
                let report = serde_json::to_string_pretty(&report)?;
                println!("{report}");
            } else {
                print_report(&report);
            }
        }
    }

    Ok(())
}

fn run_layout(config: &Config, outputs: &[HeadlessOutput], windows: usize) -> LayoutReport {
    let _span = tracy_client::span!("run_layout");

    let mut backend = Headless::new();
    let mut layout = OutputLayoutManager::<Mapped>::new(config);

    for output in outputs {
        layout.on_monitor_attach(output.device(), &mut backend);
    }

    let mut ids = Vec::with_capacity(windows);
    for i in 0..windows {
        let window = Mapped::new(format!("window {}", i + 1));
        ids.push(*window.id());
        layout.add_window(window, true, &mut backend);
    }

    layout.tile_active();

    let windows = ids
        .iter()
        .filter_map(|id| layout.find_window(id))
        .map(|win| WindowReport {
            id: *win.id(),
            title: win.title().to_owned(),
            hidden: win.is_hidden(),
            geometry: win.geometry(),
        })
        .collect();

    LayoutReport {
        outputs: layout.snapshot(),
        windows,
    }
}

fn print_report(report: &LayoutReport) {
    for head in &report.outputs {
        print!("Output \"{}\"", head.name);
        match head.current_mode {
            Some(mode) if head.enabled => println!(": {mode} at x={} y={}", head.x, head.y),
            _ => println!(": disabled"),
        }
    }

    if report.windows.is_empty() {
        return;
    }

    println!();
    for win in &report.windows {
        let state = if win.hidden { " (hidden)" } else { "" };
        println!("Window {} \"{}\": {}{state}", win.id, win.title, win.geometry);
    }
}
