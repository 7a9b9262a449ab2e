//! Augforge CLI - Dataset Augmentation
//!
//! Command-line interface for the Augforge augmentation pipeline.

use clap::Parser;
use env_logger::Env;
use log::info;

use augforge::cli::commands::{self, RunOptions};
use augforge::cli::{Cli, Commands};
use augforge::dataset::DatasetDirs;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("Augforge v{}", env!("CARGO_PKG_VERSION"));

    handle_command(cli.command)
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Effects { plugins } => commands::list_effects(&plugins),
        Commands::NewPipeline {
            path,
            effects,
            copies,
            plugins,
        } => commands::new_pipeline(&path, &effects, copies, &plugins),
        Commands::Run {
            pipeline,
            images,
            labels,
            out_images,
            out_labels,
            config,
            plugins,
            seed,
        } => commands::run(&RunOptions {
            pipeline,
            dirs: DatasetDirs::new(images, labels, out_images, out_labels),
            config,
            plugins,
            seed,
        }),
        Commands::Showcase {
            image,
            label,
            out,
            plugins,
        } => commands::run_showcase(&image, label.as_deref(), &out, &plugins),
    }
}
