//! CLI Module
//!
//! Command-line interface for the Augforge augmentation pipeline.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Augforge - image + bounding-box augmentation for detector datasets
#[derive(Parser, Debug)]
#[command(name = "augforge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered effect types and their default parameters
    #[command(name = "effects")]
    Effects {
        /// Extra plugin directories, scanned after the built-in set
        #[arg(short, long = "plugins")]
        plugins: Vec<PathBuf>,
    },

    /// Write a new pipeline document
    #[command(name = "new-pipeline")]
    NewPipeline {
        /// Where to write the document
        path: PathBuf,

        /// Effect type to append (repeatable, in order)
        #[arg(short, long = "effect")]
        effects: Vec<String>,

        /// Augmented copies per source image
        #[arg(short, long, default_value_t = 5)]
        copies: usize,

        /// Extra plugin directories
        #[arg(long = "plugins")]
        plugins: Vec<PathBuf>,
    },

    /// Augment a dataset
    #[command(name = "run")]
    Run {
        /// Pipeline document
        #[arg(short, long)]
        pipeline: PathBuf,

        /// Source images directory
        #[arg(long)]
        images: PathBuf,

        /// Source labels directory
        #[arg(long)]
        labels: PathBuf,

        /// Output images directory
        #[arg(long)]
        out_images: PathBuf,

        /// Output labels directory
        #[arg(long)]
        out_labels: PathBuf,

        /// Run configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Extra plugin directories
        #[arg(long = "plugins")]
        plugins: Vec<PathBuf>,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Apply every effect alone to one image and save the results
    #[command(name = "showcase")]
    Showcase {
        /// Source image
        #[arg(short, long)]
        image: PathBuf,

        /// Label file for the image
        #[arg(short, long)]
        label: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        /// Extra plugin directories
        #[arg(long = "plugins")]
        plugins: Vec<PathBuf>,
    },
}
