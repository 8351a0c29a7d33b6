use clap::Parser;
use std::path::PathBuf;

use crate::StrokeMode;

/// Convert a collection of SVG strokes into a font.
#[derive(Clone, Parser)]
#[command(name = "strokes2font", version)]
#[command(about = "Convert a collection of svg strokes into a font")]
pub struct Cli {
    /// Directory containing the SVG files. Required here or in the config file.
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Output directory for the packaged font. Default: ./dist/font.
    #[arg(long, value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Directory for processed SVGs before packaging. Default: ./dist/temp.
    #[arg(long, value_name = "DIR")]
    pub temp: Option<PathBuf>,

    /// Number of files processed in parallel. Default: 1.
    #[arg(long, short = 'c', value_parser = clap::value_parser!(u32).range(1..))]
    pub concurrency: Option<u32>,

    /// Vector operation applied by the external tool. Default: stroke-to-path.
    #[arg(long, value_enum)]
    pub mode: Option<StrokeMode>,

    /// Only files with this extension are processed. Default: svg.
    #[arg(long)]
    pub extension: Option<String>,

    /// External vector tool. Default: inkscape (or STROKES2FONT_INKSCAPE).
    #[arg(long, value_name = "PROGRAM")]
    pub inkscape: Option<PathBuf>,

    /// Font packager. Default: svgtofont (or STROKES2FONT_PACKAGER).
    #[arg(long, value_name = "PROGRAM")]
    pub packager: Option<PathBuf>,

    /// Kill the external tool if one file takes longer than this many seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Strict mode: skip packaging and exit with an error if any file fails.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub strict: Option<bool>,

    /// Verbose output with a progress bar.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Keep whatever is already in the temp directory.
    #[arg(long)]
    pub keep_temp: bool,

    /// Config file. Default: strokes2font.toml in the working directory, if present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
