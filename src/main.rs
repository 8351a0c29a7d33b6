//! strokes2font CLI: convert a directory of SVG strokes into a font.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use strokes2font::engine::arg_parser::Cli;
use strokes2font::engine::handle_run;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
