//! Runs the font packager as a child process.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::process::Command;

use crate::utils::config::{Defaults, STDERR_TAIL_BYTES};

use super::{PackageRequest, Packager};

/// Name of the options file the packager reads from its working directory.
pub const PACKAGER_RC_FILENAME: &str = ".svgtofontrc";

/// Writes the packager options into `work_dir` and runs `program` there.
#[derive(Clone, Debug)]
pub struct CommandPackager {
    pub program: PathBuf,
    pub work_dir: PathBuf,
}

impl CommandPackager {
    pub fn new(program: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            work_dir: work_dir.into(),
        }
    }
}

impl Default for CommandPackager {
    fn default() -> Self {
        Self::new(Defaults::PACKAGER, ".")
    }
}

impl Packager for CommandPackager {
    fn package(&self, request: &PackageRequest) -> Result<()> {
        std::fs::create_dir_all(&self.work_dir)
            .with_context(|| format!("create packager work dir {}", self.work_dir.display()))?;
        let cwd = std::env::current_dir().context("read current directory")?;
        let json = request
            .config
            .to_packager_json(request.input_dir, request.output_dir, &cwd)
            .context("serialize packager options")?;
        let rc_path = self.work_dir.join(PACKAGER_RC_FILENAME);
        std::fs::write(&rc_path, json)
            .with_context(|| format!("write packager options to {}", rc_path.display()))?;
        debug!("Packager options written to {}", rc_path.display());

        info!(
            "Packaging {} glyphs with {}",
            request.items.len(),
            self.program.display()
        );
        let output = Command::new(&self.program)
            .arg("--sources")
            .arg(request.input_dir)
            .arg("--output")
            .arg(request.output_dir)
            .arg("--fontName")
            .arg(&request.config.font_name)
            .current_dir(&self.work_dir)
            .output()
            .with_context(|| format!("run packager {}", self.program.display()))?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("packager: {}", line);
        }
        if !output.status.success() {
            let start = output.stderr.len().saturating_sub(STDERR_TAIL_BYTES);
            anyhow::bail!(
                "packager {} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr[start..]).trim()
            );
        }
        Ok(())
    }
}
