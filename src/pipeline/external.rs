//! External vector-tool stage: one child process per item, fed on stdin, read on stdout.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crate::StrokeMode;
use crate::error::ItemError;
use crate::utils::config::{PipelineConsts, STDERR_TAIL_BYTES};

use super::context::{Chunk, PipelineContext, send_chunk};
use super::stage::Stage;

/// How to invoke the external tool. Cloned into a fresh [`ExternalStage`] per item.
#[derive(Clone, Debug)]
pub struct ExternalCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

impl ExternalCommand {
    /// Inkscape in pipe mode applying `mode`'s actions and writing SVG to stdout.
    pub fn inkscape(program: impl Into<PathBuf>, mode: StrokeMode) -> Self {
        Self {
            program: program.into(),
            args: vec![
                "--pipe".to_string(),
                format!("--actions={}", mode.actions()),
                "--export-type=svg".to_string(),
                "--export-filename=-".to_string(),
            ],
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn display_name(&self) -> String {
        self.program.display().to_string()
    }
}

pub struct ExternalStage {
    command: ExternalCommand,
}

impl ExternalStage {
    pub fn new(command: ExternalCommand) -> Self {
        Self { command }
    }

    fn error(&self, message: impl Into<String>) -> ItemError {
        ItemError::External {
            program: self.command.display_name(),
            message: message.into(),
        }
    }

    fn spawn(&self) -> Result<Child, ItemError> {
        Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.error(format!("spawn: {e}")))
    }
}

/// Copy upstream chunks into the child's stdin, then close it.
fn feed_stdin(input: &Receiver<Chunk>, mut stdin: impl Write) -> std::io::Result<()> {
    while let Ok(chunk) = input.recv() {
        stdin.write_all(&chunk)?;
    }
    stdin.flush()
}

/// Keep the last `STDERR_TAIL_BYTES` of the child's stderr for error messages.
fn drain_stderr(mut stderr: impl Read) -> String {
    let mut buf = Vec::new();
    let _ = stderr.read_to_end(&mut buf);
    let start = buf.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&buf[start..]).trim().to_string()
}

/// Wait for exit without holding the lock, so the watchdog can still kill the child.
fn wait_child(child: &Mutex<Child>) -> std::io::Result<ExitStatus> {
    loop {
        if let Some(status) = child
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_wait()?
        {
            return Ok(status);
        }
        thread::sleep(PipelineConsts::CHILD_POLL_INTERVAL);
    }
}

impl Stage for ExternalStage {
    fn name(&self) -> &str {
        "external"
    }

    fn run(
        &mut self,
        input: &Receiver<Chunk>,
        output: &Sender<Chunk>,
        ctx: &PipelineContext,
    ) -> Result<(), ItemError> {
        let mut child = self.spawn()?;
        let (stdin, stdout, stderr) = match (child.stdin.take(), child.stdout.take(), child.stderr.take()) {
            (Some(i), Some(o), Some(e)) => (i, o, e),
            _ => {
                let _ = child.kill();
                return Err(self.error("child stdio was not captured"));
            }
        };
        log::debug!("{}: spawned {} (pid {})", ctx.item_id, self.command.display_name(), child.id());
        let child = Arc::new(Mutex::new(child));
        let timed_out = Arc::new(AtomicBool::new(false));
        let (done_tx, done_rx) = bounded::<()>(1);

        let (feed_result, stderr_tail, downstream_gone, status) = thread::scope(|s| {
            let feeder = s.spawn(|| feed_stdin(input, stdin));
            let stderr_reader = s.spawn(|| drain_stderr(stderr));
            if let Some(timeout) = self.command.timeout {
                let child = Arc::clone(&child);
                let timed_out = Arc::clone(&timed_out);
                s.spawn(move || {
                    if let Err(RecvTimeoutError::Timeout) = done_rx.recv_timeout(timeout) {
                        let mut child = child.lock().unwrap_or_else(PoisonError::into_inner);
                        // A child that already exited is not a timeout, even if its
                        // output is still being drained.
                        if let Ok(None) = child.try_wait() {
                            timed_out.store(true, Ordering::Relaxed);
                            let _ = child.kill();
                        }
                    }
                });
            }

            let mut downstream_gone = false;
            let mut stdout = stdout;
            let mut read_error = None;
            loop {
                let mut buf = vec![0u8; PipelineConsts::CHUNK_SIZE];
                match stdout.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        buf.truncate(n);
                        if !send_chunk(output, buf) {
                            downstream_gone = true;
                            let _ = child.lock().unwrap_or_else(PoisonError::into_inner).kill();
                            break;
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        read_error = Some(e);
                        let _ = child.lock().unwrap_or_else(PoisonError::into_inner).kill();
                        break;
                    }
                }
            }
            drop(stdout);
            let status = wait_child(&child);
            let _ = done_tx.send(());
            let feed_result = feeder
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin feeder panicked")));
            let stderr_tail = stderr_reader.join().unwrap_or_default();
            let status = match read_error {
                Some(e) => Err(e),
                None => status,
            };
            (feed_result, stderr_tail, downstream_gone, status)
        });

        if downstream_gone || ctx.is_failed() {
            return Ok(());
        }
        if timed_out.load(Ordering::Relaxed) {
            return Err(self.error(format!(
                "timed out after {:?}",
                self.command.timeout.unwrap_or_default()
            )));
        }
        let with_stderr = |msg: String| {
            if stderr_tail.is_empty() {
                msg
            } else {
                format!("{msg}; stderr: {stderr_tail}")
            }
        };
        let status = status.map_err(|e| self.error(with_stderr(format!("read output: {e}"))))?;
        if !status.success() {
            return Err(self.error(with_stderr(format!("exited with {status}"))));
        }
        feed_result.map_err(|e| self.error(with_stderr(format!("write input: {e}"))))?;
        Ok(())
    }
}
