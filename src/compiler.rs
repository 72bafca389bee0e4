use std::{
    io::{BufRead, BufReader},
    path::PathBuf,
    process::{Command, Stdio},
    time::{Duration, Instant},
};

use crate::error::{GraphgenError, GraphgenResult};

/// One external-compiler invocation: compile `source_file` inside `workdir`.
#[derive(Debug, Clone)]
pub struct CompileJob {
    pub workdir: PathBuf,
    /// File name of the document within `workdir`.
    pub source_file: String,
    /// Non-interactive mode; the compiler must not stop for user input.
    pub batch: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CompileStats {
    pub elapsed: Duration,
}

/// External document compiler the orchestrator delegates to.
///
/// The compiler's output stream is handed to `log_line` one line at a time;
/// the call blocks until the external process completes.
pub trait Compiler {
    fn compile(
        &mut self,
        job: &CompileJob,
        log_line: &mut dyn FnMut(&str),
    ) -> GraphgenResult<CompileStats>;
}

pub fn is_context_on_path() -> bool {
    Command::new("context")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Production compiler driving the system `context` binary.
#[derive(Debug, Default)]
pub struct ContextCompiler;

impl Compiler for ContextCompiler {
    fn compile(
        &mut self,
        job: &CompileJob,
        log_line: &mut dyn FnMut(&str),
    ) -> GraphgenResult<CompileStats> {
        let mut cmd = Command::new("context");
        cmd.current_dir(&job.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        if job.batch {
            cmd.arg("--batchmode");
        }
        cmd.arg("--once").arg(&job.source_file);

        let started = Instant::now();

        let mut child = cmd.spawn().map_err(|e| {
            GraphgenError::compiler(format!(
                "failed to spawn context (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GraphgenError::compiler("failed to open context stdout (unexpected)"))?;

        for line in BufReader::new(stdout).lines() {
            let line = line
                .map_err(|e| GraphgenError::compiler(format!("failed to read context output: {e}")))?;
            log_line(&line);
        }

        let status = child
            .wait()
            .map_err(|e| GraphgenError::compiler(format!("failed to wait for context: {e}")))?;

        if !status.success() {
            return Err(GraphgenError::compiler(format!(
                "context exited with {status} while compiling '{}'",
                job.source_file
            )));
        }

        Ok(CompileStats {
            elapsed: started.elapsed(),
        })
    }
}
