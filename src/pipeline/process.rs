//! Running the external collaborators (git, cloc, code-maat, python).
//!
//! Every tool is started with an explicit argv; nothing goes through a shell.
//! stderr is drained on its own thread so a chatty tool cannot block while
//! stdout is being copied. A failing tool's stderr ends up in the error; a
//! successful tool's stderr is handed back for the caller to relay.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStderr, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use crate::config::ToolCommand;
use crate::error::{PipelineError, Result, Stage};

/// One tool invocation: the configured command plus stage arguments.
pub struct Invocation<'a> {
    pub stage: Stage,
    pub tool: &'a ToolCommand,
    pub args: Vec<String>,
    /// Working directory; `None` keeps the orchestrator's own.
    pub cwd: Option<&'a Path>,
}

impl Invocation<'_> {
    fn command(&self) -> Command {
        let mut cmd = Command::new(self.tool.program());
        cmd.args(self.tool.leading_args()).args(&self.args);
        if let Some(dir) = self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn spawn(&self, stdout: Stdio) -> Result<(Child, JoinHandle<String>)> {
        let mut child = self
            .command()
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| PipelineError::Spawn {
                stage: self.stage,
                program: self.tool.program().to_string(),
                source,
            })?;
        let drain = drain_stderr(child.stderr.take());
        Ok((child, drain))
    }

    fn finish(&self, mut child: Child, drain: JoinHandle<String>) -> Result<String> {
        let status = child.wait().map_err(|source| PipelineError::Spawn {
            stage: self.stage,
            program: self.tool.program().to_string(),
            source,
        })?;
        let stderr = drain.join().unwrap_or_default();
        self.check(status, stderr)
    }

    fn check(&self, status: ExitStatus, stderr: String) -> Result<String> {
        if status.success() {
            Ok(stderr)
        } else {
            Err(PipelineError::ExitStatus {
                stage: self.stage,
                program: self.tool.program().to_string(),
                status: status.to_string(),
                stderr,
            })
        }
    }
}

fn drain_stderr(stderr: Option<ChildStderr>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut text = String::new();
        if let Some(stderr) = stderr {
            let _ = BufReader::new(stderr).read_to_string(&mut text);
        }
        text
    })
}

/// Runs the tool and streams its stdout into `dest`, returning its stderr.
///
/// Returns only after the file is flushed, synced and closed and the process
/// has exited successfully, so the next stage always sees a complete artifact.
pub fn capture_to_file(inv: &Invocation<'_>, dest: &Path) -> Result<String> {
    let file = File::create(dest).map_err(|e| PipelineError::io(inv.stage, dest, e))?;
    let (mut child, drain) = inv.spawn(Stdio::piped())?;

    let copied = match child.stdout.take() {
        Some(mut stdout) => copy_and_sync(&mut stdout, file),
        None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout was not captured")),
    };
    if let Err(e) = copied {
        let _ = child.kill();
        let _ = child.wait();
        let _ = drain.join();
        return Err(PipelineError::io(inv.stage, dest, e));
    }

    inv.finish(child, drain)
}

fn copy_and_sync<R: Read>(reader: &mut R, file: File) -> io::Result<()> {
    let mut writer = BufWriter::new(file);
    io::copy(reader, &mut writer)?;
    writer.flush()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

/// Runs the tool with stdout going straight to the terminal and returns
/// its stderr.
pub fn run_inherit(inv: &Invocation<'_>) -> Result<String> {
    let (child, drain) = inv.spawn(Stdio::inherit())?;
    inv.finish(child, drain)
}

/// Output of a tool whose stdout is kept in memory.
#[derive(Debug)]
pub struct Captured {
    pub stdout: String,
    pub stderr: String,
}

/// Runs the tool and collects its stdout (lossily decoded) in memory.
pub fn capture_output(inv: &Invocation<'_>) -> Result<Captured> {
    let (mut child, drain) = inv.spawn(Stdio::piped())?;
    let mut bytes = Vec::new();
    let read = match child.stdout.take() {
        Some(mut stdout) => stdout.read_to_end(&mut bytes).map(|_| ()),
        None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout was not captured")),
    };
    if let Err(source) = read {
        let _ = child.kill();
        let _ = child.wait();
        let _ = drain.join();
        return Err(PipelineError::Spawn { stage: inv.stage, program: inv.tool.program().to_string(), source });
    }
    let stderr = inv.finish(child, drain)?;
    Ok(Captured { stdout: String::from_utf8_lossy(&bytes).into_owned(), stderr })
}
