//! Mirroring session controller
//!
//! Owns at most one running scrcpy child. The slot lives behind an async
//! mutex so start, stop and liveness polls are serialized even when a UI
//! timer and user actions race each other.
//!
//! ```text
//! idle --start--> running --stop | child exits--> idle
//! ```
//!
//! Starting while running is reported as a failed [`Outcome`]; it never
//! spawns a second process.

use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::adb::AdbClient;
use crate::config::{Config, Timeouts};
use crate::error::{Error, Result};
use crate::options::MirrorOptions;
use crate::outcome::Outcome;
use crate::runner::{args, spawn_error, CommandRunner, ProcessRunner};

/// Lines of child output kept for diagnostics
const OUTPUT_TAIL_LINES: usize = 50;

/// Liveness of a launched process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Exited(Option<i32>),
}

/// Handle to a launched mirroring process
#[async_trait]
pub trait MirrorProcess: Send {
    /// OS process id, if still known
    fn id(&self) -> Option<u32>;

    /// Non-blocking liveness check
    fn poll(&mut self) -> std::io::Result<ProcessState>;

    /// Ask the process to exit
    fn terminate(&mut self) -> std::io::Result<()>;

    /// Force the process to exit
    fn kill(&mut self) -> std::io::Result<()>;

    /// Wait for exit, returning the exit code
    async fn wait(&mut self) -> std::io::Result<Option<i32>>;

    /// Most recent stdout/stderr lines
    fn recent_output(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Starts mirroring processes
pub trait ProcessLauncher: Send + Sync {
    fn launch(&self, program: &str, args: &[String]) -> Result<Box<dyn MirrorProcess>>;
}

/// [`ProcessLauncher`] that spawns real OS processes through tokio
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLauncher;

impl ProcessLauncher for TokioLauncher {
    fn launch(&self, program: &str, args: &[String]) -> Result<Box<dyn MirrorProcess>> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        let tail = Arc::new(StdMutex::new(VecDeque::with_capacity(OUTPUT_TAIL_LINES)));
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(drain_output(stdout, Arc::clone(&tail)));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(drain_output(stderr, Arc::clone(&tail)));
        }

        Ok(Box::new(TokioProcess { child, tail }))
    }
}

/// Keep the child's pipes from filling up; log each line and keep a short tail
async fn drain_output<T>(stream: T, tail: Arc<StdMutex<VecDeque<String>>>)
where
    T: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!("scrcpy: {}", line);
        if let Ok(mut tail) = tail.lock() {
            if tail.len() == OUTPUT_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line);
        }
    }
}

struct TokioProcess {
    child: Child,
    tail: Arc<StdMutex<VecDeque<String>>>,
}

#[async_trait]
impl MirrorProcess for TokioProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn poll(&mut self) -> std::io::Result<ProcessState> {
        Ok(match self.child.try_wait()? {
            Some(status) => ProcessState::Exited(status.code()),
            None => ProcessState::Running,
        })
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> std::io::Result<()> {
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        // SAFETY: pid belongs to a child we have not yet reaped
        let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
        if rc == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> std::io::Result<()> {
        self.child.start_kill()
    }

    fn kill(&mut self) -> std::io::Result<()> {
        self.child.start_kill()
    }

    async fn wait(&mut self) -> std::io::Result<Option<i32>> {
        Ok(self.child.wait().await?.code())
    }

    fn recent_output(&self) -> Vec<String> {
        self.tail
            .lock()
            .map(|tail| tail.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Snapshot of the running session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessInfo {
    pub pid: Option<u32>,
    pub running: bool,
    /// Device selector the session was started with, if any
    pub target: Option<String>,
    pub uptime_secs: u64,
}

struct ActiveSession {
    process: Box<dyn MirrorProcess>,
    target: Option<String>,
    started: Instant,
}

/// Controller for the mirroring CLI
pub struct SessionController<R: CommandRunner = ProcessRunner> {
    program: String,
    probe_timeout: Duration,
    stop_grace: Duration,
    runner: Arc<R>,
    adb: AdbClient<R>,
    launcher: Arc<dyn ProcessLauncher>,
    active: Mutex<Option<ActiveSession>>,
}

impl SessionController<ProcessRunner> {
    /// Controller that drives the real tools named in `config`
    pub fn new(config: &Config) -> Self {
        Self::with_parts(config, Arc::new(ProcessRunner), Arc::new(TokioLauncher))
    }
}

impl<R: CommandRunner> SessionController<R> {
    pub fn with_parts(config: &Config, runner: Arc<R>, launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            program: config.scrcpy_path.clone(),
            probe_timeout: Timeouts::secs(config.timeouts.probe),
            stop_grace: Timeouts::secs(config.timeouts.stop_grace),
            adb: AdbClient::with_runner(config, Arc::clone(&runner)),
            runner,
            launcher,
            active: Mutex::new(None),
        }
    }

    /// Run the version probe; absence and timeout both mean unavailable
    pub async fn is_available(&self) -> bool {
        match self
            .runner
            .run(&self.program, &args(["--version"]), self.probe_timeout)
            .await
        {
            Ok(output) => output.success,
            Err(e) => {
                debug!("scrcpy probe failed: {}", e);
                false
            }
        }
    }

    /// Version string: the first line of `--version` without the leading tool name
    pub async fn version(&self) -> Option<String> {
        let output = self
            .runner
            .run(&self.program, &args(["--version"]), self.probe_timeout)
            .await
            .ok()?;
        if !output.success {
            return None;
        }
        output
            .stdout
            .trim()
            .lines()
            .next()
            .map(|line| {
                let line = line.trim();
                line.strip_prefix("scrcpy").unwrap_or(line).trim().to_string()
            })
    }

    /// Start mirroring over the default transport. `serial` selects the
    /// device when more than one is attached.
    pub async fn start(&self, serial: Option<&str>, options: Option<&MirrorOptions>) -> Outcome {
        let mut slot = self.active.lock().await;
        if refresh_slot(&mut slot) {
            return Outcome::fail("scrcpy is already running");
        }

        match self.launch(serial, options) {
            Ok(session) => {
                *slot = Some(session);
                Outcome::ok("scrcpy started")
            }
            Err(e) => launch_failure(e),
        }
    }

    /// Pair with `host:port` first, then mirror it. A failed pairing aborts
    /// before scrcpy is launched.
    pub async fn start_wireless(
        &self,
        host: &str,
        port: u16,
        options: Option<&MirrorOptions>,
    ) -> Outcome {
        let mut slot = self.active.lock().await;
        if refresh_slot(&mut slot) {
            return Outcome::fail("scrcpy is already running");
        }

        let pairing = self.adb.connect(host, port).await;
        if !pairing.success {
            return Outcome::fail(format!("failed to connect to device: {}", pairing.message));
        }

        let target = format!("{}:{}", host, port);
        match self.launch(Some(&target), options) {
            Ok(session) => {
                *slot = Some(session);
                Outcome::ok(format!("scrcpy connected to {}", target))
            }
            Err(e) => launch_failure(e),
        }
    }

    fn launch(&self, serial: Option<&str>, options: Option<&MirrorOptions>) -> Result<ActiveSession> {
        let mut argv = Vec::new();
        if let Some(serial) = serial {
            argv.extend(args(["-s", serial]));
        }
        if let Some(options) = options {
            argv.extend(options.to_args());
        }

        info!("starting mirroring: {} {}", self.program, argv.join(" "));
        let process = self.launcher.launch(&self.program, &argv)?;
        debug!("scrcpy pid {:?}", process.id());

        Ok(ActiveSession {
            process,
            target: serial.map(str::to_string),
            started: Instant::now(),
        })
    }

    /// Terminate the session, escalating to a kill after the grace period.
    /// The slot is cleared either way.
    pub async fn stop(&self) -> Outcome {
        let mut slot = self.active.lock().await;
        if !refresh_slot(&mut slot) {
            return Outcome::fail("scrcpy is not running");
        }
        let Some(mut session) = slot.take() else {
            return Outcome::fail("scrcpy is not running");
        };

        if let Err(e) = session.process.terminate() {
            warn!("terminate failed, killing scrcpy: {}", e);
        } else {
            match tokio::time::timeout(self.stop_grace, session.process.wait()).await {
                Ok(Ok(code)) => {
                    info!("scrcpy stopped (exit code {:?})", code);
                    return Outcome::ok("scrcpy stopped");
                }
                Ok(Err(e)) => warn!("waiting for scrcpy failed: {}", e),
                Err(_) => warn!(
                    "scrcpy ignored terminate for {:?}, killing",
                    self.stop_grace
                ),
            }
        }

        if let Err(e) = session.process.kill() {
            warn!("kill failed: {}", e);
            return Outcome::fail(format!("failed to stop scrcpy: {}", e));
        }
        if let Err(e) = session.process.wait().await {
            debug!("reaping killed scrcpy failed: {}", e);
        }
        info!("scrcpy stopped (forced)");
        Outcome::ok("scrcpy stopped (forced)")
    }

    /// Non-blocking liveness poll. A session whose process has exited on
    /// its own is cleared here.
    pub async fn is_running(&self) -> bool {
        let mut slot = self.active.lock().await;
        refresh_slot(&mut slot)
    }

    /// Pid, target and uptime of the live session
    pub async fn process_info(&self) -> Option<ProcessInfo> {
        let mut slot = self.active.lock().await;
        if !refresh_slot(&mut slot) {
            return None;
        }
        slot.as_ref().map(|session| ProcessInfo {
            pid: session.process.id(),
            running: true,
            target: session.target.clone(),
            uptime_secs: session.started.elapsed().as_secs(),
        })
    }

    /// Recent output of the live session, oldest first
    pub async fn recent_output(&self) -> Vec<String> {
        let slot = self.active.lock().await;
        slot.as_ref()
            .map(|session| session.process.recent_output())
            .unwrap_or_default()
    }
}

/// Poll the slot's process; clear it if the process has exited. Returns
/// whether a live session remains.
fn refresh_slot(slot: &mut Option<ActiveSession>) -> bool {
    let Some(session) = slot.as_mut() else {
        return false;
    };
    match session.process.poll() {
        Ok(ProcessState::Running) => true,
        Ok(ProcessState::Exited(code)) => {
            info!("scrcpy exited on its own (exit code {:?})", code);
            *slot = None;
            false
        }
        Err(e) => {
            warn!("polling scrcpy failed, dropping session: {}", e);
            *slot = None;
            false
        }
    }
}

fn launch_failure(err: Error) -> Outcome {
    match err {
        Error::ToolNotFound { tool } => {
            warn!("{} not found", tool);
            Outcome::fail(format!("{} not found", tool))
        }
        other => {
            warn!("failed to start scrcpy: {}", other);
            Outcome::fail(format!("failed to start scrcpy: {}", other))
        }
    }
}
