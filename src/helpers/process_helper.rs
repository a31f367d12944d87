use log::{debug, info, warn};
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

#[cfg(windows)]
const DETACHED_PROCESS: u32 = 0x0000_0008;
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to start {program}: {source}")]
    SpawnFailed { program: String, source: io::Error },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Server did not become healthy within {0:?}")]
    NotHealthy(Duration),

    #[error("Interrupted while waiting for the server")]
    Interrupted,
}

/// What to do when the server process exits on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartPolicy {
    /// Leave it stopped
    #[default]
    Never,
    /// Start it again after a non-zero exit, at most `max_restarts` times
    OnFailure { max_restarts: u32 },
}

impl RestartPolicy {
    fn allows_restart(&self, status: &ExitStatus, restarts_so_far: u32) -> bool {
        match self {
            RestartPolicy::Never => false,
            RestartPolicy::OnFailure { max_restarts } => !status.success() && restarts_so_far < *max_restarts,
        }
    }
}

/// Lifecycle of the control server as seen from the desktop shell.
///
/// The server is started detached from the shell (own process group, no
/// console) with its output discarded.
#[derive(Debug)]
pub struct ServerProcess {
    program: PathBuf,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    health_url: String,
    restart_policy: RestartPolicy,
    restarts: u32,
    child: Option<Child>,
}

impl ServerProcess {
    pub fn new<P: Into<PathBuf>>(program: P, health_url: impl Into<String>) -> Self {
        ServerProcess {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            health_url: health_url.into(),
            restart_policy: RestartPolicy::default(),
            restarts: 0,
            child: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_working_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = policy;
        self
    }

    pub fn restart_policy(&self) -> RestartPolicy {
        self.restart_policy
    }

    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(|c| c.id())
    }

    /// Start the server unless this manager already has a running one
    pub fn start(&mut self) -> Result<u32, ProcessError> {
        if self.is_running() {
            if let Some(pid) = self.pid() {
                debug!("Server process already running with pid {}", pid);
                return Ok(pid);
            }
        }

        info!("Starting server process: {} {:?}", self.program.display(), self.args);

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(DETACHED_PROCESS | CREATE_NO_WINDOW);
        }

        let child = cmd.spawn().map_err(|source| ProcessError::SpawnFailed {
            program: self.program.display().to_string(),
            source,
        })?;

        let pid = child.id();
        info!("Server process started with pid {}", pid);
        self.child = Some(child);
        Ok(pid)
    }

    /// True while the started process has not exited
    pub fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Kill the server if it is still running
    pub fn stop(&mut self) -> Result<(), ProcessError> {
        let Some(mut child) = self.child.take() else {
            debug!("No server process to stop");
            return Ok(());
        };

        if child.try_wait()?.is_none() {
            info!("Stopping server process {}", child.id());
            child.kill()?;
        }
        let status = child.wait()?;
        info!("Server stopped with {}", status);
        Ok(())
    }

    /// Check whether the process exited and apply the restart policy.
    ///
    /// Returns `Ok(true)` if the server was restarted.
    pub fn supervise(&mut self) -> Result<bool, ProcessError> {
        let status = match self.child.as_mut() {
            Some(child) => match child.try_wait()? {
                Some(status) => status,
                None => return Ok(false),
            },
            None => return Ok(false),
        };

        self.child = None;
        warn!("Server process exited with {}", status);

        if !self.restart_policy.allows_restart(&status, self.restarts) {
            info!("Not restarting server (policy: {:?}, restarts so far: {})", self.restart_policy, self.restarts);
            return Ok(false);
        }

        self.restarts += 1;
        info!("Restarting server (attempt {})", self.restarts);
        self.start()?;
        Ok(true)
    }

    /// Ask the server whether it is up
    pub async fn health_check(&self) -> bool {
        let client = match reqwest::Client::builder().timeout(Duration::from_secs(2)).build() {
            Ok(client) => client,
            Err(e) => {
                warn!("Cannot create HTTP client for health check: {}", e);
                return false;
            }
        };

        match client.get(&self.health_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Health check against {} failed: {}", self.health_url, e);
                false
            }
        }
    }

    /// Poll the health endpoint until it answers or the timeout expires
    pub async fn wait_until_healthy(&self, timeout: Duration) -> Result<(), ProcessError> {
        self.wait_until_healthy_while(timeout, &AtomicBool::new(true)).await
    }

    /// Like [`wait_until_healthy`](Self::wait_until_healthy), but gives up with
    /// [`ProcessError::Interrupted`] as soon as `keep_waiting` turns false.
    pub async fn wait_until_healthy_while(&self, timeout: Duration, keep_waiting: &AtomicBool) -> Result<(), ProcessError> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if !keep_waiting.load(Ordering::SeqCst) {
                return Err(ProcessError::Interrupted);
            }
            if self.health_check().await {
                debug!("Server healthy after {:?}", start.elapsed());
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        Err(ProcessError::NotHealthy(timeout))
    }
}

/// Open a URL with the desktop's default handler
pub fn open_in_desktop(url: &str) -> Result<(), io::Error> {
    info!("Opening {}", url);

    #[cfg(target_os = "macos")]
    let mut cmd = {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    };

    #[cfg(windows)]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", "", url]);
        cmd
    };

    #[cfg(all(unix, not(target_os = "macos")))]
    let mut cmd = {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    };

    cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
    cmd.spawn().map(|_| ())
}
