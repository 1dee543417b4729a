//! Runs a set of long-lived, named processes until shutdown.
//!
//! - Processes run concurrently on their own tasks
//! - SIGINT/SIGTERM or the first failing process cancels the shared token
//! - Closers run afterward under a timeout, regardless of how the processes ended
//!
//! # Example
//!
//! ```no_run
//! use component_runner::Runner;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Runner::new()
//!         .with_named_process("heartbeat", |ctx| async move {
//!             loop {
//!                 tokio::select! {
//!                     _ = ctx.cancelled() => break,
//!                     _ = tokio::time::sleep(Duration::from_secs(1)) => {
//!                         tracing::info!("still alive");
//!                     }
//!                 }
//!             }
//!             Ok(())
//!         })
//!         .with_closer(|| async move {
//!             tracing::info!("Cleaning up resources");
//!             Ok(())
//!         })
//!         .with_closer_timeout(Duration::from_secs(5))
//!         .run()
//!         .await
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Boxed future every process and closer resolves to
pub type BoxedResultFuture = Pin<Box<dyn Future<Output = Result<(), anyhow::Error>> + Send>>;

/// Type alias for an app process function.
/// Takes a cancellation token and returns a future that resolves to Result<(), anyhow::Error>
pub type AppProcess = Box<dyn FnOnce(CancellationToken) -> BoxedResultFuture + Send>;

/// Type alias for a closer function.
pub type Closer = Box<dyn FnOnce() -> BoxedResultFuture + Send>;

struct NamedProcess {
    name: String,
    process: AppProcess,
}

/// Orchestrates app processes and cleanup functions with graceful shutdown.
pub struct Runner {
    processes: Vec<NamedProcess>,
    closers: Vec<Closer>,
    closer_timeout: Duration,
    cancellation_token: CancellationToken,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Creates a new Runner with a 10 second closer timeout and nothing to run.
    pub fn new() -> Self {
        Self {
            processes: Vec::new(),
            closers: Vec::new(),
            closer_timeout: Duration::from_secs(10),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Adds a named process. The name shows up in every log line about it.
    ///
    /// If any process returns an error, all processes are cancelled and
    /// closers are executed.
    pub fn with_named_process<F, Fut>(mut self, name: impl Into<String>, process: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        self.processes.push(NamedProcess {
            name: name.into(),
            process: Box::new(|token| Box::pin(process(token))),
        });
        self
    }

    /// Adds an already boxed process, as produced by service modules.
    pub fn with_boxed_process(mut self, name: impl Into<String>, process: AppProcess) -> Self {
        self.processes.push(NamedProcess {
            name: name.into(),
            process,
        });
        self
    }

    /// Adds a closer. All closers attempt to run even if some fail.
    pub fn with_closer<F, Fut>(mut self, closer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        self.closers.push(Box::new(|| Box::pin(closer())));
        self
    }

    /// Sets the timeout for executing closers.
    pub fn with_closer_timeout(mut self, timeout: Duration) -> Self {
        self.closer_timeout = timeout;
        self
    }

    /// Sets a custom cancellation token for external control over shutdown.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Runs all processes until shutdown, then the closers.
    ///
    /// Returns the first process error, if any.
    pub async fn run(self) -> anyhow::Result<()> {
        let token = self.cancellation_token;
        let mut join_set = JoinSet::new();

        for NamedProcess { name, process } in self.processes {
            let process_token = token.clone();
            join_set.spawn(async move {
                tracing::info!(process = %name, "starting process");
                let result = process(process_token).await;
                (name, result)
            });
        }

        spawn_signal_handlers(token.clone());

        let mut first_error = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((name, Ok(()))) => {
                    tracing::debug!(process = %name, "process completed");
                }
                Ok((name, Err(err))) => {
                    if !token.is_cancelled() {
                        tracing::error!(process = %name, "process error: {:#}", err);
                        first_error = Some(err.context(format!("process {} failed", name)));
                        token.cancel();
                    } else {
                        tracing::warn!(process = %name, "process error during shutdown: {:#}", err);
                    }
                }
                Err(err) => {
                    tracing::error!("process panicked: {}", err);
                    if !token.is_cancelled() {
                        first_error = Some(anyhow::anyhow!("process panicked: {}", err));
                        token.cancel();
                    }
                }
            }

            // A process ending on its own stops the rest
            if !token.is_cancelled() {
                token.cancel();
            }
        }

        if !self.closers.is_empty() {
            tracing::info!("Running closers with timeout of {:?}", self.closer_timeout);

            match tokio::time::timeout(self.closer_timeout, run_closers(self.closers)).await {
                Ok(()) => tracing::info!("All closers completed"),
                Err(_) => tracing::error!("Closers timed out after {:?}", self.closer_timeout),
            }
        }

        match first_error {
            Some(err) => {
                tracing::error!("Application exiting with error: {:#}", err);
                Err(err)
            }
            None => {
                tracing::info!("Application exiting normally");
                Ok(())
            }
        }
    }
}

fn spawn_signal_handlers(token: CancellationToken) {
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = ctrl_c_token.cancelled() => {}
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    tracing::info!("Received shutdown signal");
                    ctrl_c_token.cancel();
                }
                Err(err) => tracing::error!("Error setting up signal handler: {}", err),
            },
        }
    });

    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(err) => {
                tracing::error!("Error setting up SIGTERM handler: {}", err);
                return;
            }
        };

        tokio::select! {
            _ = token.cancelled() => {}
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM signal");
                token.cancel();
            }
        }
    });
}

/// Runs all closers concurrently.
async fn run_closers(closers: Vec<Closer>) {
    let mut closer_set = JoinSet::new();

    for closer in closers {
        closer_set.spawn(closer());
    }

    while let Some(result) = closer_set.join_next().await {
        match result {
            Ok(Ok(())) => tracing::debug!("Closer completed successfully"),
            Ok(Err(err)) => tracing::error!("Closer error: {:#}", err),
            Err(err) => tracing::error!("Closer panicked: {}", err),
        }
    }
}
