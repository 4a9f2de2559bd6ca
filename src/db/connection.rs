use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

use super::migrations::run_migrations;
use crate::error::StoreError;

pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

type StoreTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum StoreCommand {
    Run(StoreTask),
    Shutdown,
}

/// Owns the worker thread; dropping the last handle stops it.
struct StoreWorker {
    commands: mpsc::Sender<StoreCommand>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl StoreWorker {
    fn spawn(db_path: PathBuf) -> Result<Self> {
        let (commands, inbox) = mpsc::channel::<StoreCommand>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();

        let thread = thread::Builder::new()
            .name("plant-monitor-db".into())
            .spawn(move || {
                let mut conn = match open_store(&db_path) {
                    Ok(conn) => {
                        if ready_tx.send(Ok(())).is_err() {
                            return;
                        }
                        conn
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };

                for command in inbox.iter() {
                    match command {
                        StoreCommand::Run(task) => task(&mut conn),
                        StoreCommand::Shutdown => break,
                    }
                }
                info!("Record store worker stopped");
            })
            .context("failed to spawn record store worker")?;

        ready_rx
            .recv()
            .context("record store worker exited during startup")??;

        Ok(Self {
            commands,
            thread: Mutex::new(Some(thread)),
        })
    }
}

impl Drop for StoreWorker {
    fn drop(&mut self) {
        let handle = match self.thread.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(handle) = handle else {
            return;
        };

        if self.commands.send(StoreCommand::Shutdown).is_err() {
            error!("Record store worker already gone at shutdown");
        }
        if let Err(err) = handle.join() {
            error!("Record store worker panicked: {err:?}");
        }
    }
}

fn open_store(db_path: &Path) -> Result<Connection> {
    let mut conn = Connection::open(db_path)
        .with_context(|| format!("failed to open SQLite database {}", db_path.display()))?;
    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
        error!("Failed to enable WAL mode: {err}");
    }
    run_migrations(&mut conn).context("failed to run database migrations")?;
    Ok(conn)
}

/// Handle to the record store.
///
/// A single worker thread owns the SQLite connection and runs every task in
/// arrival order, so each task executes atomically with respect to the
/// others. Cloning is cheap; all clones talk to the same worker.
#[derive(Clone)]
pub struct Database {
    worker: Arc<StoreWorker>,
    op_timeout: Duration,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let worker = StoreWorker::spawn(db_path.clone())?;
        info!("Record store ready at {}", db_path.display());

        Ok(Self {
            worker: Arc::new(worker),
            op_timeout: DEFAULT_OP_TIMEOUT,
        })
    }

    /// Bound every store call by `timeout`; calls that exceed it fail with
    /// [`StoreError::Unavailable`].
    pub fn with_op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = timeout;
        self
    }

    /// Run `task` on the store worker and wait for its result.
    ///
    /// On timeout the task stays queued and may still run; only the caller
    /// stops waiting.
    pub async fn execute<F, T>(&self, task: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let command = StoreCommand::Run(Box::new(move |conn| {
            // The caller may have timed out already.
            let _ = reply_tx.send(task(conn));
        }));

        self.worker
            .commands
            .send(command)
            .map_err(|_| StoreError::Unavailable(anyhow!("record store worker is not running")))?;

        match tokio::time::timeout(self.op_timeout, reply_rx).await {
            Ok(Ok(result)) => result.map_err(StoreError::Unavailable),
            Ok(Err(_)) => Err(StoreError::Unavailable(anyhow!(
                "record store worker dropped the request"
            ))),
            Err(_) => Err(StoreError::Unavailable(anyhow!(
                "store operation did not complete within {}ms",
                self.op_timeout.as_millis()
            ))),
        }
    }
}
