//! Background migration worker
//!
//! A single thread owns the library and runs submitted jobs one after
//! another. Stage changes, progress and results come back over a channel
//! so the foreground never blocks on a migration.

use super::export::{ExportOutcome, export_folder};
use super::import::{ImportReport, import_folder};
use super::{ActiveMigration, MigrationGuard, MigrationObserver, Progress, Stage};
use crate::catalog::Folder;
use crate::error::{Error, LogicError, Result};
use crate::library::PhotoLibrary;
use crate::store::FileStore;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// A migration request for one folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Import(Folder),
    Export(Folder),
}

impl Job {
    pub fn folder(&self) -> &Folder {
        match self {
            Job::Import(folder) | Job::Export(folder) => folder,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Imported(ImportReport),
    Exported(ExportOutcome),
}

/// Notifications sent back to the foreground
#[derive(Debug)]
pub enum MigrationEvent {
    Started { folder: PathBuf },
    Stage { folder: PathBuf, stage: Stage },
    Progress { folder: PathBuf, progress: Progress },
    Finished { folder: PathBuf, result: Result<JobOutcome> },
}

struct QueuedJob {
    job: Job,
    claim: ActiveMigration,
}

/// Forwards pipeline callbacks as events
struct EventObserver<'a> {
    folder: &'a Path,
    events: &'a Sender<MigrationEvent>,
}

impl MigrationObserver for EventObserver<'_> {
    fn stage(&mut self, stage: Stage) {
        let _ = self.events.send(MigrationEvent::Stage {
            folder: self.folder.to_path_buf(),
            stage,
        });
    }

    fn progress(&mut self, progress: Progress) {
        let _ = self.events.send(MigrationEvent::Progress {
            folder: self.folder.to_path_buf(),
            progress,
        });
    }
}

pub struct MigrationWorker {
    jobs: Option<Sender<QueuedJob>>,
    handle: Option<JoinHandle<()>>,
    guard: MigrationGuard,
}

impl MigrationWorker {
    /// Start the worker thread, handing it the library and file store
    pub fn spawn<L, S>(library: L, store: S) -> Result<(Self, Receiver<MigrationEvent>)>
    where
        L: PhotoLibrary + 'static,
        S: FileStore + 'static,
    {
        let (job_tx, job_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("migration-worker".into())
            .spawn(move || run(library, store, job_rx, event_tx))?;

        Ok((
            Self {
                jobs: Some(job_tx),
                handle: Some(handle),
                guard: MigrationGuard::new(),
            },
            event_rx,
        ))
    }

    /// Queue `job`; a folder can only have one job queued or running
    pub fn submit(&self, job: Job) -> Result<()> {
        let claim = self.guard.acquire(&job.folder().path)?;
        let jobs = self.jobs.as_ref().ok_or(LogicError::WorkerStopped)?;
        debug!(folder = %job.folder().name, "Queued migration");
        jobs.send(QueuedJob { job, claim })
            .map_err(|_| Error::from(LogicError::WorkerStopped))
    }

    pub fn is_busy(&self, folder: &Path) -> bool {
        self.guard.is_active(folder)
    }

    /// Finish queued jobs and stop the thread
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.jobs.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("Migration worker panicked");
        }
    }
}

impl Drop for MigrationWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<L, S>(mut library: L, store: S, jobs: Receiver<QueuedJob>, events: Sender<MigrationEvent>)
where
    L: PhotoLibrary,
    S: FileStore,
{
    info!("Migration worker started");

    for QueuedJob { job, claim } in jobs {
        let folder = claim.folder().to_path_buf();
        let _ = events.send(MigrationEvent::Started {
            folder: folder.clone(),
        });

        let mut observer = EventObserver {
            folder: &folder,
            events: &events,
        };
        let result = match &job {
            Job::Import(target) => {
                import_folder(&mut library, &store, target, &mut observer).map(JobOutcome::Imported)
            }
            Job::Export(target) => {
                export_folder(&mut library, &store, target, &mut observer).map(JobOutcome::Exported)
            }
        };

        // Released before reporting so the folder can be resubmitted at once
        drop(claim);
        if events
            .send(MigrationEvent::Finished { folder, result })
            .is_err()
        {
            debug!("Nobody is listening for migration results");
        }
    }

    info!("Migration worker stopped");
}
