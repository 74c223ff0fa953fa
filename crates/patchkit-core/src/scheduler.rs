use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info, warn};
use tokio::task::JoinSet;

use crate::descriptor::{FileDescriptor, UpdateBatch};
use crate::error::UpdateError;
use crate::hash::{HashProvider, digests_match};
use crate::layout::{InstallLayout, with_name_suffix};
use crate::progress::ProgressListener;
use crate::transport::Transport;

const PARTIAL_SUFFIX: &str = ".part";

/// Number of download workers for a batch.
///
/// Two thirds of the available cores, never more than there are files and
/// never fewer than one.
#[must_use]
pub fn worker_count(hardware_concurrency: usize, file_count: usize) -> usize {
    (hardware_concurrency * 2 / 3).min(file_count).max(1)
}

#[must_use]
pub fn file_url(file_base_url: &str, file: &FileDescriptor) -> String {
    if file.hash.is_empty() {
        format!("{file_base_url}{}", file.name)
    } else {
        format!("{file_base_url}{}?{}", file.name, file.hash)
    }
}

/// Downloads, verifies and writes batches of files with a bounded pool of
/// worker tasks.
#[derive(Clone)]
pub struct DownloadScheduler {
    transport: Arc<dyn Transport>,
    hasher: Arc<dyn HashProvider>,
    progress: Arc<dyn ProgressListener>,
    layout: InstallLayout,
    file_base_url: String,
    hardware_concurrency: usize,
}

impl DownloadScheduler {
    pub fn new(
        transport: Arc<dyn Transport>,
        hasher: Arc<dyn HashProvider>,
        progress: Arc<dyn ProgressListener>,
        layout: InstallLayout,
        file_base_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            hasher,
            progress,
            layout,
            file_base_url: file_base_url.into(),
            hardware_concurrency: std::thread::available_parallelism()
                .map_or(1, NonZeroUsize::get),
        }
    }

    #[must_use]
    pub fn with_hardware_concurrency(mut self, cores: usize) -> Self {
        self.hardware_concurrency = cores.max(1);
        self
    }

    #[must_use]
    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    /// Update every file of the batch.
    ///
    /// Workers pull files from a shared cursor. The first failure stops
    /// workers from taking new files; downloads already in flight finish.
    ///
    /// # Errors
    /// Returns the first failure recorded by any worker.
    pub async fn update_all(&self, batch: &UpdateBatch) -> Result<(), UpdateError> {
        self.progress.batch_started(batch.files());

        let workers = worker_count(self.hardware_concurrency, batch.len());
        info!(
            "Updating {} file(s) with {workers} worker(s)",
            batch.len()
        );

        let state = Arc::new(BatchState {
            files: batch.files().to_vec(),
            cursor: AtomicUsize::new(0),
            failure: FailureSlot::default(),
        });

        let mut tasks = JoinSet::new();
        for _ in 0..workers {
            let scheduler = self.clone();
            let state = Arc::clone(&state);
            tasks.spawn(async move { scheduler.work(&state).await });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(error) = joined {
                state.failure.record(UpdateError::Worker {
                    details: error.to_string(),
                });
            }
        }

        if let Some(error) = state.failure.take() {
            return Err(error);
        }

        self.progress.batch_finished();
        Ok(())
    }

    async fn work(&self, state: &BatchState) {
        while !state.failure.is_set() {
            let index = state.cursor.fetch_add(1, Ordering::SeqCst);
            let Some(file) = state.files.get(index) else {
                break;
            };

            self.progress.file_started(file);
            if let Err(error) = self.update_file(file).await {
                warn!("Update of {} failed: {error}", file.name);
                state.failure.record(error);
                return;
            }
            self.progress.file_finished(file);
        }
    }

    /// Download one file, verify it against its descriptor and write it to
    /// its resolved path.
    ///
    /// # Errors
    /// Returns an error if the download fails, the bytes do not match the
    /// descriptor, or the file cannot be written.
    pub async fn update_file(&self, file: &FileDescriptor) -> Result<(), UpdateError> {
        let url = file_url(&self.file_base_url, file);
        debug!("Downloading {url}");

        let data = self
            .transport
            .fetch(&url, &|downloaded: u64| {
                self.progress.file_progress(file, downloaded);
            })
            .await
            .map_err(|source| UpdateError::transport(&url, source))?;

        self.verify(file, &data)?;

        let path = self.layout.resolve(file);
        write_file(&path, &data).await?;
        debug!("Wrote {} ({} bytes)", path.display(), data.len());
        Ok(())
    }

    fn verify(&self, file: &FileDescriptor, data: &[u8]) -> Result<(), UpdateError> {
        let actual_size = data.len() as u64;
        if file.size != 0 && actual_size != file.size {
            return Err(UpdateError::SizeMismatch {
                name: file.name.clone(),
                expected: file.size,
                actual: actual_size,
            });
        }

        if !file.hash.is_empty() {
            let actual = self.hasher.digest(data);
            if !digests_match(&actual, &file.hash) {
                return Err(UpdateError::HashMismatch {
                    name: file.name.clone(),
                    expected: file.hash.clone(),
                    actual,
                });
            }
        }

        Ok(())
    }
}

struct BatchState {
    files: Vec<FileDescriptor>,
    cursor: AtomicUsize,
    failure: FailureSlot,
}

/// Holds the first error of a batch; later ones are dropped.
#[derive(Default)]
struct FailureSlot {
    set: AtomicBool,
    error: Mutex<Option<UpdateError>>,
}

impl FailureSlot {
    fn is_set(&self) -> bool {
        self.set.load(Ordering::SeqCst)
    }

    fn record(&self, error: UpdateError) {
        let mut slot = self.error.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(error);
            self.set.store(true, Ordering::SeqCst);
        } else {
            debug!("Discarding follow-up failure: {error}");
        }
    }

    fn take(&self) -> Option<UpdateError> {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Write through a sibling `.part` file so readers never see half a file.
async fn write_file(path: &Path, data: &[u8]) -> Result<(), UpdateError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|error| UpdateError::write(parent, error))?;
    }

    let partial = with_name_suffix(path, PARTIAL_SUFFIX);
    if let Err(error) = tokio::fs::write(&partial, data).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(UpdateError::write(&partial, error));
    }

    if let Err(error) = tokio::fs::rename(&partial, path).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(UpdateError::rename(&partial, path, error));
    }

    Ok(())
}
