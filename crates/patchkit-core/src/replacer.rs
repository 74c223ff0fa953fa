use std::path::Path;
use std::sync::Arc;

use log::{error, info, warn};

use crate::descriptor::{FileDescriptor, UpdateBatch};
use crate::error::{Outcome, UpdateError};
use crate::relaunch::Relauncher;
use crate::scheduler::DownloadScheduler;

/// Replaces the running executable on disk.
///
/// The live file is renamed to the backup path, which the running image
/// keeps using, and the new binary is downloaded into the freed path. Any
/// failure moves the backup back so the live path always holds either the
/// complete old binary or the complete new one.
pub struct SelfReplacer {
    scheduler: DownloadScheduler,
    relauncher: Arc<dyn Relauncher>,
    relaunch: bool,
}

impl SelfReplacer {
    #[must_use]
    pub fn new(
        scheduler: DownloadScheduler,
        relauncher: Arc<dyn Relauncher>,
        relaunch: bool,
    ) -> Self {
        Self {
            scheduler,
            relauncher,
            relaunch,
        }
    }

    /// Swap in the binary described by `host`.
    ///
    /// On success the current run is over: the result is always
    /// [`Outcome::RestartRequired`], whether or not a new process was
    /// started.
    ///
    /// # Errors
    /// Returns the error that made the swap fail, after the previous binary
    /// has been restored.
    pub async fn replace(&self, host: &FileDescriptor) -> Result<Outcome, UpdateError> {
        let layout = self.scheduler.layout();
        let live = layout.executable();
        let backup = layout.backup();

        discard_stale_backup(backup);
        std::fs::rename(live, backup).map_err(|error| UpdateError::rename(live, backup, error))?;
        info!("Moved {} aside to {}", live.display(), backup.display());

        if let Err(error) = self
            .scheduler
            .update_all(&UpdateBatch::single(host.clone()))
            .await
        {
            warn!("Replacing {} failed, restoring previous binary", live.display());
            restore(backup, live);
            return Err(error);
        }

        copy_permissions(backup, live);
        info!("Installed new binary at {}", live.display());

        if self.relaunch {
            if let Err(error) = self.relauncher.relaunch(live) {
                error!("Update installed but relaunch failed: {error}");
            }
        } else {
            info!("Relaunch suppressed, new binary takes effect on next start");
        }

        Ok(Outcome::RestartRequired)
    }
}

fn discard_stale_backup(backup: &Path) {
    if backup.exists()
        && let Err(error) = std::fs::remove_file(backup)
    {
        warn!(
            "Could not remove stale backup {}: {error}",
            backup.display()
        );
    }
}

fn restore(backup: &Path, live: &Path) {
    if live.exists() {
        let _ = std::fs::remove_file(live);
    }
    if let Err(error) = std::fs::rename(backup, live) {
        error!(
            "Failed to restore {} from {}: {error}",
            live.display(),
            backup.display()
        );
    }
}

fn copy_permissions(from: &Path, to: &Path) {
    let result = std::fs::metadata(from)
        .and_then(|metadata| std::fs::set_permissions(to, metadata.permissions()));
    if let Err(error) = result {
        warn!("Could not carry permissions over to {}: {error}", to.display());
    }
}
