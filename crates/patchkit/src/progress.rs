use log::{debug, info};
use patchkit_core::{FileDescriptor, ProgressListener};

/// Reports download progress through the log.
pub struct LogProgress;

impl ProgressListener for LogProgress {
    fn batch_started(&self, files: &[FileDescriptor]) {
        info!("Downloading {} file(s)", files.len());
    }

    fn file_started(&self, file: &FileDescriptor) {
        info!("Downloading {}", file.name);
    }

    fn file_progress(&self, file: &FileDescriptor, downloaded: u64) {
        debug!("{}: {downloaded} bytes", file.name);
    }

    fn file_finished(&self, file: &FileDescriptor) {
        info!("Updated {}", file.name);
    }

    fn batch_finished(&self) {
        info!("Download batch complete");
    }
}
