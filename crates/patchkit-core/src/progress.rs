use tokio::sync::mpsc;

use crate::descriptor::FileDescriptor;

/// Receives download notifications.
///
/// File-level calls arrive from worker tasks concurrently; implementations
/// serialize internally if they need to. Batch-level calls come from the
/// task driving the batch.
pub trait ProgressListener: Send + Sync {
    fn batch_started(&self, _files: &[FileDescriptor]) {}
    fn file_started(&self, _file: &FileDescriptor) {}
    fn file_progress(&self, _file: &FileDescriptor, _downloaded: u64) {}
    fn file_finished(&self, _file: &FileDescriptor) {}
    fn batch_finished(&self) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressListener for NoProgress {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    BatchStarted { files: Vec<String> },
    FileStarted { name: String },
    FileProgress { name: String, downloaded: u64 },
    FileFinished { name: String },
    BatchFinished,
}

/// Forwards every notification into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    sender: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelProgress {
    #[must_use]
    pub fn new(sender: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self { sender }
    }

    fn send(&self, event: ProgressEvent) {
        // The receiving side going away only means nobody is watching.
        let _ = self.sender.send(event);
    }
}

impl ProgressListener for ChannelProgress {
    fn batch_started(&self, files: &[FileDescriptor]) {
        self.send(ProgressEvent::BatchStarted {
            files: files.iter().map(|file| file.name.clone()).collect(),
        });
    }

    fn file_started(&self, file: &FileDescriptor) {
        self.send(ProgressEvent::FileStarted {
            name: file.name.clone(),
        });
    }

    fn file_progress(&self, file: &FileDescriptor, downloaded: u64) {
        self.send(ProgressEvent::FileProgress {
            name: file.name.clone(),
            downloaded,
        });
    }

    fn file_finished(&self, file: &FileDescriptor) {
        self.send(ProgressEvent::FileFinished {
            name: file.name.clone(),
        });
    }

    fn batch_finished(&self) {
        self.send(ProgressEvent::BatchFinished);
    }
}
