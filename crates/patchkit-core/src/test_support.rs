//! Fakes shared by the unit tests of this crate.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::descriptor::FileDescriptor;
use crate::error::{TransportError, UpdateError};
use crate::hash::HashProvider;
use crate::progress::ProgressListener;
use crate::relaunch::Relauncher;

pub(crate) const BASE_URL: &str = "https://cdn.test/t7x/";

/// Serves registered files by URL (query ignored) and logs every request.
#[derive(Default)]
pub(crate) struct FakeTransport {
    files: Mutex<HashMap<String, Vec<u8>>>,
    requests: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub(crate) fn serve(&self, url: &str, data: &[u8]) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), data.to_vec());
    }

    pub(crate) fn serve_file(&self, name: &str, data: &[u8]) {
        self.serve(&format!("{BASE_URL}{name}"), data);
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// File names requested from [`BASE_URL`], query stripped.
    pub(crate) fn requested_names(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|url| url.strip_prefix(BASE_URL))
            .map(|rest| rest.split('?').next().unwrap_or(rest).to_string())
            .collect()
    }
}

#[async_trait]
impl crate::transport::Transport for FakeTransport {
    async fn fetch(
        &self,
        url: &str,
        on_progress: &(dyn Fn(u64) + Send + Sync),
    ) -> Result<Vec<u8>, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
        tokio::task::yield_now().await;

        let key = url.split('?').next().unwrap_or(url);
        let data = self
            .files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .ok_or(TransportError::Status { status: 404 })?;
        on_progress(data.len() as u64);
        Ok(data)
    }
}

/// Digest is the content itself, so fixtures can be written as `b"abc123"`.
pub(crate) struct ContentHasher;

impl HashProvider for ContentHasher {
    fn digest(&self, data: &[u8]) -> String {
        String::from_utf8_lossy(data).into_owned()
    }
}

#[derive(Default)]
pub(crate) struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, event: String) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl ProgressListener for RecordingProgress {
    fn batch_started(&self, files: &[FileDescriptor]) {
        self.push(format!("batch:{}", files.len()));
    }

    fn file_started(&self, file: &FileDescriptor) {
        self.push(format!("begin:{}", file.name));
    }

    fn file_progress(&self, file: &FileDescriptor, downloaded: u64) {
        self.push(format!("progress:{}:{downloaded}", file.name));
    }

    fn file_finished(&self, file: &FileDescriptor) {
        self.push(format!("end:{}", file.name));
    }

    fn batch_finished(&self) {
        self.push("done".to_string());
    }
}

#[derive(Default)]
pub(crate) struct CountingRelauncher {
    calls: AtomicUsize,
}

impl CountingRelauncher {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Relauncher for CountingRelauncher {
    fn relaunch(&self, _executable: &Path) -> Result<(), UpdateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
