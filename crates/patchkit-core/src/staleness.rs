use std::sync::Arc;

use log::debug;

use crate::config::HostBinaryPolicy;
use crate::descriptor::{FileDescriptor, UpdateBatch};
use crate::hash::{HashProvider, digests_match};
use crate::layout::InstallLayout;

/// Compares local files against manifest descriptors. Never writes.
#[derive(Clone)]
pub struct StalenessChecker {
    layout: InstallLayout,
    hasher: Arc<dyn HashProvider>,
    host_policy: HostBinaryPolicy,
}

impl StalenessChecker {
    pub fn new(
        layout: InstallLayout,
        hasher: Arc<dyn HashProvider>,
        host_policy: HostBinaryPolicy,
    ) -> Self {
        Self {
            layout,
            hasher,
            host_policy,
        }
    }

    #[must_use]
    pub fn is_outdated(&self, file: &FileDescriptor) -> bool {
        if self.host_policy == HostBinaryPolicy::Exempt && self.layout.is_host_binary(file) {
            debug!("Host binary exempt from update checks");
            return false;
        }

        let path = self.layout.resolve(file);
        let Ok(data) = std::fs::read(&path) else {
            debug!("{} is missing locally", file.name);
            return true;
        };

        if file.size != 0 && data.len() as u64 != file.size {
            debug!(
                "{} has {} bytes, expected {}",
                file.name,
                data.len(),
                file.size
            );
            return true;
        }

        let actual = self.hasher.digest(&data);
        let outdated = !digests_match(&actual, &file.hash);
        if outdated {
            debug!("{} digest {actual} differs from {}", file.name, file.hash);
        }
        outdated
    }

    #[must_use]
    pub fn outdated(&self, files: &[FileDescriptor]) -> UpdateBatch {
        UpdateBatch::new(
            files
                .iter()
                .filter(|file| self.is_outdated(file))
                .cloned()
                .collect(),
        )
    }
}
