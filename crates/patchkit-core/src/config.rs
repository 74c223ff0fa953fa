use std::path::PathBuf;
use std::time::Duration;

/// Endpoints and housekeeping knobs for one [`Updater`](crate::Updater).
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    pub manifest_url: String,
    /// Prefix every file name is appended to; expected to end with `/`.
    pub file_base_url: String,
    /// Manifest name that designates the running executable.
    pub host_binary_name: String,
    /// Files under the install base that must exist before anything else runs.
    pub bootstrap_assets: Vec<String>,
    /// Empty files created under the local data dir when missing.
    pub placeholder_files: Vec<PathBuf>,
    pub backup_cleanup: RetryPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 4,
            interval: Duration::from_secs(2),
        }
    }
}

/// Whether the host binary takes part in staleness checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostBinaryPolicy {
    #[default]
    Check,
    /// Treat the host binary as current so development builds never relaunch.
    Exempt,
}

impl HostBinaryPolicy {
    #[must_use]
    pub fn for_build(release_build: bool, force_update: bool) -> Self {
        if release_build || force_update {
            Self::Check
        } else {
            Self::Exempt
        }
    }
}
