//! Self-update engine for a client installation.
//!
//! This crate keeps an installation in step with a server manifest:
//! - Manifest retrieval and parsing.
//! - Staleness detection of local files against manifest descriptors.
//! - Concurrent, verified downloads of outdated files.
//! - In-place replacement of the running executable with rollback.
//! - Cleanup of the executable parked by a previous replacement.

mod config;
mod descriptor;
mod error;
mod guard;
mod hash;
mod layout;
mod manifest;
mod placeholder;
mod progress;
mod relaunch;
mod replacer;
mod scheduler;
mod staleness;
mod transport;
mod updater;

#[cfg(test)]
mod test_support;

pub use config::{HostBinaryPolicy, RetryPolicy, UpdaterConfig};
pub use descriptor::{FileDescriptor, UpdateBatch};
pub use error::{ErrorKind, Outcome, TransportError, UpdateError};
pub use guard::ProcessGuard;
pub use hash::{HashAlgorithm, HashProvider, Md5Hasher, Sha256Hasher};
pub use layout::InstallLayout;
pub use manifest::{ManifestFetcher, parse_manifest};
pub use placeholder::ensure_placeholder_files;
pub use progress::{ChannelProgress, NoProgress, ProgressEvent, ProgressListener};
pub use relaunch::{ProcessRelauncher, Relauncher};
pub use replacer::SelfReplacer;
pub use scheduler::{DownloadScheduler, file_url, worker_count};
pub use staleness::StalenessChecker;
pub use transport::{HttpTransport, Transport};
pub use updater::Updater;
