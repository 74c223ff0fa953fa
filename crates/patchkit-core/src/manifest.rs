use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::descriptor::FileDescriptor;
use crate::transport::Transport;

/// Retrieves the list of files the server considers canonical.
pub struct ManifestFetcher {
    transport: Arc<dyn Transport>,
    manifest_url: String,
    host_binary_name: String,
}

impl ManifestFetcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        manifest_url: impl Into<String>,
        host_binary_name: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            manifest_url: manifest_url.into(),
            host_binary_name: host_binary_name.into(),
        }
    }

    /// Fetch and parse the manifest.
    ///
    /// An unreachable server or an unusable body yields an empty list, which
    /// callers treat as "nothing to update".
    pub async fn fetch(&self) -> Vec<FileDescriptor> {
        let url = with_cache_buster(&self.manifest_url, cache_buster());
        debug!("Fetching manifest from {url}");

        let body = match self.transport.fetch(&url, &|_: u64| {}).await {
            Ok(body) => body,
            Err(error) => {
                warn!("Manifest unavailable, skipping update: {error}");
                return Vec::new();
            }
        };

        let files = parse_manifest(&String::from_utf8_lossy(&body), &self.host_binary_name);
        info!("Manifest lists {} file(s)", files.len());
        files
    }
}

fn cache_buster() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

fn with_cache_buster(url: &str, nonce: i64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{nonce}")
}

/// Interpret a manifest body.
///
/// A body starting with `[` is a JSON list of `{name, size, hash}` entries.
/// Anything else is the single-hash form: the trimmed body is the expected
/// digest of the host binary.
#[must_use]
pub fn parse_manifest(body: &str, host_binary_name: &str) -> Vec<FileDescriptor> {
    let body = body.trim();
    if body.is_empty() {
        return Vec::new();
    }

    if !body.starts_with('[') {
        return vec![FileDescriptor::new(host_binary_name, 0, body)];
    }

    let entries: Vec<FileDescriptor> = match serde_json::from_str(body) {
        Ok(entries) => entries,
        Err(error) => {
            warn!("Ignoring malformed manifest: {error}");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut files = Vec::with_capacity(entries.len());
    for entry in entries {
        if !entry.has_safe_name() {
            warn!("Skipping manifest entry with unsafe path: {:?}", entry.name);
            continue;
        }
        if !seen.insert(entry.name.clone()) {
            warn!(
                "Ignoring malformed manifest: duplicate entry {:?}",
                entry.name
            );
            return Vec::new();
        }
        files.push(entry);
    }

    files
}
