use std::path::PathBuf;

use log::{debug, warn};
use patchkit_platform::EnvironmentProvider;

/// Create empty files under the local data directory if they are missing.
///
/// Some external components refuse to start without these files. Failures
/// are logged and otherwise ignored.
pub fn ensure_placeholder_files(environment: &dyn EnvironmentProvider, files: &[PathBuf]) {
    if files.is_empty() {
        return;
    }

    let Some(root) = environment.local_data_dir() else {
        warn!("Local data directory unavailable, skipping placeholder files");
        return;
    };

    for relative in files {
        let path = root.join(relative);
        if path.exists() {
            continue;
        }

        let created = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| std::fs::File::create(&path).map(drop));
        match created {
            Ok(()) => debug!("Created placeholder {}", path.display()),
            Err(error) => warn!("Failed to create placeholder {}: {error}", path.display()),
        }
    }
}
