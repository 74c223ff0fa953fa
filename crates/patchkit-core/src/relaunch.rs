use std::ffi::OsString;
use std::path::Path;

use log::info;

use crate::error::UpdateError;

/// Starts a fresh process from the freshly written executable.
pub trait Relauncher: Send + Sync {
    /// # Errors
    /// Returns an error if the new process cannot be spawned.
    fn relaunch(&self, executable: &Path) -> Result<(), UpdateError>;
}

/// Spawns the executable again with the arguments the current process got.
#[derive(Debug, Clone, Default)]
pub struct ProcessRelauncher {
    args: Vec<OsString>,
}

impl ProcessRelauncher {
    #[must_use]
    pub fn new(args: Vec<OsString>) -> Self {
        Self { args }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(std::env::args_os().skip(1).collect())
    }
}

impl Relauncher for ProcessRelauncher {
    fn relaunch(&self, executable: &Path) -> Result<(), UpdateError> {
        info!("Relaunching from: {}", executable.display());
        std::process::Command::new(executable)
            .args(&self.args)
            .spawn()
            .map_err(|source| UpdateError::Relaunch {
                path: executable.to_path_buf(),
                source,
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ProcessRelauncher, Relauncher};
    use crate::error::UpdateError;

    #[test]
    fn missing_executable_reports_relaunch_error() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let missing = temp.path().join("does-not-exist");

        let result = ProcessRelauncher::default().relaunch(&missing);

        assert!(matches!(
            result,
            Err(UpdateError::Relaunch { ref path, .. }) if path == &missing
        ));
    }
}
