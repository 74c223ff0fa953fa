use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::RetryPolicy;
use crate::layout::InstallLayout;

/// Removes the executable parked by a previous self-replace.
///
/// The previous process may still be shutting down and holding the file,
/// so deletion is retried a few times before giving up. A leftover backup
/// is harmless and gets another chance on the next start.
pub struct ProcessGuard {
    backup: PathBuf,
    policy: RetryPolicy,
}

impl ProcessGuard {
    #[must_use]
    pub fn new(layout: &InstallLayout, policy: RetryPolicy) -> Self {
        Self {
            backup: layout.backup().to_path_buf(),
            policy,
        }
    }

    /// Returns whether the backup is gone.
    pub async fn clear_backup(&self) -> bool {
        self.clear_with(|path| std::fs::remove_file(path)).await
    }

    async fn clear_with<F>(&self, mut remove: F) -> bool
    where
        F: FnMut(&Path) -> std::io::Result<()>,
    {
        if !self.backup.exists() {
            return true;
        }

        for attempt in 1..=self.policy.attempts {
            if let Err(error) = remove(&self.backup) {
                debug!(
                    "Attempt {attempt} to remove {} failed: {error}",
                    self.backup.display()
                );
            }
            if !self.backup.exists() {
                info!("Removed previous executable {}", self.backup.display());
                return true;
            }
            if attempt < self.policy.attempts {
                tokio::time::sleep(self.policy.interval).await;
            }
        }

        warn!(
            "Previous executable {} is still in use, leaving it for the next run",
            self.backup.display()
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::ProcessGuard;
    use crate::config::RetryPolicy;
    use crate::layout::InstallLayout;

    const FAST: RetryPolicy = RetryPolicy {
        attempts: 4,
        interval: Duration::from_millis(5),
    };

    fn guard(temp: &tempfile::TempDir) -> (ProcessGuard, std::path::PathBuf) {
        let layout = InstallLayout::new(temp.path(), temp.path().join("boiii.exe"), "boiii.exe");
        let backup = layout.backup().to_path_buf();
        (ProcessGuard::new(&layout, FAST), backup)
    }

    fn locked() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "in use")
    }

    #[tokio::test]
    async fn removes_unlocked_backup() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let (guard, backup) = guard(&temp);
        std::fs::write(&backup, b"old").expect("backup should be written");

        assert!(guard.clear_backup().await);
        assert!(!backup.exists());
    }

    #[tokio::test]
    async fn missing_backup_needs_no_attempts() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let (guard, _) = guard(&temp);
        let mut calls = 0;

        let cleared = guard
            .clear_with(|_| {
                calls += 1;
                Ok(())
            })
            .await;

        assert!(cleared);
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn retries_until_previous_process_releases_backup() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let (guard, backup) = guard(&temp);
        std::fs::write(&backup, b"old").expect("backup should be written");
        let mut calls = 0;

        let cleared = guard
            .clear_with(|path| {
                calls += 1;
                if calls <= 2 {
                    Err(locked())
                } else {
                    std::fs::remove_file(path)
                }
            })
            .await;

        assert!(cleared);
        assert_eq!(calls, 3);
        assert!(!backup.exists());
    }

    #[tokio::test]
    async fn gives_up_quietly_when_backup_stays_locked() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let (guard, backup) = guard(&temp);
        std::fs::write(&backup, b"old").expect("backup should be written");
        let mut calls = 0;

        let cleared = guard
            .clear_with(|_| {
                calls += 1;
                Err(locked())
            })
            .await;

        assert!(!cleared);
        assert_eq!(calls, 4);
        assert!(backup.exists());
    }
}
