use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};
use patchkit_platform::{EnvironmentProvider, SystemEnvironment};

use crate::config::{HostBinaryPolicy, UpdaterConfig};
use crate::descriptor::{FileDescriptor, UpdateBatch};
use crate::error::{Outcome, UpdateError};
use crate::guard::ProcessGuard;
use crate::hash::{HashProvider, Md5Hasher};
use crate::layout::InstallLayout;
use crate::manifest::ManifestFetcher;
use crate::placeholder::ensure_placeholder_files;
use crate::progress::{NoProgress, ProgressListener};
use crate::relaunch::{ProcessRelauncher, Relauncher};
use crate::replacer::SelfReplacer;
use crate::scheduler::DownloadScheduler;
use crate::staleness::StalenessChecker;
use crate::transport::Transport;

/// Runs one end-to-end update of an installation.
pub struct Updater {
    config: UpdaterConfig,
    layout: InstallLayout,
    transport: Arc<dyn Transport>,
    hasher: Arc<dyn HashProvider>,
    progress: Arc<dyn ProgressListener>,
    relauncher: Arc<dyn Relauncher>,
    environment: Arc<dyn EnvironmentProvider>,
    host_policy: HostBinaryPolicy,
    relaunch: bool,
    hardware_concurrency: Option<usize>,
}

impl Updater {
    /// `base_dir` holds every file except the host binary, which lives at
    /// `executable`.
    pub fn new(
        config: UpdaterConfig,
        base_dir: impl Into<PathBuf>,
        executable: impl Into<PathBuf>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let layout = InstallLayout::new(base_dir, executable, config.host_binary_name.clone());
        Self {
            config,
            layout,
            transport,
            hasher: Arc::new(Md5Hasher),
            progress: Arc::new(NoProgress),
            relauncher: Arc::new(ProcessRelauncher::from_env()),
            environment: Arc::new(SystemEnvironment),
            host_policy: HostBinaryPolicy::Check,
            relaunch: true,
            hardware_concurrency: None,
        }
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn HashProvider>) -> Self {
        self.hasher = hasher;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressListener>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn with_relauncher(mut self, relauncher: Arc<dyn Relauncher>) -> Self {
        self.relauncher = relauncher;
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: Arc<dyn EnvironmentProvider>) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub fn with_host_policy(mut self, policy: HostBinaryPolicy) -> Self {
        self.host_policy = policy;
        self
    }

    /// Whether a successful self-replace starts the new binary.
    #[must_use]
    pub fn with_relaunch(mut self, relaunch: bool) -> Self {
        self.relaunch = relaunch;
        self
    }

    #[must_use]
    pub fn with_hardware_concurrency(mut self, cores: usize) -> Self {
        self.hardware_concurrency = Some(cores);
        self
    }

    #[must_use]
    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    /// Bring the installation up to date with the server manifest.
    ///
    /// An unreachable or unusable manifest is not an error: the run ends
    /// with [`Outcome::NothingToDo`]. When the host binary is outdated it is
    /// replaced on its own and the run ends with
    /// [`Outcome::RestartRequired`]; other outdated files wait for the
    /// relaunched process.
    ///
    /// # Errors
    /// Returns the first download, verification or write failure of the
    /// update batch.
    pub async fn run(&self) -> Result<Outcome, UpdateError> {
        ProcessGuard::new(&self.layout, self.config.backup_cleanup)
            .clear_backup()
            .await;
        ensure_placeholder_files(self.environment.as_ref(), &self.config.placeholder_files);

        let scheduler = self.scheduler();
        self.ensure_bootstrap_assets(&scheduler).await;

        let files = ManifestFetcher::new(
            Arc::clone(&self.transport),
            self.config.manifest_url.clone(),
            self.config.host_binary_name.clone(),
        )
        .fetch()
        .await;
        if files.is_empty() {
            return Ok(Outcome::NothingToDo);
        }

        let outdated = self.outdated(files).await?;
        if outdated.is_empty() {
            info!("All files are up to date");
            return Ok(Outcome::NothingToDo);
        }
        info!("{} file(s) outdated", outdated.len());

        if let Some(host) = outdated.find(self.layout.host_binary_name()) {
            return SelfReplacer::new(scheduler, Arc::clone(&self.relauncher), self.relaunch)
                .replace(host)
                .await;
        }

        scheduler.update_all(&outdated).await?;
        info!("All files updated");
        Ok(Outcome::Updated)
    }

    fn scheduler(&self) -> DownloadScheduler {
        let scheduler = DownloadScheduler::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.hasher),
            Arc::clone(&self.progress),
            self.layout.clone(),
            self.config.file_base_url.clone(),
        );
        match self.hardware_concurrency {
            Some(cores) => scheduler.with_hardware_concurrency(cores),
            None => scheduler,
        }
    }

    async fn outdated(&self, files: Vec<FileDescriptor>) -> Result<UpdateBatch, UpdateError> {
        let checker =
            StalenessChecker::new(self.layout.clone(), Arc::clone(&self.hasher), self.host_policy);
        tokio::task::spawn_blocking(move || checker.outdated(&files))
            .await
            .map_err(|error| UpdateError::Worker {
                details: error.to_string(),
            })
    }

    async fn ensure_bootstrap_assets(&self, scheduler: &DownloadScheduler) {
        for name in &self.config.bootstrap_assets {
            let asset = FileDescriptor::unchecked(name.as_str());
            if !asset.has_safe_name() || self.layout.resolve(&asset).exists() {
                continue;
            }

            info!("Fetching missing {name}");
            if let Err(error) = scheduler.update_file(&asset).await {
                warn!("Could not fetch {name}: {error}");
            }
        }
    }
}
