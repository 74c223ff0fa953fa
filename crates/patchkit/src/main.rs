mod flags;
mod logging;
mod progress;
mod settings;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use log::{error, info, warn};
use patchkit_core::{
    HostBinaryPolicy, HttpTransport, Outcome, ProcessRelauncher, TransportError, UpdateError,
    Updater,
};
use patchkit_platform::AppPaths;
use thiserror::Error;

use crate::flags::Flags;
use crate::progress::LogProgress;
use crate::settings::Settings;

#[derive(Debug, Error)]
enum AppError {
    #[error("failed to locate the running executable: {0}")]
    Executable(#[source] std::io::Error),
    #[error("could not determine the installation directory")]
    InstallDir,
    #[error("failed to set up HTTP client: {0}")]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Update(#[from] UpdateError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let flags = Flags::from_env();
    let paths = AppPaths::new().ok();
    let (settings, settings_error) = match Settings::load(paths.as_ref()) {
        Ok(settings) => (settings, None),
        Err(error) => (Settings::default(), Some(error)),
    };

    logging::init_logging(
        paths.as_ref(),
        flags.debug || settings.debug_logging,
        settings.max_log_size_bytes,
    );
    if let Some(error) = settings_error {
        warn!("Using default settings: {error}");
    }

    match run(flags, &settings).await {
        Ok(Outcome::RestartRequired) => {
            info!("Update installed, handing over to the new process");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Updated) => {
            info!("Update complete");
            ExitCode::SUCCESS
        }
        Ok(Outcome::NothingToDo) => {
            info!("Nothing to update");
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!("Update failed: {}", error_chain(&error));
            ExitCode::FAILURE
        }
    }
}

async fn run(flags: Flags, settings: &Settings) -> Result<Outcome, AppError> {
    let executable = patchkit_platform::current_executable().map_err(AppError::Executable)?;
    let base_dir = install_dir(settings, &executable).ok_or(AppError::InstallDir)?;
    let transport = HttpTransport::with_defaults()?;

    let updater = Updater::new(
        settings.updater_config(),
        base_dir,
        executable,
        Arc::new(transport),
    )
    .with_hasher(settings.hash_algorithm.hasher())
    .with_progress(Arc::new(LogProgress))
    .with_relauncher(Arc::new(ProcessRelauncher::new(flags::forwarded_args(
        std::env::args_os().skip(1),
    ))))
    .with_host_policy(HostBinaryPolicy::for_build(
        cfg!(not(debug_assertions)),
        flags.force_update,
    ))
    .with_relaunch(!flags.no_relaunch);

    Ok(updater.run().await?)
}

fn install_dir(settings: &Settings, executable: &Path) -> Option<PathBuf> {
    settings
        .install_dir
        .clone()
        .or_else(|| executable.parent().map(Path::to_path_buf))
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use patchkit_core::{TransportError, UpdateError};

    use super::{AppError, error_chain, install_dir};
    use crate::settings::Settings;

    #[test]
    fn install_dir_defaults_to_executable_parent() {
        let settings = Settings::default();
        assert_eq!(
            install_dir(&settings, Path::new("/games/t7/boiii.exe")),
            Some(PathBuf::from("/games/t7"))
        );
    }

    #[test]
    fn install_dir_setting_wins() {
        let settings = Settings {
            install_dir: Some(PathBuf::from("/srv/t7")),
            ..Settings::default()
        };
        assert_eq!(
            install_dir(&settings, Path::new("/games/t7/boiii.exe")),
            Some(PathBuf::from("/srv/t7"))
        );
    }

    #[test]
    fn error_chain_does_not_repeat_causes() {
        let error = AppError::from(UpdateError::Transport {
            url: "https://h/a.dll".to_string(),
            source: TransportError::Status { status: 502 },
        });
        assert_eq!(
            error_chain(&error),
            "failed to download https://h/a.dll: server responded with HTTP 502"
        );
    }
}
