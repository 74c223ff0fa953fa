use std::path::PathBuf;

/// Lookup of per-user locations that live outside the installation.
///
/// The updater only needs the local application data root (`LOCALAPPDATA`
/// on Windows, `XDG_DATA_HOME` or its fallback elsewhere), where external
/// components expect placeholder files to exist.
pub trait EnvironmentProvider: Send + Sync {
    fn local_data_dir(&self) -> Option<PathBuf>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn local_data_dir(&self) -> Option<PathBuf> {
        dirs::data_local_dir()
    }
}
