use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::descriptor::FileDescriptor;

const BACKUP_SUFFIX: &str = ".old";

/// Where descriptors live on disk.
#[derive(Debug, Clone)]
pub struct InstallLayout {
    base_dir: PathBuf,
    executable: PathBuf,
    backup: PathBuf,
    host_binary_name: String,
}

impl InstallLayout {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        executable: impl Into<PathBuf>,
        host_binary_name: impl Into<String>,
    ) -> Self {
        let executable = executable.into();
        Self {
            base_dir: base_dir.into(),
            backup: with_name_suffix(&executable, BACKUP_SUFFIX),
            executable,
            host_binary_name: host_binary_name.into(),
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Path the running executable is parked at while it is being replaced.
    #[must_use]
    pub fn backup(&self) -> &Path {
        &self.backup
    }

    #[must_use]
    pub fn host_binary_name(&self) -> &str {
        &self.host_binary_name
    }

    #[must_use]
    pub fn is_host_binary(&self, file: &FileDescriptor) -> bool {
        file.name == self.host_binary_name
    }

    #[must_use]
    pub fn resolve(&self, file: &FileDescriptor) -> PathBuf {
        if self.is_host_binary(file) {
            self.executable.clone()
        } else {
            self.base_dir.join(&file.name)
        }
    }
}

/// `dir/name.ext` -> `dir/name.ext<suffix>`.
pub(crate) fn with_name_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(OsString::new, std::ffi::OsStr::to_os_string);
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::InstallLayout;
    use crate::descriptor::FileDescriptor;

    fn layout() -> InstallLayout {
        InstallLayout::new("/games/t7", "/opt/bin/boiii.exe", "boiii.exe")
    }

    #[test]
    fn host_descriptor_resolves_to_running_executable() {
        let host = FileDescriptor::new("boiii.exe", 0, "abc");
        assert_eq!(layout().resolve(&host), PathBuf::from("/opt/bin/boiii.exe"));
    }

    #[test]
    fn other_descriptors_resolve_under_base() {
        let file = FileDescriptor::unchecked("data/launcher/main.html");
        assert_eq!(
            layout().resolve(&file),
            PathBuf::from("/games/t7/data/launcher/main.html")
        );
    }

    #[test]
    fn backup_appends_old_suffix() {
        assert_eq!(layout().backup(), PathBuf::from("/opt/bin/boiii.exe.old"));

        let unix = InstallLayout::new("/srv", "/usr/local/bin/client", "client");
        assert_eq!(unix.backup(), PathBuf::from("/usr/local/bin/client.old"));
    }
}
