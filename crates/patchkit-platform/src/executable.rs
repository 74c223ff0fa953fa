use std::path::PathBuf;

use log::info;

const DELETED_SUFFIX: &str = " (deleted)";

/// Resolve the path of the running executable.
///
/// # Errors
/// Returns an error if the operating system cannot report the path.
pub fn current_executable() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(strip_deleted_suffix(exe))
}

/// On Linux, once the backing file of a running process has been renamed or
/// unlinked, `/proc/self/exe` reports the old inode with `" (deleted)"`
/// appended. The path that matters is the one without the suffix.
#[must_use]
pub fn strip_deleted_suffix(path: PathBuf) -> PathBuf {
    let text = path.to_string_lossy();
    if let Some(stripped) = text.strip_suffix(DELETED_SUFFIX) {
        let fixed = PathBuf::from(stripped);
        info!("Adjusted exe path from deleted inode: {}", fixed.display());
        fixed
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::strip_deleted_suffix;

    #[test]
    fn strips_deleted_inode_suffix() {
        let path = strip_deleted_suffix(PathBuf::from("/opt/game/client (deleted)"));
        assert_eq!(path, PathBuf::from("/opt/game/client"));
    }

    #[test]
    fn leaves_regular_paths_untouched() {
        let path = strip_deleted_suffix(PathBuf::from("/opt/game/client"));
        assert_eq!(path, PathBuf::from("/opt/game/client"));
    }

    #[test]
    fn current_executable_points_at_existing_file() {
        let exe = super::current_executable().expect("current exe should resolve");
        assert!(exe.is_file());
    }
}
