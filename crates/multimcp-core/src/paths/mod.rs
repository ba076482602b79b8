//! Filesystem locations used by the manager.
//!
//! The settings path anchors everything else: the backup directory and the
//! database default to siblings of it.

mod error;

pub use error::PathError;

use std::path::{Path, PathBuf};

/// Database file name inside the settings directory.
pub const DATABASE_FILE_NAME: &str = "mcp.db";

/// Backup directory name inside the settings directory.
pub const BACKUP_DIR_NAME: &str = "backups";

/// `~/.config/mcp/settings.json`.
pub fn default_settings_path() -> Result<PathBuf, PathError> {
    let home = dirs::home_dir().ok_or(PathError::NoHomeDir)?;
    Ok(home.join(".config").join("mcp").join("settings.json"))
}

fn settings_dir(settings_path: &Path) -> PathBuf {
    settings_path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// `<settings dir>/backups`.
pub fn default_backup_dir(settings_path: &Path) -> PathBuf {
    settings_dir(settings_path).join(BACKUP_DIR_NAME)
}

/// `<settings dir>/mcp.db`.
pub fn database_path(settings_path: &Path) -> PathBuf {
    settings_dir(settings_path).join(DATABASE_FILE_NAME)
}

/// Fully resolved manager paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub settings_path: PathBuf,
    pub backup_dir: PathBuf,
    pub database_path: PathBuf,
}

impl ResolvedPaths {
    /// Fill in defaults for whichever locations were not given explicitly.
    pub fn resolve(
        settings_path: Option<PathBuf>,
        backup_dir: Option<PathBuf>,
    ) -> Result<Self, PathError> {
        let settings_path = match settings_path {
            Some(path) if path.as_os_str().is_empty() => return Err(PathError::EmptyPath),
            Some(path) => path,
            None => default_settings_path()?,
        };
        let backup_dir = backup_dir.unwrap_or_else(|| default_backup_dir(&settings_path));
        let database_path = database_path(&settings_path);

        Ok(Self {
            settings_path,
            backup_dir,
            database_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_siblings_of_settings_file() {
        let settings = PathBuf::from("/srv/mcp/settings.json");
        assert_eq!(default_backup_dir(&settings), PathBuf::from("/srv/mcp/backups"));
        assert_eq!(database_path(&settings), PathBuf::from("/srv/mcp/mcp.db"));
    }

    #[test]
    fn test_resolve_prefers_explicit_backup_dir() {
        let paths = ResolvedPaths::resolve(
            Some(PathBuf::from("/srv/mcp/settings.json")),
            Some(PathBuf::from("/var/backups/mcp")),
        )
        .unwrap();

        assert_eq!(paths.backup_dir, PathBuf::from("/var/backups/mcp"));
        assert_eq!(paths.database_path, PathBuf::from("/srv/mcp/mcp.db"));
    }

    #[test]
    fn test_resolve_rejects_empty_settings_path() {
        let err = ResolvedPaths::resolve(Some(PathBuf::new()), None).unwrap_err();
        assert!(matches!(err, PathError::EmptyPath));
    }

    #[test]
    fn test_default_settings_path_shape() {
        if let Ok(path) = default_settings_path() {
            assert!(path.ends_with(".config/mcp/settings.json"));
        }
    }
}
