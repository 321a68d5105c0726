use std::path::{Path, PathBuf};

/// Where the task file lives.
pub struct Config {
    pub data_file: PathBuf,
}

impl Config {
    /// `data_file` comes from `--data-file` or `TASKY_DATA_FILE`; otherwise
    /// the file goes under the platform data directory.
    pub fn resolve(data_file: Option<PathBuf>) -> Self {
        Self {
            data_file: data_file.unwrap_or_else(default_data_file),
        }
    }

    /// Creates the parent directory of the data file if it doesn't exist.
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        match self.data_file.parent() {
            Some(parent) if parent != Path::new("") => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

/// `$XDG_DATA_HOME/tasky/data.json` or the platform equivalent.
pub fn default_data_file() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tasky")
        .join("data.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_path_wins() {
        let config = Config::resolve(Some(PathBuf::from("/tmp/elsewhere.json")));
        assert_eq!(config.data_file, PathBuf::from("/tmp/elsewhere.json"));
    }

    #[test]
    fn test_default_path_structure() {
        let config = Config::resolve(None);
        assert!(config.data_file.ends_with("tasky/data.json"));
    }

    #[test]
    fn test_ensure_data_dir_creates_parents() {
        let dir = TempDir::new().unwrap();
        let config = Config::resolve(Some(dir.path().join("a").join("b").join("data.json")));

        config.ensure_data_dir().unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
    }

    #[test]
    fn test_bare_file_name_needs_no_directory() {
        let config = Config::resolve(Some(PathBuf::from("data.json")));
        assert!(config.ensure_data_dir().is_ok());
    }
}
