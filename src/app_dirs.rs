use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "abagames";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("abagames_config.json"))
    }

    /// Where the binary writes its log file.
    pub fn log_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_is_json() {
        let path = AppDirs::config_path();
        assert_eq!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("json")
        );
    }

    #[test]
    fn log_dir_is_namespaced() {
        if let Some(dir) = AppDirs::log_dir() {
            assert!(dir.ends_with(APP_NAME));
        }
    }
}
