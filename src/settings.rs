use std::fs;
use std::io;
use std::path::PathBuf;

use crate::navigator::SortPolicy;

const SETTINGS_ENV_PATH: &str = "PURGE_SETTINGS_PATH";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AppSettings {
    pub sort_by_size: bool,
    pub confirm_delete: bool,
    /// Zero picks a size from the CPU count.
    pub worker_threads: usize,
    pub log_file: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            sort_by_size: false,
            confirm_delete: true,
            worker_threads: 0,
            log_file: None,
        }
    }
}

impl AppSettings {
    pub fn sort_policy(&self) -> SortPolicy {
        if self.sort_by_size {
            SortPolicy::SizeDescending
        } else {
            SortPolicy::Listing
        }
    }
}

pub fn load_settings() -> AppSettings {
    try_load_settings().unwrap_or_default()
}

pub fn try_load_settings() -> io::Result<AppSettings> {
    let path = settings_file_path();
    if !path.exists() {
        return Ok(AppSettings::default());
    }

    let content = fs::read_to_string(path)?;
    Ok(parse_settings(&content))
}

pub fn save_settings(settings: &AppSettings) -> io::Result<()> {
    let path = settings_file_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serialize_settings(settings))
}

pub fn settings_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os(SETTINGS_ENV_PATH) {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .filter(|home| !home.is_empty())
                .map(|home| PathBuf::from(home).join(".config"))
        });
    if let Some(mut path) = config_dir {
        path.push("purge");
        path.push("settings.conf");
        return path;
    }

    std::env::temp_dir().join("purge.settings.conf")
}

fn parse_settings(content: &str) -> AppSettings {
    let mut settings = AppSettings::default();

    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        let value = value.trim();

        match key {
            "sort_by_size" => {
                if let Some(v) = parse_bool(value) {
                    settings.sort_by_size = v;
                }
            }
            "confirm_delete" => {
                if let Some(v) = parse_bool(value) {
                    settings.confirm_delete = v;
                }
            }
            "worker_threads" => {
                if let Ok(v) = value.parse::<usize>() {
                    settings.worker_threads = v;
                }
            }
            "log_file" => {
                settings.log_file = parse_optional_path(value);
            }
            _ => {}
        }
    }

    settings
}

fn serialize_settings(settings: &AppSettings) -> String {
    let log_file = settings
        .log_file
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    format!(
        concat!(
            "# purge settings file\n",
            "# worker_threads=0 sizes the pool from the CPU count; an empty log_file disables logging.\n",
            "sort_by_size={sort_by_size}\n",
            "confirm_delete={confirm_delete}\n",
            "worker_threads={worker_threads}\n",
            "log_file={log_file}\n"
        ),
        sort_by_size = settings.sort_by_size,
        confirm_delete = settings.confirm_delete,
        worker_threads = settings.worker_threads,
        log_file = log_file,
    )
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("yes")
        || value == "1"
        || value.eq_ignore_ascii_case("on")
    {
        Some(true)
    } else if value.eq_ignore_ascii_case("false")
        || value.eq_ignore_ascii_case("no")
        || value == "0"
        || value.eq_ignore_ascii_case("off")
    {
        Some(false)
    } else {
        None
    }
}

fn parse_optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip_preserves_values() {
        let settings = AppSettings {
            sort_by_size: true,
            confirm_delete: false,
            worker_threads: 6,
            log_file: Some(PathBuf::from("/var/tmp/purge.log")),
        };

        let encoded = serialize_settings(&settings);
        let decoded = parse_settings(&encoded);

        assert_eq!(decoded, settings);
    }

    #[test]
    fn parse_settings_ignores_invalid_values() {
        let parsed = parse_settings(
            "sort_by_size=maybe\n\
             confirm_delete=perhaps\n\
             worker_threads=-3\n\
             unknown_key=1\n\
             not a setting\n",
        );

        assert_eq!(parsed, AppSettings::default());
    }

    #[test]
    fn parse_settings_accepts_loose_booleans_and_comments() {
        let parsed = parse_settings(
            "# comment\n\
             \n\
             sort_by_size = YES\n\
             confirm_delete=off\n",
        );

        assert!(parsed.sort_by_size);
        assert!(!parsed.confirm_delete);
        assert_eq!(parsed.sort_policy(), SortPolicy::SizeDescending);
    }
}
