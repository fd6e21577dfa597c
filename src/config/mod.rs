use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(alias = "catalog")]
    pub catalogue: Option<String>,
    pub images: Option<String>,
    pub primary_format: Option<String>,
    pub fallback_format: Option<String>,
    pub theme: Option<String>,
    pub timeout: Option<u64>,
    pub workers: Option<usize>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub proxy: Option<String>,
    pub no_color: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".blueprint-pools").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn parse_config(contents: &str, origin: &str) -> Result<ConfigFile, String> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents)
        .map_err(|e| format!("failed to parse config '{origin}': {e}"))
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents, &path.display().to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

pub fn default_config_yaml() -> String {
    r#"# blueprint-pools config
#
# Location (default):
#   ~/.blueprint-pools/config.yml

# Catalogue document (file path or http(s) URL)
catalogue: ./blueprints.json

# Image root (directory or http(s) base URL); images live at
# {images}/{weapon}/{blueprint}.{format}
images: ./images
primary_format: png
fallback_format: jpg

# HTTP (optional)
timeout: 10
# proxy: http://127.0.0.1:8080

# Runtime
workers: 4

# Output (optional)
# output: ./pools.html
# output_format: html
theme: dark
no_color: false
"#
    .to_string()
}

/// Writes the default config to `path` unless a file is already there.
/// Returns whether a file was written.
pub fn ensure_default_config_file(path: &PathBuf) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_yaml_parses() {
        let cfg = parse_config(&default_config_yaml(), "default").unwrap();
        assert_eq!(cfg.catalogue.as_deref(), Some("./blueprints.json"));
        assert_eq!(cfg.fallback_format.as_deref(), Some("jpg"));
        assert_eq!(cfg.timeout, Some(10));
        assert_eq!(cfg.output, None);
    }

    #[test]
    fn catalog_alias_is_accepted() {
        let cfg = parse_config("catalog: https://example.com/bp.json\n", "inline").unwrap();
        assert_eq!(cfg.catalogue.as_deref(), Some("https://example.com/bp.json"));
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(parse_config("  \n", "inline").unwrap(), ConfigFile::default());
    }

    #[test]
    fn missing_config_allowed_only_when_asked() {
        let path = std::env::temp_dir().join(format!(
            "blueprint_pools_no_config_{}.yml",
            std::process::id()
        ));
        assert_eq!(load_config(&path, true).unwrap(), ConfigFile::default());
        assert!(load_config(&path, false).is_err());
    }

    #[test]
    fn default_config_file_written_once() {
        let dir = std::env::temp_dir().join(format!(
            "blueprint_pools_cfg_{}",
            std::process::id()
        ));
        let path = dir.join("config.yml");
        let _ = std::fs::remove_dir_all(&dir);

        assert!(ensure_default_config_file(&path).unwrap());
        assert!(!ensure_default_config_file(&path).unwrap());
        assert_eq!(
            load_config(&path, false).unwrap().images.as_deref(),
            Some("./images")
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~/images"), home.join("images"));
        }
        assert_eq!(expand_tilde("./images"), PathBuf::from("./images"));
    }
}
