use crate::types::*;
use std::{
  env,
  fs,
  path::{Path, PathBuf},
};

pub fn repo_root() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn resolve_repo_path(raw: &str) -> PathBuf {
  let path = PathBuf::from(raw);
  if path.is_absolute() {
    path
  } else {
    repo_root().join(path)
  }
}

pub fn config_path() -> PathBuf {
  match env_default("BRACKET_CONFIG_PATH") {
    Some(raw) => resolve_repo_path(&raw),
    None => repo_root().join("bracket.json"),
  }
}

pub fn env_default(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

pub fn apply_env_defaults(mut config: AppConfig) -> AppConfig {
  if let Some(value) = env_default("BRACKET_BIND_ADDR") {
    config.bind_addr = value;
  }
  if let Some(value) = env_default("BRACKET_STATIC_DIR") {
    config.static_dir = value;
  }
  if let Some(value) = env_default("BRACKET_FONT_FAMILY") {
    config.bracket.font_family = value;
  }
  if let Some(value) = env_default("BRACKET_VIEW_MODE") {
    match ViewMode::parse(&value) {
      Ok(mode) => config.bracket.view_mode = mode,
      Err(e) => tracing::warn!("ignoring BRACKET_VIEW_MODE: {e}"),
    }
  }
  config
}

pub fn parse_config(data: &str) -> Result<AppConfig, String> {
  let config = serde_json::from_str::<AppConfig>(data).map_err(|e| format!("parse config: {e}"))?;
  config.bracket.clone().validated()?;
  Ok(config)
}

/// Reads a config file as written; a missing file yields the defaults.
/// Environment overrides are applied by the caller.
pub fn read_config_file(path: &Path) -> Result<AppConfig, String> {
  if !path.is_file() {
    return Ok(AppConfig::default());
  }
  let data = fs::read_to_string(path).map_err(|e| format!("read config {}: {e}", path.display()))?;
  parse_config(&data).map_err(|e| format!("{}: {e}", path.display()))
}

pub fn load_config_inner() -> Result<AppConfig, String> {
  read_config_file(&config_path()).map(apply_env_defaults)
}

pub fn save_config_to(path: &Path, config: AppConfig) -> Result<AppConfig, String> {
  config.bracket.clone().validated()?;
  let payload = serde_json::to_string_pretty(&config).map_err(|e| e.to_string())?;
  fs::write(path, payload).map_err(|e| format!("write config {}: {e}", path.display()))?;
  Ok(config)
}

pub fn load_env_file() {
  let env_path = repo_root().join(".env");
  if !env_path.is_file() {
    return;
  }
  let contents = match fs::read_to_string(&env_path) {
    Ok(data) => data,
    Err(_) => return,
  };
  for line in contents.lines() {
    if let Some((key, value)) = parse_env_line(line) {
      if env::var_os(&key).is_none() {
        env::set_var(key, value);
      }
    }
  }
}

pub fn parse_env_line(line: &str) -> Option<(String, String)> {
  let trimmed = line.trim();
  if trimmed.is_empty() || trimmed.starts_with('#') {
    return None;
  }
  let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
  let (key, raw_value) = trimmed.split_once('=')?;
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  let mut value = raw_value.trim();
  if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if let Some(idx) = value.find('#') {
    value = value[..idx].trim_end();
  }
  Some((key.to_string(), value.to_string()))
}

pub fn static_dir(config: &AppConfig) -> PathBuf {
  resolve_repo_path(config.static_dir.trim())
}

pub fn log_env_warnings(config: &AppConfig) {
  let mut warnings = Vec::new();

  if !static_dir(config).is_dir() {
    warnings.push(format!(
      "static dir {} not found; only the JSON and SVG endpoints will be served",
      static_dir(config).display()
    ));
  }
  if !FONT_CHOICES.contains(&config.bracket.font_family.as_str()) {
    warnings.push(format!(
      "font family \"{}\" is not one of the bundled choices",
      config.bracket.font_family
    ));
  }

  for msg in warnings {
    tracing::warn!("{}", msg);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn env_lines() {
    assert_eq!(parse_env_line("# comment"), None);
    assert_eq!(parse_env_line(""), None);
    assert_eq!(parse_env_line("=value"), None);
    assert_eq!(
      parse_env_line("export BRACKET_BIND_ADDR=0.0.0.0:8080"),
      Some(("BRACKET_BIND_ADDR".to_string(), "0.0.0.0:8080".to_string()))
    );
    assert_eq!(
      parse_env_line("BRACKET_FONT_FAMILY=\"Open Sans\""),
      Some(("BRACKET_FONT_FAMILY".to_string(), "Open Sans".to_string()))
    );
    assert_eq!(
      parse_env_line("BRACKET_VIEW_MODE=mirrored # centered final"),
      Some(("BRACKET_VIEW_MODE".to_string(), "mirrored".to_string()))
    );
  }

  #[test]
  fn parse_config_validates_bracket_section() {
    let config = parse_config(r#"{"bindAddr":"0.0.0.0:9000","bracket":{"viewMode":"mirrored"}}"#).unwrap();
    assert_eq!(config.bind_addr, "0.0.0.0:9000");
    assert_eq!(config.bracket.view_mode, ViewMode::Mirrored);
    assert_eq!(config.static_dir, DEFAULT_STATIC_DIR);

    assert!(parse_config(r#"{"bracket":{"roundGap":-5}}"#).is_err());
    assert!(parse_config("not json").is_err());
  }

  #[test]
  fn save_then_load_round_trips_through_disk() {
    let path = env::temp_dir().join(format!("bracket-config-{}.json", std::process::id()));
    let mut config = AppConfig::default();
    config.bracket.match_width = 240.0;
    config.bracket.colors.winner_highlight = "#00FF00".to_string();
    save_config_to(&path, config.clone()).unwrap();
    let loaded = read_config_file(&path).unwrap();
    fs::remove_file(&path).ok();
    assert_eq!(loaded.bracket.match_width, 240.0);
    assert_eq!(loaded.bracket.colors.winner_highlight, "#00FF00");

    let mut invalid = AppConfig::default();
    invalid.bracket.match_height = 0.0;
    assert!(save_config_to(&path, invalid).is_err());
    assert!(!path.exists());
  }

  #[test]
  fn missing_file_yields_defaults() {
    let path = env::temp_dir().join("bracket-config-does-not-exist.json");
    let config = read_config_file(&path).unwrap();
    assert_eq!(config, AppConfig::default());
  }

  #[test]
  fn relative_paths_resolve_under_repo_root() {
    assert_eq!(resolve_repo_path("overlay"), repo_root().join("overlay"));
    let absolute = if cfg!(windows) { "C:\\bracket" } else { "/tmp/bracket" };
    assert_eq!(resolve_repo_path(absolute), PathBuf::from(absolute));
  }
}
