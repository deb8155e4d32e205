use std::path::{Path, PathBuf};

use tracing::debug;

use crate::aws::{ENV_ACCESS_KEY_ID, ENV_DEFAULT_REGION, ENV_SECRET_ACCESS_KEY};
use crate::convergence::policy::PollPolicy;
use crate::error::{AwsError, Result};
use crate::types::config::Settings;

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "JOHANNA_CONFIG";

/// Candidates tried, in order, when neither `--config` nor `JOHANNA_CONFIG`
/// is given.
const DEFAULT_FILES: &[&str] = &["config.yaml", "config.yml", "config.json"];


/// Load, apply environment overrides, and validate.
pub fn load(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AwsError::config(format!("cannot read {}: {}", path.display(), e)))?;
    let mut settings = parse(&content)
        .map_err(|e| AwsError::config(format!("{}: {}", path.display(), e)))?;
    apply_env_overrides(&mut settings);
    validate(&settings)?;
    debug!(path = %path.display(), region = %settings.aws.default_region, "settings loaded");
    Ok(settings)
}


/// Parse YAML. A JSON document parses too.
pub fn parse(content: &str) -> std::result::Result<Settings, String> {
    serde_yaml::from_str(content).map_err(|e| e.to_string())
}


pub fn save(path: &Path, settings: &Settings) -> Result<()> {
    let content = serde_yaml::to_string(settings)
        .map_err(|e| AwsError::config(format!("cannot serialize settings: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}


/// Process environment wins over the file for the three AWS values.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides_from(settings, |key| std::env::var(key).ok());
}

pub fn apply_overrides_from<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let aws = &mut settings.aws;
    for (key, slot) in [
        (ENV_ACCESS_KEY_ID, &mut aws.access_key_id),
        (ENV_SECRET_ACCESS_KEY, &mut aws.secret_access_key),
        (ENV_DEFAULT_REGION, &mut aws.default_region),
    ] {
        if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
            debug!(key, "overridden from environment");
            *slot = value;
        }
    }
}


pub fn validate(settings: &Settings) -> Result<()> {
    let aws = &settings.aws;
    if aws.access_key_id.is_empty()
        || aws.secret_access_key.is_empty()
        || aws.default_region.is_empty()
    {
        return Err(AwsError::config(format!(
            "aws.{}, aws.{} and aws.{} are required",
            ENV_ACCESS_KEY_ID, ENV_SECRET_ACCESS_KEY, ENV_DEFAULT_REGION
        )));
    }
    if settings.bucket_prefix.is_empty() {
        return Err(AwsError::config("bucket_prefix must not be empty"));
    }
    PollPolicy::from_settings(&settings.poll)?;
    Ok(())
}


/// `explicit`, else `$JOHANNA_CONFIG`, else the first default file that
/// exists in `dir`.
pub fn resolve_path(explicit: Option<&Path>, dir: &Path) -> Result<PathBuf> {
    resolve_path_from(explicit, dir, |key| std::env::var(key).ok())
}

pub fn resolve_path_from<F>(explicit: Option<&Path>, dir: &Path, lookup: F) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    if let Some(p) = lookup(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    DEFAULT_FILES
        .iter()
        .map(|f| dir.join(f))
        .find(|p| p.exists())
        .ok_or_else(|| {
            AwsError::config(format!(
                "no settings file found in {} (tried {}); pass --config or set {}",
                dir.display(),
                DEFAULT_FILES.join(", "),
                CONFIG_ENV
            ))
        })
}
