//! Tool configuration helpers.
//!
//! Defaults are built in; `SHFS_ADD_FILE_TOOLS` may replace the candidate
//! list of any tool or the trigger scope. Keys the override omits keep their
//! defaults.
use super::{CTLTRIGGER, DEFAULT_SCOPE, EXE_DIR_PLACEHOLDER, SHFS_ADMIN, TOOLS_ENV};
use crate::error::{AddFileError, Result};
use crate::util::is_blank;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolsConfig {
    /// Scope addressed by remount triggers.
    pub scope: String,
    /// Ordered candidate locations per logical tool; the first is preferred.
    pub tools: BTreeMap<String, Vec<String>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ToolsOverride {
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    tools: BTreeMap<String, Vec<String>>,
}

/// Build the configuration used when no override is present.
pub fn default_config() -> ToolsConfig {
    let mut tools = BTreeMap::new();
    tools.insert(
        SHFS_ADMIN.to_string(),
        vec![
            SHFS_ADMIN.to_string(),
            format!("{EXE_DIR_PLACEHOLDER}/../shfs-tools/{SHFS_ADMIN}"),
        ],
    );
    tools.insert(
        CTLTRIGGER.to_string(),
        vec![
            CTLTRIGGER.to_string(),
            format!("{EXE_DIR_PLACEHOLDER}/../ctltrigger/{CTLTRIGGER}"),
        ],
    );
    ToolsConfig {
        scope: DEFAULT_SCOPE.to_string(),
        tools,
    }
}

/// Load defaults merged with `SHFS_ADD_FILE_TOOLS`, if set.
pub fn load_tools_config() -> Result<ToolsConfig> {
    match env::var(TOOLS_ENV) {
        Ok(raw) => parse_tools_config(&raw),
        Err(env::VarError::NotPresent) => Ok(default_config()),
        Err(err) => Err(AddFileError::Config(format!("{TOOLS_ENV}: {err}"))),
    }
}

/// Parse a JSON override and merge it onto the defaults.
pub fn parse_tools_config(raw: &str) -> Result<ToolsConfig> {
    let parsed: ToolsOverride = serde_json::from_str(raw)
        .map_err(|err| AddFileError::Config(format!("parse {TOOLS_ENV}: {err}")))?;
    let mut config = default_config();
    if let Some(scope) = parsed.scope {
        config.scope = scope;
    }
    config.tools.extend(parsed.tools);
    validate_tools_config(&config)?;
    Ok(config)
}

fn validate_tools_config(config: &ToolsConfig) -> Result<()> {
    if is_blank(&config.scope) {
        return Err(AddFileError::Config("scope must be non-empty".to_string()));
    }
    for (tool, candidates) in &config.tools {
        if candidates.is_empty() {
            return Err(AddFileError::Config(format!(
                "tool '{tool}' has no candidate locations"
            )));
        }
        if candidates.iter().any(|candidate| is_blank(candidate)) {
            return Err(AddFileError::Config(format!(
                "tool '{tool}' has an empty candidate location"
            )));
        }
    }
    Ok(())
}
