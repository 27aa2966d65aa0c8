// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading.
//!
//! Later layers override earlier ones: compiled defaults, then
//! `/etc/krishi/krishi.toml`, `~/.config/krishi/krishi.toml`,
//! `./krishi.toml`, and finally `KRISHI_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::KrishiConfig;

/// Config file name searched in every layer.
pub const CONFIG_FILE: &str = "krishi.toml";

/// Sections recognised in `KRISHI_<SECTION>_<KEY>` variables.
///
/// Longer names come first so `disease_model_` is matched before any
/// shorter section that shares a prefix.
const ENV_SECTIONS: &[&str] = &[
    "disease_model",
    "pest_model",
    "weather",
    "memory",
    "server",
    "agent",
    "llm",
];

/// Paths of the file layers, lowest precedence first.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/krishi").join(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("krishi").join(CONFIG_FILE));
    }
    paths.push(PathBuf::from(CONFIG_FILE));
    paths
}

/// Builds the full figment without extracting it.
pub fn build_figment() -> Figment {
    let base = Figment::new().merge(Serialized::defaults(KrishiConfig::default()));
    config_paths()
        .into_iter()
        .fold(base, |fig, path| fig.merge(Toml::file(path)))
        .merge(env_provider())
}

/// Loads configuration from every layer.
pub fn load_config() -> Result<KrishiConfig, figment::Error> {
    build_figment().extract()
}

/// Loads configuration from a TOML string on top of the defaults only.
pub fn load_config_from_str(toml_content: &str) -> Result<KrishiConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KrishiConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Loads configuration from one explicit file plus environment overrides.
pub fn load_config_from_path(path: &Path) -> Result<KrishiConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KrishiConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Maps a lowercased, prefix-stripped env key to its dotted config path.
///
/// `llm_api_key` becomes `llm.api_key`; `disease_model_input_size` becomes
/// `disease_model.input_size`. Keys with no known section are returned as-is.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
            .filter(|r| !r.is_empty())
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("KRISHI_").map(|key| map_env_key(key.as_str()).into())
}
