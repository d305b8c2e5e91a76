// src/config.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SKILL_INCREMENT: u32 = 5;

/// Contents of `dio-config.json`.
///
/// Unknown keys are kept in `extra` so a rewrite of the file (to stamp
/// `last_update`) never drops fields added by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DioConfig {
    #[serde(default)]
    pub dio_username: String,
    #[serde(default = "default_skill_increment")]
    pub skill_increment: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_skill_increment() -> u32 {
    DEFAULT_SKILL_INCREMENT
}

impl DioConfig {
    /// Validate the parts of the config every run needs.
    pub fn validate(&self) -> Result<()> {
        if self.dio_username.trim().is_empty() {
            anyhow::bail!("dio_username is not set in the config file");
        }
        Ok(())
    }
}

/// Login credentials for the authenticated fetch, taken from the
/// environment so they never end up in a config file.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        let email = std::env::var("DIO_EMAIL")
            .map_err(|_| anyhow::anyhow!("DIO_EMAIL environment variable not set"))?;
        let password = std::env::var("DIO_PASSWORD")
            .map_err(|_| anyhow::anyhow!("DIO_PASSWORD environment variable not set"))?;

        if email.trim().is_empty() || password.trim().is_empty() {
            anyhow::bail!("DIO_EMAIL and DIO_PASSWORD must not be empty");
        }

        Ok(Self { email, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_config_keys_survive_a_round_trip() {
        let raw = r#"{
            "dio_username": "someone",
            "skill_increment": 10,
            "theme": "dark"
        }"#;

        let config: DioConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.dio_username, "someone");
        assert_eq!(config.skill_increment, 10);

        let rewritten = serde_json::to_string(&config).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rewritten).unwrap();
        assert_eq!(value["theme"], "dark");
    }

    #[test]
    fn skill_increment_defaults_to_five() {
        let config: DioConfig = serde_json::from_str(r#"{"dio_username": "x"}"#).unwrap();
        assert_eq!(config.skill_increment, DEFAULT_SKILL_INCREMENT);
    }

    #[test]
    fn empty_username_fails_validation() {
        let config: DioConfig = serde_json::from_str(r#"{"dio_username": "  "}"#).unwrap();
        assert!(config.validate().is_err());
    }
}
