use std::str::FromStr;

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use secrecy::SecretString;
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::sqlite::SqliteConnectOptions;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Config {
    pub application: Application,
    pub database: Database,
    #[serde(default)]
    pub recommendation: RecommendationSettings,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Application {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub run_migration: bool,
}

impl Application {
    pub fn get_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Database {
    pub url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_connections: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub min_connections: u32,
}

impl Database {
    pub fn connect_options(&self) -> Result<SqliteConnectOptions, sqlx::Error> {
        Ok(SqliteConnectOptions::from_str(&self.url)?
            .create_if_missing(true)
            .foreign_keys(true))
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct RecommendationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_seconds: u64,
    /// Asked in this order; later entries are fallbacks.
    #[serde(default)]
    pub providers: Vec<ProviderSettings>,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        RecommendationSettings {
            timeout_seconds: 20,
            providers: Vec::new(),
        }
    }
}

#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: SecretString,
    pub model: String,
    pub base_url: Option<String>,
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, anyhow::Error> {
        let base_path =
            std::env::current_dir().context("Failed to determine the current directory.")?;
        let config_directory = base_path.join("configuration");

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .map_err(anyhow::Error::msg)
            .context("Failed to parse APP_ENVIRONMENT.")?;

        let environment_filename = format!("{}.yaml", environment.as_str());

        Figment::new()
            .merge(Yaml::file(config_directory.join("base.yaml")))
            .merge(Yaml::file(config_directory.join(environment_filename)))
            .merge(Env::prefixed("APP_").split("__"))
            .extract()
            .context("Failed to read configuration.")
    }
}
