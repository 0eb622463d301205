//! Layered settings: `config/default.toml`, `config/{DOCKET_ENV}.toml`,
//! then `DOCKET__SECTION__KEY` environment variables (strongest).

use std::path::PathBuf;

use config::{Config as ConfigLoader, ConfigError, Environment, File, FileFormat};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    /// Actor label used until a session picks its own.
    #[serde(default = "default_user")]
    pub default_user: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8080 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// GitHub when a token and repo are configured, local files otherwise.
    Auto,
    Local,
    Github,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: Backend,
    /// Root under which `data/items.json` and friends are written.
    pub data_dir: PathBuf,
    /// 0 keeps cached reads until the next write.
    pub cache_ttl_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: Backend::Auto, data_dir: PathBuf::from("."), cache_ttl_secs: 60 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    #[serde(deserialize_with = "secret")]
    pub token: Option<SecretString>,
    /// "owner/name"
    pub repo: Option<String>,
    pub branch: String,
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            repo: None,
            branch: "main".to_string(),
            api_url: "https://api.github.com".to_string(),
        }
    }
}

impl GitHubConfig {
    /// Token and repo, when both are present and non-blank.
    pub fn credentials(&self) -> Option<(SecretString, String)> {
        let token = self.token.as_ref().filter(|t| !t.expose_secret().trim().is_empty())?;
        let repo = self.repo.as_deref().map(str::trim).filter(|r| !r.is_empty())?;
        Some((token.clone(), repo.to_string()))
    }
}

fn secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

fn default_user() -> String {
    "anon@example.com".to_string()
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("DOCKET_ENV").unwrap_or_else(|_| "dev".to_string());

        ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                Environment::with_prefix("DOCKET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Parses settings from a TOML string (useful for testing)
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// The backend to build; `Auto` is decided once here, at boot.
    pub fn backend(&self) -> Backend {
        match self.storage.backend {
            Backend::Auto if self.github.credentials().is_some() => Backend::Github,
            Backend::Auto => Backend::Local,
            chosen => chosen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.storage.backend, Backend::Auto);
        assert_eq!(settings.github.branch, "main");
        assert_eq!(settings.default_user, "anon@example.com");
        assert_eq!(settings.backend(), Backend::Local);
    }

    #[test]
    fn auto_picks_github_when_configured() {
        let settings = Settings::from_toml(
            r#"
            [github]
            token = "ghp_example"
            repo = "acme/docket-data"
            "#,
        )
        .unwrap();
        assert_eq!(settings.backend(), Backend::Github);
        let (token, repo) = settings.github.credentials().unwrap();
        assert_eq!(token.expose_secret(), "ghp_example");
        assert_eq!(repo, "acme/docket-data");
    }

    #[test]
    fn blank_token_is_not_configured() {
        let settings = Settings::from_toml(
            r#"
            [github]
            token = "  "
            repo = "acme/docket-data"
            "#,
        )
        .unwrap();
        assert_eq!(settings.backend(), Backend::Local);
    }

    #[test]
    fn explicit_backend_wins() {
        let settings = Settings::from_toml(
            r#"
            default_user = "ana@corp.com"

            [storage]
            backend = "memory"
            cache_ttl_secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(settings.backend(), Backend::Memory);
        assert_eq!(settings.storage.cache_ttl_secs, 0);
        assert_eq!(settings.default_user, "ana@corp.com");
    }

    #[test]
    fn token_is_redacted_in_debug() {
        let settings = Settings::from_toml("[github]\ntoken = \"ghp_secret\"").unwrap();
        assert!(!format!("{settings:?}").contains("ghp_secret"));
    }
}
