//! Layered configuration for folio.
//!
//! Values are merged from lowest to highest precedence:
//!
//! 1. built-in defaults,
//! 2. `folio.toml` in the platform configuration directory,
//! 3. an explicit file passed by the caller (TOML, YAML or JSON by extension),
//! 4. `FOLIO_*` environment variables (`FOLIO_INDEX_URL`, ...).
//!
//! The merged result is validated before it is handed out.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// File name looked up in the platform configuration directory.
pub const FILE_NAME: &str = "folio.toml";
/// Prefix of environment variables that override file values.
pub const ENV_PREFIX: &str = "FOLIO_";
/// Documents index used when nothing else is configured.
pub const DEFAULT_INDEX_URL: &str =
    "https://raw.githubusercontent.com/RealMaybe/realmaybe-io-website-data/main/data/docs.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache namespace, used in log output.
    pub name: String,
    /// Location of the JSON documents index.
    pub index_url: String,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Upper bound on a single index or content request.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "docs".to_string(),
            index_url: DEFAULT_INDEX_URL.to_string(),
            user_agent: concat!("folio/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load every layer, with `path` as the explicit file, and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let user = user_config_file();
        tracing::debug!(user = ?user, explicit = ?path, "Loading configuration");
        let figment = Self::layers(user.as_deref(), path)?.merge(Env::prefixed(ENV_PREFIX));
        Self::from_figment(&figment)
    }

    /// Defaults plus the file layers, without the environment.
    ///
    /// A missing `user` file is skipped; a missing `explicit` file is an error.
    pub fn layers(user: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(user) = user {
            figment = figment.merge(Toml::file(user));
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
            }
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
            };
        }
        Ok(figment)
    }

    /// Extract and validate a configuration from an assembled [`Figment`].
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load(describe(figment)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            exn::bail!(ErrorKind::invalid("name", "must not be empty"));
        }
        let url = Url::parse(&self.index_url).or_raise(|| ErrorKind::invalid("index_url", "not an absolute URL"))?;
        if !matches!(url.scheme(), "http" | "https") {
            exn::bail!(ErrorKind::invalid("index_url", format!("unsupported scheme {:?}", url.scheme())));
        }
        if self.request_timeout_secs == 0 {
            exn::bail!(ErrorKind::invalid("request_timeout_secs", "must be greater than zero"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `folio.toml` inside the platform configuration directory, if the platform has one.
pub fn user_config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "folio").map(|dirs| dirs.config_dir().join(FILE_NAME))
}

fn describe(figment: &Figment) -> String {
    let names: Vec<_> = figment.metadata().map(|metadata| metadata.name.to_string()).collect();
    if names.is_empty() { "configuration".to_string() } else { names.join(", ") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::from_figment(&Config::layers(None, None).unwrap()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.name, "docs");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[rstest]
    #[case(".toml", "name = \"guides\"\nrequest_timeout_secs = 5\n")]
    #[case(".yaml", "name: guides\nrequest_timeout_secs: 5\n")]
    #[case(".yml", "name: guides\nrequest_timeout_secs: 5\n")]
    #[case(".json", r#"{"name": "guides", "request_timeout_secs": 5}"#)]
    fn test_explicit_file_formats(#[case] suffix: &str, #[case] contents: &str) {
        let explicit = file(suffix, contents);
        let config = Config::from_figment(&Config::layers(None, Some(explicit.path())).unwrap()).unwrap();
        assert_eq!(config.name, "guides");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.index_url, DEFAULT_INDEX_URL);
    }

    #[test]
    fn test_explicit_file_overrides_user_file() {
        let user = file(".toml", "name = \"user\"\nuser_agent = \"custom/1.0\"\n");
        let explicit = file(".toml", "name = \"explicit\"\n");
        let config = Config::from_figment(&Config::layers(Some(user.path()), Some(explicit.path())).unwrap()).unwrap();
        assert_eq!(config.name, "explicit");
        assert_eq!(config.user_agent, "custom/1.0");
    }

    #[test]
    fn test_missing_user_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(FILE_NAME);
        let config = Config::from_figment(&Config::layers(Some(&missing), None).unwrap()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::layers(None, Some(&missing)).unwrap_err();
        assert_eq!(*err, ErrorKind::NotFound(missing));
    }

    #[test]
    fn test_unsupported_extension() {
        let explicit = file(".ini", "name = guides\n");
        let err = Config::layers(None, Some(explicit.path())).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
    }

    #[test]
    fn test_wrong_type_is_a_load_error() {
        let explicit = file(".toml", "request_timeout_secs = \"soon\"\n");
        let err = Config::from_figment(&Config::layers(None, Some(explicit.path())).unwrap()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Load(_)));
    }

    #[rstest]
    #[case("index_url = \"not a url\"\n", "index_url")]
    #[case("index_url = \"ftp://example.com/docs.json\"\n", "index_url")]
    #[case("index_url = \"file:///tmp/docs.json\"\n", "index_url")]
    #[case("request_timeout_secs = 0\n", "request_timeout_secs")]
    #[case("name = \"  \"\n", "name")]
    fn test_invalid_values(#[case] contents: &str, #[case] expected: &str) {
        let explicit = file(".toml", contents);
        let err = Config::from_figment(&Config::layers(None, Some(explicit.path())).unwrap()).unwrap_err();
        match &*err {
            ErrorKind::Invalid { field, .. } => assert_eq!(*field, expected),
            other => panic!("expected Invalid, got {other:?}"),
        }
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_environment_overrides_files() {
        Jail::expect_with(|jail| {
            jail.create_file("folio.toml", "name = \"file\"\nrequest_timeout_secs = 10\n")?;
            jail.set_env("FOLIO_NAME", "env");
            jail.set_env("FOLIO_INDEX_URL", "http://localhost:8080/docs.json");

            let explicit = jail.directory().join("folio.toml");
            let figment = Config::layers(None, Some(&explicit)).map_err(|err| (*err).to_string())?;
            let config = Config::from_figment(&figment.merge(Env::prefixed(ENV_PREFIX))).map_err(|err| (*err).to_string())?;
            assert_eq!(config.name, "env");
            assert_eq!(config.index_url, "http://localhost:8080/docs.json");
            assert_eq!(config.request_timeout_secs, 10);
            Ok(())
        });
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_load_reads_platform_config_dir() {
        Jail::expect_with(|jail| {
            let home = jail.directory().to_path_buf();
            jail.set_env("XDG_CONFIG_HOME", home.display());
            std::fs::create_dir_all(home.join("folio")).map_err(|err| err.to_string())?;
            jail.create_file("folio/folio.toml", "name = \"platform\"\nrequest_timeout_secs = 7\n")?;
            jail.set_env("FOLIO_REQUEST_TIMEOUT_SECS", "3");

            let config = Config::load(None).map_err(|err| (*err).to_string())?;
            assert_eq!(config.name, "platform");
            assert_eq!(config.timeout(), Duration::from_secs(3));
            Ok(())
        });
    }
}
