//! Settings file and its merge with command-line flags.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use seqfetch_engine::{ClientSetting, DEFAULT_INITIAL_STEP, EngineOptions, Url};

use crate::cli::App;

pub const DEFAULT_TEMPLATE: &str = "%d.ts";

/// Effective run settings.
///
/// Loaded from an optional TOML file, then overridden field by field by
/// whatever the command line (or its `SEQFETCH_*` environment) provides.
///
/// ```toml
/// template = "seg_%05d.ts"
/// initial_step = 200
/// max_in_flight = 8
/// timeout = 30
/// proxies = ["http://127.0.0.1:3128"]
///
/// [headers]
/// Referer = "https://player.example/"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub template: String,
    pub initial_step: u64,
    pub max_in_flight: Option<usize>,
    /// Seconds.
    pub timeout: Option<u64>,
    pub proxies: Vec<String>,
    pub user_agent: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            initial_step: DEFAULT_INITIAL_STEP,
            max_in_flight: None,
            timeout: None,
            proxies: Vec::new(),
            user_agent: None,
            headers: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read `path`, or fall back to defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid settings file {}", path.display()))
    }

    /// Apply command-line values on top of the file.
    pub fn merge(mut self, app: &App) -> Self {
        if let Some(template) = &app.template {
            self.template = template.clone();
        }
        if let Some(step) = app.initial_step {
            self.initial_step = step;
        }
        if app.max_in_flight.is_some() {
            self.max_in_flight = app.max_in_flight;
        }
        if app.timeout.is_some() {
            self.timeout = app.timeout;
        }
        if !app.proxies.is_empty() {
            self.proxies = app.proxies.clone();
        }
        if app.user_agent.is_some() {
            self.user_agent = app.user_agent.clone();
        }
        for (name, value) in &app.headers {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions::default()
            .initial_step(self.initial_step)
            .max_in_flight(self.max_in_flight)
            .headers(self.headers.clone().into_iter().collect())
    }

    pub fn client_setting(&self) -> Result<ClientSetting> {
        let mut setting = ClientSetting::default()
            .timeout(self.timeout.map(Duration::from_secs));
        for proxy in &self.proxies {
            let url = Url::parse(proxy).with_context(|| format!("invalid proxy URL {proxy}"))?;
            setting = setting.proxy(url);
        }
        if let Some(user_agent) = &self.user_agent {
            setting = setting.user_agent(user_agent.clone());
        }
        Ok(setting)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn test_file_values() {
        let settings = Settings::from_toml(
            r#"
            template = "seg_%05d.ts"
            initial_step = 200
            max_in_flight = 8
            timeout = 30
            proxies = ["http://127.0.0.1:3128"]

            [headers]
            Referer = "https://player.example/"
            "#,
        )
        .unwrap();

        assert_eq!(settings.template, "seg_%05d.ts");
        assert_eq!(settings.initial_step, 200);
        assert_eq!(settings.max_in_flight, Some(8));
        assert_eq!(settings.headers["Referer"], "https://player.example/");

        let options = settings.engine_options();
        assert_eq!(options.initial_step, 200);
        assert_eq!(options.headers.len(), 1);

        let client = settings.client_setting().unwrap();
        assert_eq!(client.timeout, Some(Duration::from_secs(30)));
        assert_eq!(client.proxies.len(), 1);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(Settings::from_toml("step = 3").is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let file = Settings::from_toml(
            r#"
            template = "a_%d.ts"
            initial_step = 50
            [headers]
            Referer = "file"
            Cookie = "c=1"
            "#,
        )
        .unwrap();
        let app = App::try_parse_from([
            "seqfetch",
            "--initial-step",
            "7",
            "-H",
            "Referer:flag",
            "out.ts",
            "https://cdn.example/",
        ])
        .unwrap();

        let settings = file.merge(&app);
        assert_eq!(settings.initial_step, 7);
        assert_eq!(settings.headers["Referer"], "flag");
        assert_eq!(settings.headers["Cookie"], "c=1");
        if std::env::var_os("SEQFETCH_TEMPLATE").is_none() {
            assert_eq!(settings.template, "a_%d.ts");
        }
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seqfetch.toml");
        std::fs::write(&path, "max_in_flight = 3\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.max_in_flight, Some(3));
        assert_eq!(settings.template, DEFAULT_TEMPLATE);

        assert!(Settings::load(Some(&dir.path().join("missing.toml"))).is_err());
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }

    #[test]
    fn test_bad_proxy_is_rejected() {
        let settings = Settings {
            proxies: vec!["not a url".to_string()],
            ..Settings::default()
        };
        assert!(settings.client_setting().is_err());
    }
}
