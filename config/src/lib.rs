#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod indicators;

pub use app_config::get_config_dir;
pub use args::Args;
use eyre::ensure;
pub use indicators::{
    load_indicators,
    parse_indicators,
    IndicatorRef,
};
use serde::{
    Deserialize,
    Serialize,
};
use sevone_client::{
    Credential,
    PagePolicy,
    SessionOptions,
};
use std::{
    fmt,
    path::PathBuf,
    time::Duration,
};
use strum::{
    Display,
    EnumString,
};

/// Longest accepted `time_interval`, one year.
pub const MAX_TIME_INTERVAL: u64 = 86_400 * 365;

/// How the set of indicators to sample is obtained.
#[derive(Debug, Default, Clone, Copy, Display, EnumString, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Enumerate every device, object and indicator.
    #[default]
    Discover,
    /// Only sample the indicators declared in `indicators_file`.
    Fixed,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    pub url: url::Url,
    pub username: String,
    pub password: String,
    pub page_size: u32,
    pub time_interval: u64,
    pub total_timeout: u64,
    pub verify_tls: bool,
    pub force_close: bool,
    pub max_concurrency: usize,
    pub page_failure: PagePolicy,
    pub mode: Mode,
    pub indicators_file: PathBuf,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Settings {
    /// Defaults, then the config file, then `SEVONE_*` environment variables, then `args`.
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        let file = match &args.config {
            Some(path) => config::File::from(path.as_path()).required(true),
            None => config::File::from(get_config_dir().join("config.yaml")).required(false),
        };

        let cfg: Self = Self::builder()
            .add_source(file.format(config::FileFormat::Yaml))
            .add_source(config::Environment::with_prefix("SEVONE").try_parsing(true))
            .add_source(args)
            .build()?
            .try_deserialize()?;

        debug!(settings = ?cfg, "configuration loaded");
        Ok(cfg)
    }

    fn builder() -> config::ConfigBuilder<config::builder::DefaultState> {
        config::Config::builder().add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml))
    }

    pub fn validate(&self) -> eyre::Result<()> {
        ensure!(!self.username.is_empty(), "username must not be empty");
        ensure!(self.page_size >= 1, "page_size must be at least 1");
        ensure!(
            (1..=MAX_TIME_INTERVAL).contains(&self.time_interval),
            "time_interval must be between 1 and {MAX_TIME_INTERVAL} seconds, got {}",
            self.time_interval
        );
        ensure!(self.total_timeout >= 1, "total_timeout must be at least 1 second");
        ensure!(self.max_concurrency >= 1, "max_concurrency must be at least 1");
        ensure!(
            matches!(self.url.scheme(), "http" | "https"),
            "url must be an http(s) URL, got {}",
            self.url
        );
        Ok(())
    }

    pub fn credential(&self) -> Credential {
        Credential::new(self.username.clone(), self.password.clone())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            base_url: self.url.clone(),
            verify_tls: self.verify_tls,
            force_close: self.force_close,
            timeout: self.total_budget(),
        }
    }

    /// Length of the sample window.
    pub fn window_length(&self) -> Duration {
        Duration::from_secs(self.time_interval)
    }

    pub fn total_budget(&self) -> Duration {
        Duration::from_secs(self.total_timeout)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &"***")
            .field("page_size", &self.page_size)
            .field("time_interval", &self.time_interval)
            .field("total_timeout", &self.total_timeout)
            .field("verify_tls", &self.verify_tls)
            .field("force_close", &self.force_close)
            .field("max_concurrency", &self.max_concurrency)
            .field("page_failure", &self.page_failure)
            .field("mode", &self.mode)
            .field("indicators_file", &self.indicators_file)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn load(yaml: &str, args: Args) -> Result<Settings, config::ConfigError> {
        Settings::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .add_source(args)
            .build()?
            .try_deserialize()
    }

    const MINIMAL: &str = "
url: https://sevone.example.com/api/v2
username: admin
password: secret
";

    #[test]
    fn defaults_fill_everything_but_the_credentials() {
        let settings = load(MINIMAL, Args::default()).unwrap();

        assert_eq!(settings.url.as_str(), "https://sevone.example.com/api/v2");
        assert_eq!(settings.page_size, 20);
        assert_eq!(settings.time_interval, 300);
        assert_eq!(settings.total_timeout, 9000);
        assert!(settings.verify_tls);
        assert!(settings.force_close);
        assert_eq!(settings.max_concurrency, 64);
        assert_eq!(settings.page_failure, PagePolicy::Strict);
        assert_eq!(settings.mode, Mode::Discover);
        assert_eq!(settings.indicators_file, PathBuf::from("indicators.yaml"));
        settings.validate().unwrap();
    }

    #[test]
    fn args_override_the_file() {
        let args = Args {
            page_size: Some(500),
            verify_tls: Some(false),
            page_failure: Some(PagePolicy::BestEffort),
            mode: Some(Mode::Fixed),
            indicators_file: Some(PathBuf::from("/etc/sevone/indicators.yaml")),
            ..Args::default()
        };
        let yaml = format!("{MINIMAL}page_size: 100\nmode: discover\n");
        let settings = load(&yaml, args).unwrap();

        assert_eq!(settings.page_size, 500);
        assert!(!settings.verify_tls);
        assert_eq!(settings.page_failure, PagePolicy::BestEffort);
        assert_eq!(settings.mode, Mode::Fixed);
        assert_eq!(settings.indicators_file, PathBuf::from("/etc/sevone/indicators.yaml"));
    }

    #[test]
    fn missing_url_is_a_config_error() {
        let err = load("username: admin\npassword: secret\n", Args::default()).unwrap_err();
        assert!(err.to_string().contains("url"), "{err}");
    }

    #[test]
    fn validation_rejects_zero_sizes() {
        let mut settings = load(MINIMAL, Args::default()).unwrap();
        settings.page_size = 0;
        assert!(settings.validate().is_err());

        settings.page_size = 20;
        settings.max_concurrency = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validation_bounds_time_interval() {
        let mut settings = load(MINIMAL, Args::default()).unwrap();
        settings.time_interval = MAX_TIME_INTERVAL;
        settings.validate().unwrap();

        settings.time_interval = MAX_TIME_INTERVAL + 1;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("time_interval"), "{err}");

        settings.time_interval = u64::MAX;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn debug_output_hides_the_password() {
        let settings = load(MINIMAL, Args::default()).unwrap();
        let printed = format!("{settings:?}");
        assert!(printed.contains("admin"));
        assert!(!printed.contains("secret"));
    }

    #[test]
    fn session_options_follow_settings() {
        let settings = load(MINIMAL, Args::default()).unwrap();
        let options = settings.session_options();
        assert_eq!(options.timeout, Duration::from_secs(9000));
        assert!(options.force_close);
        assert_eq!(settings.window_length(), Duration::from_secs(300));
    }
}
