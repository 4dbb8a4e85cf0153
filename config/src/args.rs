use crate::Mode;
use clap::Parser;
use sevone_client::PagePolicy;
use std::path::PathBuf;

/// Export the latest SevOne indicator samples as Wavefront metric lines on stdout.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Configuration file (yaml). Defaults to `config.yaml` in the config directory.
    #[clap(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// SevOne API base URL, e.g. `https://sevone.example.com/api/v2`.
    #[clap(long, value_name = "URL")]
    pub url: Option<String>,

    #[clap(long, value_name = "NAME")]
    pub username: Option<String>,

    #[clap(long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Requested page size for paginated listings (the server caps it).
    #[clap(long, value_name = "N")]
    pub page_size: Option<u32>,

    /// How far back to look for the latest sample, in seconds. Should equal the polling interval.
    #[clap(long, value_name = "SECS")]
    pub time_interval: Option<u64>,

    /// Wall-clock budget for the whole run, in seconds.
    #[clap(long, value_name = "SECS")]
    pub total_timeout: Option<u64>,

    /// Verify TLS certificates.
    #[clap(long, value_name = "BOOL")]
    pub verify_tls: Option<bool>,

    /// Close the connection after every call instead of pooling it.
    #[clap(long, value_name = "BOOL")]
    pub force_close: Option<bool>,

    /// Maximum number of requests in flight per fan-out step.
    #[clap(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// How a failed page of a listing is handled.
    #[clap(long, value_name = "POLICY")]
    pub page_failure: Option<PagePolicy>,

    /// `discover` walks all devices, `fixed` reads the indicators file.
    #[clap(long, value_name = "MODE")]
    pub mode: Option<Mode>,

    /// Indicator list used in `fixed` mode.
    #[clap(long, value_name = "FILE")]
    pub indicators_file: Option<PathBuf>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[clap(long, short, action)]
    pub verbose: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(url) = &self.url {
                cache.insert("url".to_string(), url.clone().into());
            }
            if let Some(username) = &self.username {
                cache.insert("username".to_string(), username.clone().into());
            }
            if let Some(password) = &self.password {
                cache.insert("password".to_string(), password.clone().into());
            }
            if let Some(page_size) = self.page_size {
                cache.insert("page_size".to_string(), (page_size as u64).into());
            }
            if let Some(time_interval) = self.time_interval {
                cache.insert("time_interval".to_string(), time_interval.into());
            }
            if let Some(total_timeout) = self.total_timeout {
                cache.insert("total_timeout".to_string(), total_timeout.into());
            }
            if let Some(verify_tls) = self.verify_tls {
                cache.insert("verify_tls".to_string(), verify_tls.into());
            }
            if let Some(force_close) = self.force_close {
                cache.insert("force_close".to_string(), force_close.into());
            }
            if let Some(max_concurrency) = self.max_concurrency {
                cache.insert("max_concurrency".to_string(), (max_concurrency as u64).into());
            }
            if let Some(page_failure) = self.page_failure {
                cache.insert("page_failure".to_string(), page_failure.to_string().into());
            }
            if let Some(mode) = self.mode {
                cache.insert("mode".to_string(), mode.to_string().into());
            }
            if let Some(indicators_file) = &self.indicators_file {
                cache.insert("indicators_file".to_string(), indicators_file.display().to_string().into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();

    format!(
        "{}

Authors: {author}
Config directory: {config_dir_path}",
        clap::crate_version!()
    )
}
