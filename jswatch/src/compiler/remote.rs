//! Hosted Closure Compiler service reached over HTTP

use reqwest::blocking::Client;
use reqwest::Url;
use std::fs;
use std::net::ToSocketAddrs;
use std::path::Path;
use std::time::Duration;

use super::parser::{decode_service_response, parse_service_response};
use super::result::CompilationResult;
use crate::config::RemoteConfig;
use crate::error::{Result, WatchError};

/// Output sections requested from the service, sent as repeated `output_info`
const OUTPUT_INFO: [&str; 3] = ["compiled_code", "warnings", "errors"];

#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Client,
    url: Url,
    compilation_level: String,
}

impl RemoteBackend {
    /// Build a backend for the service described by `config`.
    ///
    /// Fails with `MissingDependency` when the URL is unusable or, with
    /// probing enabled, its host does not resolve.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let url = Url::parse(&config.url).map_err(|e| {
            WatchError::MissingDependency(format!(
                "Invalid compiler service URL {}: {e}",
                config.url
            ))
        })?;

        if config.probe {
            probe_host(&url)?;
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("jswatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                WatchError::MissingDependency(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            url,
            compilation_level: config.compilation_level.clone(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Form fields for one compile request, list options as repeated keys
    pub fn form_fields(&self, code: String) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("js_code", code),
            ("compilation_level", self.compilation_level.clone()),
            ("output_format", "json".to_string()),
        ];
        fields.extend(OUTPUT_INFO.iter().map(|info| ("output_info", info.to_string())));
        fields
    }

    /// Submit the source to the service and write the compiled code to
    /// `target` on success.
    pub(super) fn compile(&self, source: &Path, target: &Path) -> Result<CompilationResult> {
        let code = fs::read_to_string(source).map_err(|e| {
            WatchError::command(format!("Failed to read {}: {e}", source.display()))
        })?;

        tracing::debug!("Sending {} to {}", source.display(), self.url);
        let body = self
            .client
            .post(self.url.clone())
            .form(&self.form_fields(code))
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| {
                WatchError::command(format!(
                    "Sending request to closure compiler service failed: {e}"
                ))
            })?;

        let response = decode_service_response(&body)?;
        let result = parse_service_response(source, target, response)?;

        if let Some(code) = result.compiled_code() {
            fs::write(target, code).map_err(|e| {
                WatchError::command(format!("Failed to write {}: {e}", target.display()))
            })?;
        }

        Ok(result)
    }
}

/// Resolve the service host so an unreachable network fails at startup
fn probe_host(url: &Url) -> Result<()> {
    let host = url.host_str().ok_or_else(|| {
        WatchError::MissingDependency(format!("Compiler service URL {url} has no host"))
    })?;
    let port = url.port_or_known_default().unwrap_or(80);

    let mut addrs = (host, port).to_socket_addrs().map_err(|e| {
        WatchError::MissingDependency(format!(
            "The compiler service host {host} could not be resolved: {e}"
        ))
    })?;

    if addrs.next().is_none() {
        return Err(WatchError::MissingDependency(format!(
            "The compiler service host {host} has no addresses"
        )));
    }
    Ok(())
}
