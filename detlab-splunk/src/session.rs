use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::SplunkError;

/// Authenticated handle to the platform's management API.
///
/// One session is opened per run and shared (by clone; the underlying
/// transport is pooled) across every component that talks to the
/// platform. No global session state exists.
#[derive(Clone, Debug)]
pub struct SplunkSession {
    pub(crate) http: reqwest::Client,
    base_url: Url,
    pub(crate) auth_header: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(rename = "sessionKey")]
    session_key: String,
}

impl SplunkSession {
    /// Logs into the management API and returns a session bound to it.
    pub async fn connect(
        base_url: &str,
        username: &str,
        password: &str,
        verify_tls: bool,
    ) -> Result<Self, SplunkError> {
        let base_url = parse_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|err| SplunkError::Transport(err.to_string()))?;

        let login_url = join(&base_url, "services/auth/login")?;
        let response = http
            .post(login_url)
            .form(&[
                ("username", username),
                ("password", password),
                ("output_mode", "json"),
            ])
            .send()
            .await
            .map_err(|err| SplunkError::Auth(err.to_string()))?;

        if !response.status().is_success() {
            return Err(SplunkError::Auth(format!(
                "login rejected with status {}",
                response.status()
            )));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|err| SplunkError::Decode(err.to_string()))?;

        info!(url = %base_url, "management session established");
        Ok(Self {
            http,
            base_url,
            auth_header: format!("Splunk {}", login.session_key),
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, SplunkError> {
        join(&self.base_url, path)
    }

    /// Ensures an inbound HTTP data input bound to `index` exists.
    ///
    /// Acquire-or-create: look the input up, create it when absent, and
    /// treat a concurrent create (already-exists) as success. Any other
    /// creation failure propagates.
    pub async fn ensure_http_input(&self, name: &str, index: &str) -> Result<(), SplunkError> {
        let lookup_url = self.endpoint(&format!(
            "services/data/inputs/http/{}",
            encode_path_segment(name)
        ))?;
        let response = self
            .http
            .get(lookup_url)
            .query(&[("output_mode", "json")])
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|err| SplunkError::Transport(err.to_string()))?;

        if response.status().is_success() {
            debug!(input = name, "HTTP input already present");
            return Ok(());
        }
        if response.status() != StatusCode::NOT_FOUND {
            return Err(SplunkError::UnexpectedStatus {
                context: "HTTP input lookup",
                status: response.status(),
            });
        }

        let create_url = self.endpoint("services/data/inputs/http")?;
        let response = self
            .http
            .post(create_url)
            .form(&[("name", name), ("index", index), ("output_mode", "json")])
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|err| SplunkError::Transport(err.to_string()))?;

        if response.status().is_success() || response.status() == StatusCode::CONFLICT {
            info!(input = name, index, "HTTP input ready");
            Ok(())
        } else {
            Err(SplunkError::UnexpectedStatus {
                context: "HTTP input creation",
                status: response.status(),
            })
        }
    }
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, SplunkError> {
    let mut url = Url::parse(raw).map_err(|err| SplunkError::InvalidUrl {
        url: raw.to_string(),
        source: err,
    })?;

    if !url.path().ends_with('/') {
        let mut path = url.path().trim_end_matches('/').to_string();
        path.push('/');
        url.set_path(&path);
    }

    Ok(url)
}

pub(crate) fn join(base: &Url, path: &str) -> Result<Url, SplunkError> {
    base.join(path).map_err(|err| SplunkError::InvalidUrl {
        url: format!("{}{}", base, path),
        source: err,
    })
}

pub(crate) fn encode_path_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}
