use std::time::Duration;

use little_chat_model::{ClientId, ErrorKind};
use reqwest::Url;

use crate::{Error, HISTORY_PATH};

/// Builder for [`HttpBackendConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpBackendConfigBuilder {
    base_url: String,
    connect_timeout: Option<Duration>,
}

impl HttpBackendConfigBuilder {
    /// Creates a builder with the given base URL, e.g.
    /// `http://127.0.0.1:5000`.
    #[inline]
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: None,
        }
    }

    /// Sets the timeout for establishing connections.
    #[inline]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> HttpBackendConfig {
        HttpBackendConfig {
            base_url: self.base_url.trim_end_matches('/').to_owned(),
            connect_timeout: self
                .connect_timeout
                .unwrap_or(Duration::from_secs(10)),
        }
    }
}

/// Configuration for the HTTP backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpBackendConfig {
    pub(crate) base_url: String,
    pub(crate) connect_timeout: Duration,
}

impl HttpBackendConfig {
    #[inline]
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Returns the history endpoint of `client_id`, with the id encoded as
    /// a query parameter.
    pub(crate) fn history_url(&self, client_id: &ClientId) -> Result<Url, Error> {
        Url::parse_with_params(
            &self.endpoint(HISTORY_PATH),
            &[("clientId", client_id.as_str())],
        )
        .map_err(|err| {
            Error::new(format!("invalid history url: {err}"), ErrorKind::Other)
        })
    }
}
