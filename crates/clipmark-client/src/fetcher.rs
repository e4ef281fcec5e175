use std::net::IpAddr;
use std::time::Duration;

use clipmark_core::error::AppError;
use reqwest::Client;
use url::Url;

const USER_AGENT: &str = concat!("clipmark/", env!("CARGO_PKG_VERSION"));

/// HTTP fetcher using reqwest.
///
/// Downloads raw HTML with a configurable timeout and an optional Cookie
/// header for authenticated pages. Only `http` and `https` URLs are
/// accepted; requests to private/reserved IP literals are rejected unless
/// [`allow_private_hosts`](Self::allow_private_hosts) is called.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
    block_private_hosts: bool,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(Duration::from_secs(60))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let timeout_secs = timeout.as_secs();
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs,
            block_private_hosts: true,
        })
    }

    /// Allow fetching from private/reserved IP literals, e.g. a page served
    /// from a machine on the local network.
    pub fn allow_private_hosts(mut self) -> Self {
        self.block_private_hosts = false;
        self
    }

    pub async fn fetch(&self, url: &str, cookie_header: Option<&str>) -> Result<String, AppError> {
        self.validate_url(url)?;

        let mut request = self.client.get(url);
        if let Some(cookies) = cookie_header {
            request = request.header(reqwest::header::COOKIE, cookies);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("failed to read response body: {e}")))
    }

    fn validate_url(&self, url: &str) -> Result<(), AppError> {
        let parsed =
            Url::parse(url).map_err(|e| AppError::HttpError(format!("invalid URL: {e}")))?;

        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(AppError::HttpError(format!(
                    "URL scheme '{scheme}' is not allowed (only http/https)"
                )));
            }
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| AppError::HttpError("URL has no host".to_string()))?;

        if self.block_private_hosts {
            if let Ok(ip) = host.trim_matches(['[', ']']).parse::<IpAddr>() {
                if is_private_ip(ip) {
                    return Err(AppError::HttpError(format!(
                        "refusing to fetch private/reserved address {host}"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Check if an IP address is in a private/reserved/link-local range.
fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                // fe80::/10 (link-local)
                || (v6.segments()[0] & 0xFFC0) == 0xFE80
                // fc00::/7 (unique local)
                || (v6.segments()[0] & 0xFE00) == 0xFC00
                || match v6.to_ipv4_mapped() {
                    Some(v4) => is_private_ip(IpAddr::V4(v4)),
                    None => false,
                }
        }
    }
}
