//! Backend base address resolution.
//!
//! Reconciles a configured backend URL with the context the tool is
//! deployed in, so a development URL pointing at a loopback address does
//! not leak into a real deployment.

use crate::errors::ClientError;
use reqwest::Url;

const LOCALHOST: &str = "localhost";
const LOOPBACK_IP: &str = "127.0.0.1";

/// Port the backend listens on during local development.
pub const LOCAL_BACKEND_PORT: u16 = 8080;

/// Default runtime origin when none is supplied.
pub const DEFAULT_ORIGIN: &str = "http://localhost";

/// Deployment context the client runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeContext {
    /// Scheme with trailing colon, e.g. `https:`.
    pub protocol: String,
    pub hostname: String,
    /// `scheme://host[:port]`
    pub origin: String,
}

impl RuntimeContext {
    pub fn new(
        protocol: impl Into<String>,
        hostname: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            hostname: hostname.into(),
            origin: origin.into(),
        }
    }

    /// Build a context from an origin URL such as `https://dash.example.com`.
    pub fn from_origin(origin: &str) -> Result<Self, ClientError> {
        let url = Url::parse(origin.trim()).map_err(|e| ClientError::InvalidOrigin {
            origin: origin.to_string(),
            reason: e.to_string(),
        })?;

        let hostname = url.host_str().unwrap_or_default().to_string();
        if hostname.is_empty() {
            return Err(ClientError::InvalidOrigin {
                origin: origin.to_string(),
                reason: "origin has no host".to_string(),
            });
        }

        Ok(Self {
            protocol: format!("{}:", url.scheme()),
            hostname,
            origin: url.origin().ascii_serialization(),
        })
    }

    fn effective_hostname(&self) -> &str {
        if self.hostname.is_empty() {
            LOCALHOST
        } else {
            &self.hostname
        }
    }

    fn effective_protocol(&self) -> &str {
        if self.protocol.is_empty() {
            "http:"
        } else {
            &self.protocol
        }
    }

    /// Whether the runtime host is a loopback name.
    pub fn is_local(&self) -> bool {
        is_loopback(self.effective_hostname())
    }
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self::new("http:", LOCALHOST, DEFAULT_ORIGIN)
    }
}

fn is_loopback(host: &str) -> bool {
    host == LOCALHOST || host == LOOPBACK_IP
}

/// Backend URL baked in at compile time through `FINDINGS_API_URL`.
pub fn build_time_base_url() -> Option<&'static str> {
    option_env!("FINDINGS_API_URL")
}

/// Resolve the backend base address.
///
/// Without a configured URL, a local runtime talks to the development
/// backend on port 8080 and any other runtime uses its own origin. A
/// configured URL mentioning a loopback host is rewritten to the runtime
/// hostname when running on a non-local host; otherwise it is used as is.
pub fn resolve_base_url(configured: Option<&str>, runtime: &RuntimeContext) -> String {
    let hostname = runtime.effective_hostname();

    let configured = match configured.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => {
            return if runtime.is_local() {
                format!(
                    "{}//{}:{}",
                    runtime.effective_protocol(),
                    hostname,
                    LOCAL_BACKEND_PORT
                )
            } else {
                runtime.origin.clone()
            };
        }
    };

    if !runtime.is_local() && (configured.contains(LOCALHOST) || configured.contains(LOOPBACK_IP))
    {
        return configured
            .replacen(LOCALHOST, hostname, 1)
            .replacen(LOOPBACK_IP, hostname, 1);
    }

    configured.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prod() -> RuntimeContext {
        RuntimeContext::new("https:", "prod.example.com", "https://prod.example.com")
    }

    #[test]
    fn test_unconfigured_local_runtime_uses_dev_port() {
        let runtime = RuntimeContext::new("http:", "127.0.0.1", "http://127.0.0.1:5173");
        assert_eq!(resolve_base_url(None, &runtime), "http://127.0.0.1:8080");
        assert_eq!(
            resolve_base_url(None, &RuntimeContext::default()),
            "http://localhost:8080"
        );
    }

    #[test]
    fn test_unconfigured_remote_runtime_uses_origin() {
        assert_eq!(resolve_base_url(None, &prod()), "https://prod.example.com");
        assert_eq!(resolve_base_url(Some("   "), &prod()), "https://prod.example.com");
    }

    #[test]
    fn test_loopback_config_rewritten_on_remote_host() {
        let runtime = RuntimeContext::new("http:", "prod.example.com", "http://prod.example.com");
        assert_eq!(
            resolve_base_url(Some("http://localhost:9000"), &runtime),
            "http://prod.example.com:9000"
        );
        assert_eq!(
            resolve_base_url(Some("http://127.0.0.1:9000/"), &runtime),
            "http://prod.example.com:9000/"
        );
    }

    #[test]
    fn test_only_first_loopback_occurrence_replaced() {
        assert_eq!(
            resolve_base_url(Some("http://localhost:9000/localhost"), &prod()),
            "http://prod.example.com:9000/localhost"
        );
    }

    #[test]
    fn test_configured_url_kept_on_local_host() {
        assert_eq!(
            resolve_base_url(Some("http://localhost:9000"), &RuntimeContext::default()),
            "http://localhost:9000"
        );
    }

    #[test]
    fn test_configured_remote_url_kept() {
        assert_eq!(
            resolve_base_url(Some(" https://api.example.com "), &prod()),
            "https://api.example.com"
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let first = resolve_base_url(Some("http://localhost:9000"), &prod());
        let second = resolve_base_url(Some("http://localhost:9000"), &prod());
        assert_eq!(first, second);
    }

    #[test]
    fn test_runtime_context_from_origin() {
        let runtime = RuntimeContext::from_origin("https://dash.example.com:8443/app").unwrap();
        assert_eq!(runtime.protocol, "https:");
        assert_eq!(runtime.hostname, "dash.example.com");
        assert_eq!(runtime.origin, "https://dash.example.com:8443");
        assert!(!runtime.is_local());

        let local = RuntimeContext::from_origin("http://localhost:5173").unwrap();
        assert!(local.is_local());
        assert_eq!(resolve_base_url(None, &local), "http://localhost:8080");
    }

    #[test]
    fn test_runtime_context_rejects_garbage() {
        assert!(RuntimeContext::from_origin("not a url").is_err());
    }
}
