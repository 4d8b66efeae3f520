use std::fmt;

/// Default Qdrant host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default Qdrant gRPC port.
pub const DEFAULT_PORT: u16 = 6334;

/// Connection settings for a single report run.
///
/// Built once from the command line and passed by reference from then on.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Qdrant server host
    pub host: String,
    /// Qdrant gRPC port
    pub port: u16,
    /// API key attached to every request, if any
    pub api_key: Option<String>,
    /// Use TLS for the connection
    pub use_tls: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: None,
            use_tls: false,
        }
    }
}

impl ConnectionConfig {
    /// Create a new connection configuration
    pub fn new<S: Into<String>>(host: S, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Set the API key. An empty key means no credential.
    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        let api_key = api_key.into();
        self.api_key = if api_key.is_empty() { None } else { Some(api_key) };
        self
    }

    /// Set TLS mode
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// URL handed to the Qdrant client builder.
    pub fn url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("use_tls", &self.use_tls)
            .finish()
    }
}
