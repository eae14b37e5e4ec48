//! Server module for running Terraform providers
//!
//! This module starts the provider's gRPC server and performs the go-plugin
//! handshake Terraform expects on stdout. When Terraform supplies a client
//! certificate the server generates a self-signed identity and requires
//! mutual TLS.

use crate::error::{Result, TfplugError};
use crate::grpc::GrpcProviderServer;
use crate::proto::ProviderServer;
use crate::provider::Provider;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Certificate, Identity, Server, ServerTlsConfig};
use tracing_subscriber::EnvFilter;

pub const MAGIC_COOKIE_KEY: &str = "TF_PLUGIN_MAGIC_COOKIE";
pub const MAGIC_COOKIE_VALUE: &str =
    "d602bf8f470bc67ca7faa0386276bbdd4330efaf76d1a219cb4d6991ca9872b2";

const CORE_PROTOCOL_VERSION: u32 = 1;
const PLUGIN_PROTOCOL_VERSION: u32 = 6;

/// Log level for the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parses Terraform's TF_LOG style names, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" | "json" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// TF_LOG_PROVIDER wins over TF_LOG.
    pub fn from_env() -> Option<Self> {
        ["TF_LOG_PROVIDER", "TF_LOG"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find_map(|value| Self::parse(&value))
    }

    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Server configuration for running a Terraform provider
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum message size in bytes
    pub max_message_size: usize,
    pub enable_logging: bool,
    pub log_level: LogLevel,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_message_size: 256 << 20, // 256MB
            enable_logging: true,
            log_level: LogLevel::Info,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with the log level taken from the environment
    pub fn from_env() -> Self {
        let config = Self::default();
        match LogLevel::from_env() {
            Some(level) => config.with_log_level(level),
            None => config,
        }
    }

    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    pub fn without_logging(mut self) -> Self {
        self.enable_logging = false;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

/// Installs a stderr subscriber; stdout is reserved for the handshake line.
pub fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_env("TF_PROVIDER_LOG_FILTER")
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

fn check_magic_cookie() -> Result<()> {
    match std::env::var(MAGIC_COOKIE_KEY) {
        Ok(value) if value == MAGIC_COOKIE_VALUE => Ok(()),
        _ => Err(TfplugError::HandshakeError(
            "This binary is a plugin. These are not meant to be executed directly. \
             Please execute the program that consumes these plugins, which will \
             load any plugins automatically"
                .to_string(),
        )),
    }
}

/// Server identity plus the certificate announced in the handshake.
struct TlsSetup {
    config: ServerTlsConfig,
    server_cert_der: Vec<u8>,
}

fn tls_setup(client_cert_pem: &str) -> Result<TlsSetup> {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])?;
    let identity = Identity::from_pem(certified.cert.pem(), certified.key_pair.serialize_pem());
    let config = ServerTlsConfig::new()
        .identity(identity)
        .client_ca_root(Certificate::from_pem(client_cert_pem));

    Ok(TlsSetup {
        config,
        server_cert_der: certified.cert.der().to_vec(),
    })
}

/// Formats the go-plugin handshake line.
pub fn handshake_line(addr: &std::net::SocketAddr, server_cert_der: Option<&[u8]>) -> String {
    let mut line = format!(
        "{}|{}|tcp|{}|grpc",
        CORE_PROTOCOL_VERSION, PLUGIN_PROTOCOL_VERSION, addr
    );
    if let Some(der) = server_cert_der {
        line.push('|');
        line.push_str(&STANDARD_NO_PAD.encode(der));
    }
    line
}

/// Main entry point for running a provider
pub async fn serve<P: Provider + 'static>(provider: P, config: ServerConfig) -> Result<()> {
    if config.enable_logging {
        init_logging(config.log_level);
    }

    check_magic_cookie()?;

    let provider_name = provider.type_name().to_string();
    let grpc_server = GrpcProviderServer::new(provider).await;
    let provider_service = ProviderServer::new(grpc_server)
        .max_decoding_message_size(config.max_message_size)
        .max_encoding_message_size(config.max_message_size);

    let tls = match std::env::var("PLUGIN_CLIENT_CERT") {
        Ok(pem) if !pem.trim().is_empty() => Some(tls_setup(&pem)?),
        _ => None,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let mut builder = Server::builder();
    if let Some(tls) = &tls {
        builder = builder.tls_config(tls.config.clone())?;
    }
    let router = builder.add_service(provider_service);

    tracing::info!(
        provider = %provider_name,
        %addr,
        tls = tls.is_some(),
        "starting provider server"
    );
    println!(
        "{}",
        handshake_line(&addr, tls.as_ref().map(|t| t.server_cert_der.as_slice()))
    );

    router
        .serve_with_incoming(TcpListenerStream::new(listener))
        .await?;

    Ok(())
}

/// Runs a provider with the environment derived configuration
pub async fn serve_default<P: Provider + 'static>(provider: P) -> Result<()> {
    serve(provider, ServerConfig::from_env()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn magic_cookie_must_match() {
        std::env::remove_var(MAGIC_COOKIE_KEY);
        assert!(matches!(
            check_magic_cookie(),
            Err(TfplugError::HandshakeError(_))
        ));

        std::env::set_var(MAGIC_COOKIE_KEY, "wrong");
        assert!(check_magic_cookie().is_err());

        std::env::set_var(MAGIC_COOKIE_KEY, MAGIC_COOKIE_VALUE);
        assert!(check_magic_cookie().is_ok());

        std::env::remove_var(MAGIC_COOKIE_KEY);
    }

    #[test]
    fn log_level_parses_terraform_names() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse(" trace "), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("json"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("off"), None);
    }

    #[test]
    fn handshake_line_without_tls() {
        let addr: std::net::SocketAddr = "127.0.0.1:40123".parse().unwrap();
        assert_eq!(handshake_line(&addr, None), "1|6|tcp|127.0.0.1:40123|grpc");
    }

    #[test]
    fn handshake_line_appends_unpadded_certificate() {
        let addr: std::net::SocketAddr = "127.0.0.1:40123".parse().unwrap();
        let line = handshake_line(&addr, Some(&[0xde, 0xad, 0xbe, 0xef]));

        assert_eq!(line, "1|6|tcp|127.0.0.1:40123|grpc|3q2+7w");
    }

    #[test]
    fn tls_setup_generates_certificate() {
        let client = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let setup = tls_setup(&client.cert.pem()).unwrap();

        assert!(!setup.server_cert_der.is_empty());
    }

    #[test]
    fn config_builders() {
        let config = ServerConfig::new()
            .with_max_message_size(1024)
            .with_log_level(LogLevel::Warn)
            .without_logging();

        assert_eq!(config.max_message_size, 1024);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert!(!config.enable_logging);
    }
}
