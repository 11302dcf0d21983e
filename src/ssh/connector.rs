//! russh-backed session factory

use super::error::{Result, SshError};
use super::handler::ClientHandler;
use super::options::{decode_private_key, AuthMethod, ConnectOptions};
use super::transport::{connect_tcp, SocketOpts, DEFAULT_CONNECT_TIMEOUT_SECS};
use crate::session::{Identity, SessionFactory};
use async_trait::async_trait;
use russh::client::{AuthResult, Handle};
use russh::keys::PrivateKeyWithHashAlg;
use russh::Disconnect;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// An authenticated SSH session
pub struct SshSession {
    handle: Handle<ClientHandler>,
    identity: Identity,
    connected_at: Instant,
}

impl SshSession {
    /// Identity the session was opened for
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Underlying russh handle
    pub fn handle(&self) -> &Handle<ClientHandler> {
        &self.handle
    }

    /// Mutable access to the russh handle, e.g. to open channels
    pub fn handle_mut(&mut self) -> &mut Handle<ClientHandler> {
        &mut self.handle
    }

    /// Check if the connection has gone away
    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    /// Time since the session was established
    pub fn connected_for(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

impl fmt::Debug for SshSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshSession")
            .field("identity", &self.identity)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Builds SSH sessions with russh
#[derive(Clone)]
pub struct SshConnector {
    /// russh client configuration shared by all sessions
    config: Arc<russh::client::Config>,
    /// Socket options for the underlying TCP connections
    socket_opts: SocketOpts,
    /// TCP connect timeout
    connect_timeout: Duration,
}

impl Default for SshConnector {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SshConnector {
    /// Create a connector with default options
    pub fn with_defaults() -> Self {
        SshConnector {
            config: Arc::new(russh::client::Config::default()),
            socket_opts: SocketOpts::default(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Set the russh client configuration
    pub fn with_config(mut self, config: russh::client::Config) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Set socket options
    pub fn with_socket_opts(mut self, opts: SocketOpts) -> Self {
        self.socket_opts = opts;
        self
    }

    /// Set TCP connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Socket options in use
    pub fn socket_opts(&self) -> &SocketOpts {
        &self.socket_opts
    }

    /// TCP connect timeout in use
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    async fn connect(&self, identity: &Identity, options: &ConnectOptions) -> Result<SshSession> {
        let addr = identity.addr();
        let stream = connect_tcp(&addr, &self.socket_opts, self.connect_timeout).await?;

        let mut handle =
            russh::client::connect_stream(self.config.clone(), stream, ClientHandler).await?;

        if let Err(e) = authenticate(&mut handle, &identity.user, &options.auth).await {
            let _ = handle
                .disconnect(Disconnect::ByApplication, "authentication failed", "")
                .await;
            return Err(e);
        }

        info!("SSH session established to {}", identity);
        Ok(SshSession {
            handle,
            identity: identity.clone(),
            connected_at: Instant::now(),
        })
    }
}

/// Try each method in order until the server accepts one
async fn authenticate(
    handle: &mut Handle<ClientHandler>,
    user: &str,
    methods: &[AuthMethod],
) -> Result<()> {
    if methods.is_empty() {
        return Err(SshError::Auth(format!(
            "no authentication methods configured for {}",
            user
        )));
    }

    for method in methods {
        let result = match method {
            AuthMethod::Password(password) => {
                handle.authenticate_password(user, password.as_str()).await?
            }
            AuthMethod::PrivateKey { pem, passphrase } => {
                let key = match decode_private_key(pem, passphrase.as_deref()) {
                    Ok(key) => key,
                    Err(e) => {
                        warn!("Skipping private key for {}: {}", user, e);
                        continue;
                    }
                };
                // RSA keys need the strongest hash the server supports
                let hash_alg = handle.best_supported_rsa_hash().await?.flatten();
                handle
                    .authenticate_publickey(user, PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg))
                    .await?
            }
        };

        if matches!(result, AuthResult::Success) {
            debug!("Authenticated {} with {}", user, method.name());
            return Ok(());
        }
        debug!("Server rejected {} authentication for {}", method.name(), user);
    }

    Err(SshError::Auth(format!(
        "all authentication methods rejected for {}",
        user
    )))
}

#[async_trait]
impl SessionFactory for SshConnector {
    type Session = SshSession;
    type Options = ConnectOptions;
    type Error = SshError;

    async fn construct(&self, identity: &Identity, options: &ConnectOptions) -> Result<SshSession> {
        match options.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.connect(identity, options))
                .await
                .map_err(|_| SshError::Timeout(format!("establishing session to {}", identity)))?,
            None => self.connect(identity, options).await,
        }
    }

    async fn probe(&self, session: &SshSession) -> Result<()> {
        if session.is_closed() {
            return Err(SshError::Closed);
        }
        session.handle.send_keepalive(false).await?;
        Ok(())
    }

    async fn close(&self, session: SshSession) -> Result<()> {
        if session.is_closed() {
            return Ok(());
        }
        debug!("Closing SSH session to {}", session.identity);
        session
            .handle
            .disconnect(Disconnect::ByApplication, "", "")
            .await?;
        Ok(())
    }
}
