//! russh client handler

/// Client-side russh handler
///
/// Server host keys are accepted without verification; pooled sessions are
/// meant for hosts the caller already trusts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientHandler;

impl russh::client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh::keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}
