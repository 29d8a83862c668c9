use std::sync::Arc;

use crate::domain::errors::SettingsError;
use crate::domain::ports::{HandshakeGateway, HandshakeReply, ProgressLog};
use crate::domain::SessionCredentials;

// Settings use case: one handshake request, validated into credentials.
pub struct FetchSettingsUseCase<G> {
    pub gateway: G,
    pub log: Arc<dyn ProgressLog>,
}

impl<G> FetchSettingsUseCase<G>
where
    G: HandshakeGateway,
{
    pub async fn execute(&self) -> Result<SessionCredentials, SettingsError> {
        self.log.append_line("Fetching settings...");

        let result = self
            .gateway
            .request_handshake()
            .await
            .and_then(credentials_from_reply);

        match &result {
            Ok(credentials) => {
                tracing::debug!(endpoint = %credentials.endpoint, "handshake accepted");
                self.log.append_line("Settings fetched successfully.");
            }
            Err(e) => {
                self.log
                    .append_line(&format!("Error fetching settings: {e}"));
            }
        }
        result
    }
}

/// Validates a handshake reply. Status is checked before headers, and a
/// credential pair is only returned when both headers are present and non-empty.
pub fn credentials_from_reply(reply: HandshakeReply) -> Result<SessionCredentials, SettingsError> {
    if !(200..300).contains(&reply.status) {
        return Err(SettingsError::UnexpectedStatus(reply.status));
    }

    let access_token = non_empty(reply.access_token).ok_or(SettingsError::MissingAccessToken)?;
    let endpoint = non_empty(reply.websocket_url).ok_or(SettingsError::MissingEndpoint)?;

    Ok(SessionCredentials {
        endpoint,
        access_token,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
