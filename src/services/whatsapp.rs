// Client de la passerelle WhatsApp (API REST, auth par x-api-key).
//
// Sert à livrer les codes OTP et à administrer les sessions de la
// passerelle. Un échec de livraison n'annule JAMAIS un code déjà persisté :
// sur un échec ambigu le message a pu partir quand même, on préfère garder
// le code valide plutôt que d'invalider un code potentiellement reçu.

use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum WhatsAppError {
    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected gateway response: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Clone)]
pub struct WhatsAppProvider {
    client: Client,
    base_url: String,
    api_key: String,
    session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddSessionResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionStatusResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SessionInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub data: Vec<SessionInfo>,
}

/// Adresse de destination dérivée du numéro local :
/// préfixe pays fixe + numéro + domaine WhatsApp
fn jid_for_phone(phone: &str) -> String {
    format!("252{}@s.whatsapp.net", phone)
}

fn code_message(code: &str) -> String {
    format!("Your KobacPay verification code is: {}", code)
}

impl WhatsAppProvider {
    pub fn from_config(config: &Config) -> WhatsAppProvider {
        WhatsAppProvider {
            client: Client::new(),
            base_url: config.whatsapp_api_base_url.clone(),
            api_key: config.whatsapp_api_key.clone(),
            session_id: config.whatsapp_session_id.clone(),
        }
    }

    async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(StatusCode, serde_json::Value), WhatsAppError> {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, endpoint))
            .header("x-api-key", &self.api_key);

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let payload = response.json::<serde_json::Value>().await?;

        Ok((status, payload))
    }

    /// Envoie un code de vérification sur le WhatsApp du numéro donné
    pub async fn send_code(&self, code: &str, phone: &str) -> Result<(), WhatsAppError> {
        let body = serde_json::json!({
            "jid": jid_for_phone(phone),
            "message": { "text": code_message(code) },
        });

        let endpoint = format!("/{}/messages/send", self.session_id);
        let (status, payload) = self.make_request(Method::POST, &endpoint, Some(body)).await?;

        if !status.is_success() {
            return Err(WhatsAppError::UnexpectedResponse(format!(
                "send returned {}: {}",
                status, payload
            )));
        }

        tracing::info!(phone = %phone, "verification code dispatched");
        Ok(())
    }

    pub async fn list_sessions(&self) -> Result<SessionListResponse, WhatsAppError> {
        let (_, payload) = self.make_request(Method::GET, "/sessions", None).await?;
        serde_json::from_value(payload)
            .map_err(|e| WhatsAppError::UnexpectedResponse(e.to_string()))
    }

    pub async fn find_session(
        &self,
        session_id: &str,
    ) -> Result<SessionStatusResponse, WhatsAppError> {
        let endpoint = format!("/sessions/{}", session_id);
        let (status, payload) = self.make_request(Method::GET, &endpoint, None).await?;

        // Une session inconnue est un payload d'état, pas une erreur
        if status == StatusCode::NOT_FOUND {
            return Ok(SessionStatusResponse {
                status: "error".to_string(),
                message: "Session not found".to_string(),
                data: None,
            });
        }

        serde_json::from_value(payload)
            .map_err(|e| WhatsAppError::UnexpectedResponse(e.to_string()))
    }

    pub async fn add_session(
        &self,
        session_id: &str,
        read_incoming_messages: bool,
        sync_full_history: bool,
    ) -> Result<AddSessionResponse, WhatsAppError> {
        let body = serde_json::json!({
            "sessionId": session_id,
            "readIncomingMessages": read_incoming_messages,
            "syncFullHistory": sync_full_history,
        });

        let (_, payload) = self
            .make_request(Method::POST, "/sessions/add", Some(body))
            .await?;
        serde_json::from_value(payload)
            .map_err(|e| WhatsAppError::UnexpectedResponse(e.to_string()))
    }

    pub async fn delete_session(
        &self,
        session_id: &str,
    ) -> Result<SessionResponse, WhatsAppError> {
        let endpoint = format!("/sessions/{}", session_id);
        let (_, payload) = self.make_request(Method::DELETE, &endpoint, None).await?;
        serde_json::from_value(payload)
            .map_err(|e| WhatsAppError::UnexpectedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jid_has_country_prefix_and_domain() {
        assert_eq!(jid_for_phone("612345678"), "252612345678@s.whatsapp.net");
    }

    #[test]
    fn test_code_message_contains_code() {
        let msg = code_message("482913");
        assert!(msg.contains("482913"));
        assert!(msg.contains("KobacPay"));
    }
}
