// ABOUTME: HTTP coach backend calling a running FitVoice server with reqwest
// ABOUTME: Maps the server's JSON error envelope back into application errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use super::coach::CoachBackend;
use crate::conversation::TurnOutcome;
use crate::errors::{AppError, AppResult, ErrorCode, ErrorResponse};
use crate::llm::ChatMessage;
use crate::models::{CollectedUserData, GeneratedPlan};

/// Connection timeout
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Request timeout; plan generation makes two model calls server-side
const REQUEST_TIMEOUT_SECS: u64 = 180;

/// Service name used in error messages
const SERVICE_NAME: &str = "FitVoice server";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatTurnBody<'a> {
    messages: &'a [ChatMessage],
    user_name: &'a str,
}

#[derive(Deserialize)]
struct SuccessBody<T> {
    data: T,
}

/// Coach backend talking to the HTTP API
pub struct HttpCoachClient {
    client: Client,
    base_url: String,
}

impl HttpCoachClient {
    /// Create a client for the server at `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> AppResult<T> {
        debug!(path, "Calling FitVoice server");
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let status = response.status();
        let text = response.text().await.map_err(|e| transport_error(&e))?;

        if !status.is_success() {
            return Err(serde_json::from_str::<ErrorResponse>(&text).map_or_else(
                |_| {
                    AppError::external_service(
                        SERVICE_NAME,
                        format!(
                            "HTTP {status}: {}",
                            text.chars().take(200).collect::<String>()
                        ),
                    )
                },
                |envelope| AppError::new(envelope.error.code, envelope.error.message),
            ));
        }

        serde_json::from_str(&text).map_err(|e| {
            AppError::external_service(SERVICE_NAME, format!("Unexpected response body: {e}"))
        })
    }
}

fn transport_error(e: &reqwest::Error) -> AppError {
    error!("Failed to reach {SERVICE_NAME}: {e}");
    if e.is_connect() || e.is_timeout() {
        AppError::new(
            ErrorCode::ExternalServiceUnavailable,
            format!("Cannot reach {SERVICE_NAME}: {e}"),
        )
    } else {
        AppError::external_service(SERVICE_NAME, e.to_string())
    }
}

#[async_trait]
impl CoachBackend for HttpCoachClient {
    async fn advance_turn(
        &self,
        history: &[ChatMessage],
        user_name: &str,
    ) -> AppResult<TurnOutcome> {
        let body = serde_json::to_value(ChatTurnBody {
            messages: history,
            user_name,
        })?;
        self.post("/api/chat", &body).await
    }

    async fn generate_plan(
        &self,
        user_id: &str,
        data: &CollectedUserData,
    ) -> AppResult<GeneratedPlan> {
        let mut body = serde_json::to_value(data)?;
        if let Value::Object(fields) = &mut body {
            fields.insert("userId".to_owned(), json!(user_id));
        }

        let envelope: SuccessBody<GeneratedPlan> = self.post("/api/generate-program", &body).await?;
        Ok(envelope.data)
    }
}
