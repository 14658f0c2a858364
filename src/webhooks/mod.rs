// ABOUTME: Identity provider webhook processing for user provisioning
// ABOUTME: Verifies svix signatures and upserts users on user.created events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Identity webhook handler
//!
//! ## Security
//!
//! Every request carries `svix-id`, `svix-timestamp` and `svix-signature`
//! headers. Requests are rejected before any mutation runs unless the
//! signature verifies against the configured secret.
//!
//! ## Event Types
//!
//! - `user.created` - upsert the user record
//! - anything else - acknowledged and ignored

/// Svix signature verification
pub mod svix;

pub use svix::{SignatureValidation, SvixHeaders, SvixVerifier};

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::database::FitnessStore;
use crate::errors::{AppError, AppResult};
use crate::models::UserSync;

/// Event type that provisions a user
pub const USER_CREATED: &str = "user.created";

/// Envelope of an identity provider event
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityEvent {
    /// Event type, e.g. `user.created`
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Email entry of an identity user
#[derive(Debug, Clone, Deserialize)]
pub struct EmailAddress {
    /// The address itself
    pub email_address: String,
}

/// User payload of `user.*` events
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    /// Identity provider user id
    pub id: String,
    /// Addresses, primary first
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Avatar URL
    pub image_url: Option<String>,
}

impl IdentityUser {
    /// Convert to a store upsert using the first email and `"{first} {last}"`
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when the user has no email address
    pub fn into_user_sync(self) -> AppResult<UserSync> {
        let email = self
            .email_addresses
            .into_iter()
            .next()
            .map(|e| e.email_address)
            .ok_or_else(|| AppError::invalid_input("user has no email address"))?;

        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_owned();

        Ok(UserSync {
            email,
            name,
            image: self.image_url,
            external_id: self.id,
        })
    }
}

/// Result of processing a webhook event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookResult {
    /// A user record was created or refreshed
    UserSynced {
        /// Identity provider user id
        external_id: String,
    },
    /// Verified event with no action for this service
    Unhandled {
        /// Event type
        event_type: String,
    },
}

/// Verifies and applies identity provider events
pub struct IdentityWebhookHandler {
    verifier: SvixVerifier,
    store: Arc<dyn FitnessStore>,
}

impl IdentityWebhookHandler {
    /// Create a handler for the given signing secret
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` when the secret cannot be decoded
    pub fn new(secret: &str, store: Arc<dyn FitnessStore>) -> AppResult<Self> {
        Ok(Self {
            verifier: SvixVerifier::new(secret)?,
            store,
        })
    }

    /// Verify the request and apply the event.
    ///
    /// # Errors
    ///
    /// Returns `SIGNATURE_INVALID` for missing headers, a bad signature or a
    /// stale timestamp, `INVALID_INPUT` for an unreadable payload, and the
    /// store's error when the upsert fails.
    pub async fn handle(&self, headers: &SvixHeaders<'_>, body: &[u8]) -> AppResult<WebhookResult> {
        match self.verifier.validate(headers, body) {
            SignatureValidation::Valid => {}
            SignatureValidation::Missing => {
                warn!("Webhook rejected: svix headers missing");
                return Err(AppError::signature_invalid("No svix headers found"));
            }
            SignatureValidation::Invalid => {
                warn!("Webhook rejected: signature mismatch");
                return Err(AppError::signature_invalid("Webhook signature mismatch"));
            }
            SignatureValidation::Expired => {
                warn!("Webhook rejected: timestamp outside tolerance");
                return Err(AppError::signature_invalid(
                    "Webhook timestamp outside tolerance",
                ));
            }
        }

        let event: IdentityEvent = serde_json::from_slice(body)
            .map_err(|e| AppError::invalid_input(format!("Invalid webhook payload: {e}")))?;
        debug!(event.type = %event.event_type, "Webhook verified");

        if event.event_type != USER_CREATED {
            return Ok(WebhookResult::Unhandled {
                event_type: event.event_type,
            });
        }

        let user: IdentityUser = serde_json::from_value(event.data)
            .map_err(|e| AppError::invalid_input(format!("Invalid user payload: {e}")))?;
        let sync = user.into_user_sync()?;
        let external_id = sync.external_id.clone();

        self.store.sync_user(&sync).await?;
        info!(user.external_id = %external_id, "User provisioned from identity webhook");

        Ok(WebhookResult::UserSynced { external_id })
    }
}
