// ABOUTME: Identity provider webhook route handler
// ABOUTME: Passes svix headers and the raw body to the identity webhook handler
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use tracing::info;

use crate::errors::AppResult;
use crate::resources::ServerResources;
use crate::webhooks::{SvixHeaders, WebhookResult};

/// Webhook routes handler
pub struct WebhookRoutes;

impl WebhookRoutes {
    /// Create all webhook routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/clerk-webhook", post(Self::identity_webhook))
            .with_state(resources)
    }

    /// Verify and apply an identity provider event
    async fn identity_webhook(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> AppResult<(StatusCode, &'static str)> {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        let svix = SvixHeaders {
            id: header("svix-id"),
            timestamp: header("svix-timestamp"),
            signature: header("svix-signature"),
        };

        match resources.webhooks.handle(&svix, &body).await? {
            WebhookResult::UserSynced { external_id } => {
                info!(user.external_id = %external_id, "Identity webhook processed");
            }
            WebhookResult::Unhandled { event_type } => {
                info!(event.type = %event_type, "Identity webhook event ignored");
            }
        }

        Ok((StatusCode::OK, "Webhooks processed successfully"))
    }
}
