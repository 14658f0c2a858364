// ABOUTME: User records synchronised from the external identity provider
// ABOUTME: User and UserSync definitions keyed by the provider's external id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Locally stored user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Internal identifier
    pub id: Uuid,
    /// Identity provider user id (e.g. `user_2abc...`)
    pub external_id: String,
    /// Primary email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// First time the user was synced
    pub created_at: DateTime<Utc>,
    /// Last sync time
    pub updated_at: DateTime<Utc>,
}

/// Fields received from the identity webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSync {
    /// Primary email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Avatar URL
    pub image: Option<String>,
    /// Identity provider user id
    pub external_id: String,
}
