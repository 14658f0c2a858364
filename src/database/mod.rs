// ABOUTME: Persistence abstraction for plans and identity-synced users
// ABOUTME: Defines the FitnessStore trait implemented by the SQLite backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Persistence
//!
//! The plan generator and webhook handler depend only on [`FitnessStore`] and
//! receive it as an injected `Arc<dyn FitnessStore>`.

/// SQLite implementation of the store
pub mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::{NewPlan, Plan, User, UserSync};

/// Plan and user persistence
#[async_trait]
pub trait FitnessStore: Send + Sync {
    /// Store a complete plan as one record and return its identifier.
    ///
    /// When `plan.is_active` is set, the user's earlier plans are deactivated
    /// in the same transaction.
    async fn create_plan(&self, plan: &NewPlan) -> AppResult<Uuid>;

    /// All plans for a user, newest first
    async fn get_user_plans(&self, user_id: &str) -> AppResult<Vec<Plan>>;

    /// Insert or update a user keyed on the external identity id
    async fn sync_user(&self, user: &UserSync) -> AppResult<()>;

    /// Look up a user by external identity id
    async fn get_user_by_external_id(&self, external_id: &str) -> AppResult<Option<User>>;
}
