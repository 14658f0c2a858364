// ABOUTME: Svix webhook signature verification using ring HMAC-SHA256
// ABOUTME: Checks svix-id/svix-timestamp/svix-signature headers with constant-time comparison
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Svix signature scheme
//!
//! The signed content is `{svix-id}.{svix-timestamp}.{body}`. The
//! `svix-signature` header carries one or more space-separated
//! `v1,<base64 HMAC-SHA256>` entries; any match is accepted.

use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use ring::hmac;
use subtle::ConstantTimeEq;

use crate::errors::{AppError, AppResult, ErrorCode};

/// Prefix of svix signing secrets
const SECRET_PREFIX: &str = "whsec_";

/// Signature version accepted in the `svix-signature` header
const SIGNATURE_VERSION: &str = "v1";

/// Maximum clock skew between the sender's timestamp and ours
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 5 * 60;

/// Header values of a svix-signed request
#[derive(Debug, Clone, Copy, Default)]
pub struct SvixHeaders<'a> {
    /// `svix-id`
    pub id: Option<&'a str>,
    /// `svix-timestamp` (unix seconds)
    pub timestamp: Option<&'a str>,
    /// `svix-signature`
    pub signature: Option<&'a str>,
}

/// Webhook signature validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureValidation {
    /// Signature is valid
    Valid,
    /// No entry in the signature header matches
    Invalid,
    /// At least one svix header is missing
    Missing,
    /// Timestamp is outside the tolerance window or unparsable
    Expired,
}

/// Verifies svix webhook signatures
pub struct SvixVerifier {
    key: hmac::Key,
}

impl SvixVerifier {
    /// Build a verifier from a `whsec_<base64>` secret
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` when the secret is not valid base64
    pub fn new(secret: &str) -> AppResult<Self> {
        let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        let raw = general_purpose::STANDARD.decode(encoded).map_err(|e| {
            AppError::new(
                ErrorCode::ConfigInvalid,
                format!("CLERK_WEBHOOK_SECRET is not valid base64: {e}"),
            )
        })?;

        Ok(Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, &raw),
        })
    }

    /// Validate a request against the current wall clock
    #[must_use]
    pub fn validate(&self, headers: &SvixHeaders<'_>, body: &[u8]) -> SignatureValidation {
        self.validate_at(headers, body, Utc::now().timestamp())
    }

    /// Validate a request as if the current unix time were `now`
    #[must_use]
    pub fn validate_at(
        &self,
        headers: &SvixHeaders<'_>,
        body: &[u8],
        now: i64,
    ) -> SignatureValidation {
        let (Some(id), Some(timestamp), Some(signature)) =
            (headers.id, headers.timestamp, headers.signature)
        else {
            return SignatureValidation::Missing;
        };

        let Ok(sent_at) = timestamp.trim().parse::<i64>() else {
            return SignatureValidation::Expired;
        };
        if now.abs_diff(sent_at) > TIMESTAMP_TOLERANCE_SECS.unsigned_abs() {
            return SignatureValidation::Expired;
        }

        let expected = self.signature(id, timestamp, body);
        let matched = signature
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == SIGNATURE_VERSION)
            .any(|(_, value)| bool::from(value.as_bytes().ct_eq(expected.as_bytes())));

        if matched {
            SignatureValidation::Valid
        } else {
            SignatureValidation::Invalid
        }
    }

    /// Base64 HMAC-SHA256 of `{id}.{timestamp}.{body}`
    #[must_use]
    pub fn signature(&self, id: &str, timestamp: &str, body: &[u8]) -> String {
        let mut context = hmac::Context::with_key(&self.key);
        context.update(id.as_bytes());
        context.update(b".");
        context.update(timestamp.as_bytes());
        context.update(b".");
        context.update(body);
        general_purpose::STANDARD.encode(context.sign().as_ref())
    }

    /// A `svix-signature` header value for the given message
    #[must_use]
    pub fn sign(&self, id: &str, timestamp: &str, body: &[u8]) -> String {
        format!("{SIGNATURE_VERSION},{}", self.signature(id, timestamp, body))
    }
}
