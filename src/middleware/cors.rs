// ABOUTME: Cross-origin policy for the browser frontend calling the FitVoice API
// ABOUTME: Builds a tower-http CorsLayer from the configured origin list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsOrigins;

/// Headers a browser may send; the svix trio lets webhook replays through
const ALLOWED_HEADERS: [&str; 8] = [
    "content-type",
    "authorization",
    "accept",
    "origin",
    "x-request-id",
    "svix-id",
    "svix-timestamp",
    "svix-signature",
];

/// Layer for `CORS_ALLOWED_ORIGINS`
///
/// Unparseable entries are dropped. If nothing usable remains the policy
/// falls back to any origin, same as `*`.
#[must_use]
pub fn setup_cors(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::any(),
        CorsOrigins::List(list) => {
            let usable: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok())
                .collect();
            if usable.is_empty() {
                AllowOrigin::any()
            } else {
                AllowOrigin::list(usable)
            }
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers(ALLOWED_HEADERS.map(HeaderName::from_static))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
}
