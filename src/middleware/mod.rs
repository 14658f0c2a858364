// ABOUTME: HTTP middleware for request tracing and cross-origin access
// ABOUTME: Provides request ID spans and the CORS layer used by the router

pub mod cors;
pub mod request_tracing;

// CORS configuration
pub use cors::setup_cors;

// Request tracing
pub use request_tracing::{new_request_id, request_span, REQUEST_ID_HEADER};
