// ABOUTME: Structured logging setup over tracing-subscriber for both FitVoice binaries
// ABOUTME: Reads RUST_LOG and LOG_FORMAT, quiets chatty dependencies, picks stdout or stderr
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Structured logging configuration
//!
//! The HTTP server logs to stdout. The terminal session prints the
//! conversation on stdout, so it sends logs to stderr instead.

use std::env;
use std::io;

use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{filter::Directive, registry, EnvFilter};

use crate::errors::{AppError, AppResult};

/// Directives appended after `RUST_LOG` so HTTP and SQL internals stay quiet
const NOISE_DIRECTIVES: &[&str] = &[
    "hyper=warn",
    "hyper::proto=warn",
    "reqwest=warn",
    "sqlx=info",
    "sqlx::query=warn",
    "tower_http=info",
];

const DEFAULT_LEVEL: &str = "info";

/// Log line layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event
    Json,
    /// Multi-field human-readable lines
    #[default]
    Pretty,
    /// Single short line per event
    Compact,
}

impl LogFormat {
    /// Parse `LOG_FORMAT`; unknown values fall back to pretty
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Where log lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    /// Standard output
    #[default]
    Stdout,
    /// Standard error
    Stderr,
}

impl<'a> MakeWriter<'a> for LogTarget {
    type Writer = Box<dyn io::Write>;

    fn make_writer(&'a self) -> Self::Writer {
        match self {
            Self::Stdout => Box::new(io::stdout()),
            Self::Stderr => Box::new(io::stderr()),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Base filter, e.g. `info` or `fitvoice_server=debug`
    pub filter: String,
    /// Output layout
    pub format: LogFormat,
    /// Add file and line to each event
    pub include_location: bool,
    /// Emit span open and close events
    pub include_spans: bool,
    /// Output stream
    pub target: LogTarget,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LEVEL.to_owned(),
            format: LogFormat::default(),
            include_location: false,
            include_spans: false,
            target: LogTarget::default(),
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG`, `LOG_FORMAT`, `LOG_INCLUDE_LOCATION` and `LOG_INCLUDE_SPANS`.
    ///
    /// Production (`ENVIRONMENT=production`) always includes source locations.
    #[must_use]
    pub fn from_env() -> Self {
        let production = env::var("ENVIRONMENT").is_ok_and(|e| e.eq_ignore_ascii_case("production"));

        Self {
            filter: env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LEVEL.to_owned()),
            format: env::var("LOG_FORMAT")
                .map(|raw| LogFormat::parse(&raw))
                .unwrap_or_default(),
            include_location: production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_spans: env::var("LOG_INCLUDE_SPANS").is_ok(),
            target: LogTarget::Stdout,
        }
    }

    /// Write to stderr
    #[must_use]
    pub const fn with_stderr(mut self) -> Self {
        self.target = LogTarget::Stderr;
        self
    }

    /// Base filter plus the noise directives
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        NOISE_DIRECTIVES
            .iter()
            .filter_map(|d| d.parse::<Directive>().ok())
            .fold(EnvFilter::new(&self.filter), EnvFilter::add_directive)
    }

    /// Install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> AppResult<()> {
        let spans = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let layer = fmt::layer()
            .with_writer(self.target)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_span_events(spans);
        let subscriber = registry().with(self.env_filter());

        let installed = match self.format {
            LogFormat::Json => subscriber.with(layer.json()).try_init(),
            LogFormat::Pretty => subscriber.with(layer).try_init(),
            LogFormat::Compact => subscriber.with(layer.compact().with_target(false)).try_init(),
        };
        installed.map_err(|e| AppError::internal(format!("Failed to initialize logging: {e}")))?;

        info!(
            service.version = env!("CARGO_PKG_VERSION"),
            log.filter = %self.filter,
            log.format = ?self.format,
            "Logging initialized"
        );
        Ok(())
    }
}
