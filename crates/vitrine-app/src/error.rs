// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::filters::FilterKey;

/// Failures at the list boundary. Validation and policy errors are recovered
/// where they happen, `NotFound` turns into a redirect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    #[error("invalid value {value:?} for filter `{}`", .key.param())]
    Validation { key: FilterKey, value: String },

    #[error("request failed: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("status filter needs a venue or offerer filter for administrators")]
    PolicyViolation { key: FilterKey },

    #[error("{resource} not found")]
    NotFound { resource: String },
}

impl ListError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        if status == 404 {
            return Self::NotFound {
                resource: message.into(),
            };
        }
        Self::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Errors that put a screen in its error state; the others are handled
    /// locally by falling back or redirecting.
    pub const fn is_surfaced(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
