//! One-shot messages shown on the next rendered page.
//!
//! A handler pushes a message and redirects; the page that renders next takes
//! every pending message out of the session and shows it as a toast.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

/// Toast style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    /// CSS modifier for the toast.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "toast-success",
            Self::Error => "toast-error",
            Self::Info => "toast-info",
        }
    }
}

/// A pending message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

/// Extractor giving access to the flash queue of the current session.
#[derive(Clone)]
pub struct Flash(Session);

impl Flash {
    /// Queue a message. Failures are logged, not returned.
    pub async fn push(&self, kind: FlashKind, text: impl Into<String>) {
        let mut pending = self.pending().await;
        pending.push(FlashMessage {
            kind,
            text: text.into(),
        });
        if let Err(e) = self.0.insert(session_keys::FLASH, pending).await {
            tracing::warn!(error = %e, "Failed to store flash message");
        }
    }

    /// Queue a success message.
    pub async fn success(&self, text: impl Into<String>) {
        self.push(FlashKind::Success, text).await;
    }

    /// Queue an error message.
    pub async fn error(&self, text: impl Into<String>) {
        self.push(FlashKind::Error, text).await;
    }

    /// Queue an informational message.
    pub async fn info(&self, text: impl Into<String>) {
        self.push(FlashKind::Info, text).await;
    }

    /// Remove and return every pending message.
    pub async fn take(&self) -> Vec<FlashMessage> {
        match self.0.remove::<Vec<FlashMessage>>(session_keys::FLASH).await {
            Ok(pending) => pending.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read flash messages");
                Vec::new()
            }
        }
    }

    async fn pending(&self) -> Vec<FlashMessage> {
        self.0
            .get::<Vec<FlashMessage>>(session_keys::FLASH)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self)
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "Session layer missing"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn flash() -> Flash {
        Flash(Session::new(None, Arc::new(MemoryStore::default()), None))
    }

    #[tokio::test]
    async fn test_messages_are_taken_once_in_order() {
        let flash = flash();
        flash.success("Added to cart").await;
        flash.error("Remove failed").await;

        let taken = flash.take().await;
        assert_eq!(
            taken,
            vec![
                FlashMessage {
                    kind: FlashKind::Success,
                    text: "Added to cart".to_string()
                },
                FlashMessage {
                    kind: FlashKind::Error,
                    text: "Remove failed".to_string()
                },
            ]
        );
        assert!(flash.take().await.is_empty());
    }

    #[test]
    fn test_css_classes() {
        assert_eq!(FlashKind::Info.css_class(), "toast-info");
    }
}
