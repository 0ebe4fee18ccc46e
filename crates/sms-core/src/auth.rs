use std::fmt;
use std::sync::Arc;

use crate::{WebhookRequest, WebhookResponse, EVENT_INCOMING_MESSAGE, FIELD_MESSAGE_ID};

/// Outcome of a secret check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Proceed with event emission and response selection.
    Continue,
    /// Stop here and send this response.
    Reject(WebhookResponse),
}

/// Caller-supplied secret check.
///
/// A validator alone decides whether processing continues. It may rewrite the
/// payload before returning [`Verdict::Continue`]; the rewritten payload is what
/// listeners and the auto-reply handler see.
pub trait SecretValidator: Send + Sync {
    fn validate(&self, request: &mut WebhookRequest) -> Verdict;
}

impl<F> SecretValidator for F
where
    F: Fn(&mut WebhookRequest) -> Verdict + Send + Sync,
{
    fn validate(&self, request: &mut WebhookRequest) -> Verdict {
        self(request)
    }
}

/// The gate in front of event emission.
#[derive(Clone)]
pub enum Authenticator {
    /// Compare the body's `secret` field against a fixed value.
    StaticSecret(String),
    /// Delegate the decision to a validator.
    CustomValidator(Arc<dyn SecretValidator>),
}

impl Authenticator {
    pub fn validator<V: SecretValidator + 'static>(validator: V) -> Self {
        Self::CustomValidator(Arc::new(validator))
    }

    pub fn authenticate(&self, request: &mut WebhookRequest) -> Verdict {
        match self {
            Self::StaticSecret(expected) => {
                if request.payload.secret() == Some(expected.as_str()) {
                    Verdict::Continue
                } else {
                    Verdict::Reject(WebhookResponse::forbidden())
                }
            }
            Self::CustomValidator(validator) => validator.validate(request),
        }
    }

    /// An empty static secret counts as no secret at all.
    pub fn is_configured(&self) -> bool {
        match self {
            Self::StaticSecret(secret) => !secret.is_empty(),
            Self::CustomValidator(_) => true,
        }
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticSecret(_) => f.write_str("StaticSecret(<redacted>)"),
            Self::CustomValidator(_) => f.write_str("CustomValidator(..)"),
        }
    }
}

impl From<String> for Authenticator {
    fn from(secret: String) -> Self {
        Self::StaticSecret(secret)
    }
}

impl From<&str> for Authenticator {
    fn from(secret: &str) -> Self {
        Self::StaticSecret(secret.to_string())
    }
}

/// Validator for providers that append a message id to the secret of status callbacks.
///
/// Status notifications carry `secret=<secret>:<id>`; the id is split off and stored
/// under `__id`. Incoming messages carry the bare secret.
#[derive(Clone)]
pub struct CompositeSecretValidator {
    secret: String,
    incoming_event: String,
}

impl CompositeSecretValidator {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            incoming_event: EVENT_INCOMING_MESSAGE.to_string(),
        }
    }

    pub fn with_incoming_event(mut self, event: impl Into<String>) -> Self {
        self.incoming_event = event.into();
        self
    }
}

impl fmt::Debug for CompositeSecretValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeSecretValidator")
            .field("incoming_event", &self.incoming_event)
            .finish_non_exhaustive()
    }
}

impl SecretValidator for CompositeSecretValidator {
    fn validate(&self, request: &mut WebhookRequest) -> Verdict {
        let raw = request.payload.secret().unwrap_or_default().to_string();
        let is_incoming = request.payload.event() == Some(self.incoming_event.as_str());

        let secret = if is_incoming {
            raw.as_str()
        } else {
            // Only the second segment is the id; anything after another ':' is dropped.
            let mut parts = raw.split(':');
            let secret = parts.next().unwrap_or_default();
            if let Some(id) = parts.next() {
                request.payload.insert(FIELD_MESSAGE_ID, id);
            }
            secret
        };

        if !self.secret.is_empty() && secret == self.secret {
            Verdict::Continue
        } else {
            Verdict::Reject(WebhookResponse::forbidden())
        }
    }
}
