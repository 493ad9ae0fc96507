//! Record types.
//!
//! A [`Record`] is assembled once per user action from a caller-supplied
//! [`Submission`] plus the context collected by the persister (resolved
//! address, timestamp, session id). It exposes no setters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::resolution::ResolutionResult;

/// Action tag carried by account-creation records.
pub const ACCOUNT_CREATION_ACTION: &str = "create_account_attempt";

/// Kind of user action a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// A sign-in form was submitted.
    LoginAttempt,
    /// The account-creation button was used.
    AccountCreationAttempt,
}

impl RecordKind {
    /// Sink channel this kind of record is appended to.
    pub fn channel(self) -> Channel {
        match self {
            Self::LoginAttempt => Channel::Logins,
            Self::AccountCreationAttempt => Channel::UserActions,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoginAttempt => write!(f, "LOGIN_ATTEMPT"),
            Self::AccountCreationAttempt => write!(f, "ACCOUNT_CREATION_ATTEMPT"),
        }
    }
}

/// Named logical channel of the primary sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Logins,
    UserActions,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Logins => "logins",
            Self::UserActions => "user_actions",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker for a secret the user supplied.
///
/// Only the fact that a secret was present is kept. The value itself is
/// dropped at construction, so it can never reach a sink or a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretField;

impl SecretField {
    /// Serialized form of every secret field.
    pub const MARKER: &'static str = "[redacted]";

    /// Returns a marker when `value` is non-blank, discarding the value.
    pub fn supplied(value: &str) -> Option<Self> {
        if value.trim().is_empty() {
            None
        } else {
            Some(Self)
        }
    }
}

impl std::fmt::Display for SecretField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(Self::MARKER)
    }
}

impl Serialize for SecretField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(Self::MARKER)
    }
}

impl<'de> Deserialize<'de> for SecretField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Whatever was stored, only presence survives.
        let _ = serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(Self)
    }
}

/// Subject data handed over by the caller when a user action completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    subject: String,
    secret: Option<SecretField>,
    client_context: String,
    outcome: bool,
}

impl Submission {
    /// Create a submission for `subject` (trimmed, otherwise unvalidated).
    ///
    /// The outcome flag defaults to `true`: records are only produced after
    /// the user-facing flow has reached its success state.
    pub fn new(subject: impl AsRef<str>) -> Self {
        Self {
            subject: subject.as_ref().trim().to_string(),
            secret: None,
            client_context: String::new(),
            outcome: true,
        }
    }

    /// Note that a secret was supplied. The value is not retained.
    pub fn secret(mut self, value: &str) -> Self {
        self.secret = SecretField::supplied(value);
        self
    }

    /// Client context string, e.g. a user agent.
    pub fn client_context(mut self, context: impl Into<String>) -> Self {
        self.client_context = context.into();
        self
    }

    pub fn outcome(mut self, outcome: bool) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }
}

/// The unit of persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    kind: RecordKind,
    subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secret: Option<SecretField>,
    timestamp: DateTime<Utc>,
    #[serde(rename = "userAgent")]
    client_context: String,
    #[serde(rename = "ipAddress")]
    address: String,
    success: bool,
    session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<String>,
}

impl Record {
    /// Assemble a record for `kind`.
    ///
    /// The secret marker is kept only for login attempts; account-creation
    /// records never carry one and are tagged with [`ACCOUNT_CREATION_ACTION`].
    pub fn assemble(
        kind: RecordKind,
        submission: Submission,
        address: &ResolutionResult,
        timestamp: DateTime<Utc>,
        session_id: impl Into<String>,
    ) -> Self {
        let (secret, action) = match kind {
            RecordKind::LoginAttempt => (submission.secret, None),
            RecordKind::AccountCreationAttempt => {
                (None, Some(ACCOUNT_CREATION_ACTION.to_string()))
            }
        };

        Self {
            kind,
            subject: submission.subject,
            secret,
            timestamp,
            client_context: submission.client_context,
            address: address.as_record_value().to_string(),
            success: submission.outcome,
            session_id: session_id.into(),
            action,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn channel(&self) -> Channel {
        self.kind.channel()
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn secret(&self) -> Option<SecretField> {
        self.secret
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn client_context(&self) -> &str {
        &self.client_context
    }

    /// Resolved address, or one of the failure sentinels
    /// ([`crate::EXHAUSTED_ADDRESS`], [`crate::INTERNAL_ERROR_ADDRESS`]).
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn outcome(&self) -> bool {
        self.success
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }
}

/// Generate a session correlation id: `session-<unix millis>-<random>`.
pub fn new_session_id() -> String {
    format!(
        "session-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}
