use std::fmt;

use serde::{Serialize, Serializer};

/// Message id prefix used by the simulated provider.
pub const SIMULATED_ID_PREFIX: &str = "sim_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Serializes as its display name ([`ProviderName::as_str`]).
pub enum ProviderName {
    Arkesel,
    Twilio,
    Simulated,
}

impl ProviderName {
    /// Display name, as shown in the dashboard.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arkesel => "Arkesel",
            Self::Twilio => "Twilio",
            Self::Simulated => "Simulated",
        }
    }

    pub fn is_live(self) -> bool {
        !matches!(self, Self::Simulated)
    }
}

impl Serialize for ProviderName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Outcome of one send.
///
/// Invariant: `message_id` is set only when `success`, `error` only when not.
pub struct SendResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub provider: ProviderName,
}

impl SendResult {
    pub fn delivered(provider: ProviderName, message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error: None,
            provider,
        }
    }

    pub fn failed(provider: ProviderName, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
            provider,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
/// Aggregate of a bulk send.
///
/// Invariant: `success + failed == results.len()`, and `results` follows recipient order.
pub struct BulkSendResult {
    pub success: usize,
    pub failed: usize,
    pub results: Vec<SendResult>,
}

impl BulkSendResult {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            success: 0,
            failed: 0,
            results: Vec::with_capacity(capacity),
        }
    }

    /// Append one result, keeping the counters in step.
    pub fn push(&mut self, result: SendResult) {
        if result.success {
            self.success += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }
}

impl FromIterator<SendResult> for BulkSendResult {
    fn from_iter<I: IntoIterator<Item = SendResult>>(iter: I) -> Self {
        let mut bulk = Self::default();
        for result in iter {
            bulk.push(result);
        }
        bulk
    }
}
