//! Provider credentials, loaded once at startup.

use tracing::warn;

use crate::domain::{
    AccountSid, ApiKey, AuthToken, NormalizedPhone, ProviderName, SenderId, ValidationError,
    normalize,
};

pub const ARKESEL_API_KEY: &str = "ARKESEL_API_KEY";
pub const ARKESEL_SENDER_ID: &str = "ARKESEL_SENDER_ID";
pub const TWILIO_ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
pub const TWILIO_AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
pub const TWILIO_PHONE_NUMBER: &str = "TWILIO_PHONE_NUMBER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArkeselCredentials {
    pub api_key: ApiKey,
    pub sender_id: SenderId,
}

impl ArkeselCredentials {
    pub fn new(
        api_key: impl Into<String>,
        sender_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            api_key: ApiKey::new(api_key)?,
            sender_id: SenderId::new(sender_id)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwilioCredentials {
    pub account_sid: AccountSid,
    pub auth_token: AuthToken,
    /// Twilio number messages are sent from.
    pub from: NormalizedPhone,
}

impl TwilioCredentials {
    /// `from` must be in international form (leading `+`); only its formatting is stripped.
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from: &str,
    ) -> Result<Self, ValidationError> {
        if !from.trim_start().starts_with('+') {
            return Err(ValidationError::InvalidPhoneNumber {
                input: from.to_owned(),
            });
        }
        Ok(Self {
            account_sid: AccountSid::new(account_sid)?,
            auth_token: AuthToken::new(auth_token)?,
            from: normalize(from).validated()?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Credentials of the live SMS providers.
///
/// A provider without credentials is excluded from dispatch; with neither configured every
/// send goes to the simulated provider.
pub struct ProviderConfig {
    pub arkesel: Option<ArkeselCredentials>,
    pub twilio: Option<TwilioCredentials>,
}

impl ProviderConfig {
    /// Read credentials from the process environment, after loading `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through `lookup`, keyed by the `ARKESEL_*` / `TWILIO_*` names.
    ///
    /// Blank values count as absent. A provider configured only partially (or with values
    /// that fail validation) is left out and a warning is logged.
    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let arkesel = match (get(ARKESEL_API_KEY), get(ARKESEL_SENDER_ID)) {
            (Some(api_key), Some(sender_id)) => {
                accept(ProviderName::Arkesel, ArkeselCredentials::new(api_key, sender_id))
            }
            (None, None) => None,
            _ => partial(ProviderName::Arkesel),
        };

        let twilio = match (
            get(TWILIO_ACCOUNT_SID),
            get(TWILIO_AUTH_TOKEN),
            get(TWILIO_PHONE_NUMBER),
        ) {
            (Some(sid), Some(token), Some(from)) => accept(
                ProviderName::Twilio,
                TwilioCredentials::new(sid, token, &from),
            ),
            (None, None, None) => None,
            _ => partial(ProviderName::Twilio),
        };

        Self { arkesel, twilio }
    }

    pub fn with_arkesel(mut self, credentials: ArkeselCredentials) -> Self {
        self.arkesel = Some(credentials);
        self
    }

    pub fn with_twilio(mut self, credentials: TwilioCredentials) -> Self {
        self.twilio = Some(credentials);
        self
    }

    /// Live providers with credentials, in priority order.
    pub fn available(&self) -> Vec<ProviderName> {
        let mut names = Vec::with_capacity(2);
        if self.arkesel.is_some() {
            names.push(ProviderName::Arkesel);
        }
        if self.twilio.is_some() {
            names.push(ProviderName::Twilio);
        }
        names
    }
}

/// Primary provider for `config`: Arkesel, then Twilio, then the simulated provider.
pub fn select_provider(config: &ProviderConfig) -> ProviderName {
    config
        .available()
        .first()
        .copied()
        .unwrap_or(ProviderName::Simulated)
}

fn accept<T>(provider: ProviderName, credentials: Result<T, ValidationError>) -> Option<T> {
    match credentials {
        Ok(credentials) => Some(credentials),
        Err(err) => {
            warn!(%provider, error = %err, "ignoring invalid provider credentials");
            None
        }
    }
}

fn partial<T>(provider: ProviderName) -> Option<T> {
    warn!(%provider, "ignoring partially configured provider credentials");
    None
}
