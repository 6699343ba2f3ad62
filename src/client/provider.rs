//! Outbound SMS transports behind one `send` capability.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::debug;
use url::Url;

use super::{HttpRequest, HttpResponse, HttpTransport, RequestBody, SmsError};
use crate::config::{ArkeselCredentials, TwilioCredentials};
use crate::domain::{MessageText, NormalizedPhone, ProviderName, SIMULATED_ID_PREFIX, SendResult};
use crate::transport::{self, SendReply};

static SIMULATED_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub(super) struct Endpoints {
    pub(super) arkesel: String,
    pub(super) twilio_base: String,
}

#[derive(Debug, Clone)]
pub(super) enum Provider {
    Arkesel(ArkeselCredentials),
    Twilio(TwilioCredentials),
    /// Accepts everything after `latency`; nothing is delivered.
    Simulated { latency: Duration },
}

impl Provider {
    pub(super) fn name(&self) -> ProviderName {
        match self {
            Self::Arkesel(_) => ProviderName::Arkesel,
            Self::Twilio(_) => ProviderName::Twilio,
            Self::Simulated { .. } => ProviderName::Simulated,
        }
    }

    pub(super) async fn send(
        &self,
        http: &dyn HttpTransport,
        endpoints: &Endpoints,
        to: &NormalizedPhone,
        msg: &MessageText,
    ) -> Result<SendResult, SmsError> {
        let provider = self.name();

        if let Self::Simulated { latency } = self {
            tokio::time::sleep(*latency).await;
            let message_id = simulated_message_id();
            debug!(%message_id, segments = msg.segments(), "simulated sms send");
            return Ok(SendResult::delivered(provider, message_id));
        }

        let request = self.request(endpoints, to, msg)?;
        debug!(%provider, url = %request.url, "sending sms");

        let response = http.post(request).await.map_err(SmsError::Transport)?;
        let message_id = self.interpret(response)?;
        debug!(%provider, %message_id, "sms accepted");

        Ok(SendResult::delivered(provider, message_id))
    }

    fn request(
        &self,
        endpoints: &Endpoints,
        to: &NormalizedPhone,
        msg: &MessageText,
    ) -> Result<HttpRequest, SmsError> {
        match self {
            Self::Arkesel(credentials) => Ok(HttpRequest {
                url: Url::parse(&endpoints.arkesel)?.to_string(),
                headers: vec![(
                    crate::domain::ApiKey::FIELD,
                    credentials.api_key.as_str().to_owned(),
                )],
                basic_auth: None,
                body: RequestBody::Json(transport::encode_arkesel_send_body(
                    &credentials.sender_id,
                    to,
                    msg,
                )),
            }),
            Self::Twilio(credentials) => Ok(HttpRequest {
                url: join_base(
                    &endpoints.twilio_base,
                    &transport::twilio_messages_path(&credentials.account_sid),
                )?
                .to_string(),
                headers: Vec::new(),
                basic_auth: Some((
                    credentials.account_sid.as_str().to_owned(),
                    credentials.auth_token.as_str().to_owned(),
                )),
                body: RequestBody::Form(transport::encode_twilio_send_form(
                    &credentials.from,
                    to,
                    msg,
                )),
            }),
            Self::Simulated { .. } => Err(SmsError::UnsupportedProvider(self.name())),
        }
    }

    /// Map an HTTP response to the provider message id, or to the provider's error.
    fn interpret(&self, response: HttpResponse) -> Result<String, SmsError> {
        let provider = self.name();

        if !(200..=299).contains(&response.status) {
            let message = match self {
                Self::Arkesel(_) => transport::decode_arkesel_error_message(&response.body),
                Self::Twilio(_) => transport::decode_twilio_error_message(&response.body),
                Self::Simulated { .. } => None,
            };
            return Err(match message {
                Some(message) => SmsError::Api { provider, message },
                None => SmsError::HttpStatus {
                    status: response.status,
                    body: if response.body.trim().is_empty() {
                        None
                    } else {
                        Some(response.body)
                    },
                },
            });
        }

        let reply = match self {
            Self::Arkesel(_) => transport::decode_arkesel_send_response(&response.body),
            Self::Twilio(_) => transport::decode_twilio_send_response(&response.body),
            Self::Simulated { .. } => return Err(SmsError::UnsupportedProvider(provider)),
        }
        .map_err(|err| SmsError::Parse(Box::new(err)))?;

        match reply {
            SendReply::Accepted { message_id } => Ok(message_id),
            SendReply::Rejected { message } => Err(SmsError::Api { provider, message }),
        }
    }
}

/// Join `path` under `base`, keeping any path prefix `base` already has.
fn join_base(base: &str, path: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path)
}

fn simulated_message_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|it| it.as_millis())
        .unwrap_or_default();
    let sequence = SIMULATED_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{SIMULATED_ID_PREFIX}{millis}_{sequence}")
}
