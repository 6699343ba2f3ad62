use serde::Deserialize;

use super::{SendReply, TransportError, non_blank};
use crate::domain::{AccountSid, MessageText, NormalizedPhone};

#[derive(Debug, Clone, Deserialize)]
struct TwilioMessageResponse {
    #[serde(default)]
    sid: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TwilioErrorResponse {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

/// Path of the Messages resource for `account`, relative to the API base URL.
pub fn twilio_messages_path(account: &AccountSid) -> String {
    format!("2010-04-01/Accounts/{}/Messages.json", account.as_str())
}

pub fn encode_twilio_send_form(
    from: &NormalizedPhone,
    to: &NormalizedPhone,
    msg: &MessageText,
) -> Vec<(String, String)> {
    vec![
        ("To".to_owned(), to.as_str().to_owned()),
        ("From".to_owned(), from.as_str().to_owned()),
        ("Body".to_owned(), msg.as_str().to_owned()),
    ]
}

/// Decode a 2xx response body.
///
/// Twilio answers `201 Created` with the message resource; a `failed` or `undelivered`
/// status at creation time carries the reason in `error_message`.
pub fn decode_twilio_send_response(json: &str) -> Result<SendReply, TransportError> {
    let parsed: TwilioMessageResponse = serde_json::from_str(json)?;

    if let Some(status @ ("failed" | "undelivered")) = parsed.status.as_deref() {
        let message = non_blank(parsed.error_message)
            .unwrap_or_else(|| format!("message {status}"));
        return Ok(SendReply::Rejected { message });
    }

    let message_id = non_blank(parsed.sid).ok_or(TransportError::MissingField { field: "sid" })?;
    Ok(SendReply::Accepted { message_id })
}

/// Extract the error text from a non-2xx response body, if it carries one.
pub fn decode_twilio_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<TwilioErrorResponse>(body).ok()?;
    let message = non_blank(parsed.message)?;
    Some(match parsed.code {
        Some(code) => format!("{message} (code {code})"),
        None => message,
    })
}
