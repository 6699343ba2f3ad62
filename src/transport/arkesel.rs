use serde::Deserialize;

use super::{SendReply, TransportError, non_blank};
use crate::domain::{MessageText, NormalizedPhone, SenderId};

const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Clone, Deserialize)]
struct ArkeselJsonResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Vec<ArkeselRecipientResult>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ArkeselRecipientResult {
    #[serde(default)]
    id: Option<String>,
}

/// JSON body for `POST /api/v2/sms/send`.
///
/// Arkesel expects recipients without the leading `+`.
pub fn encode_arkesel_send_body(
    sender: &SenderId,
    to: &NormalizedPhone,
    msg: &MessageText,
) -> serde_json::Value {
    serde_json::json!({
        "sender": sender.as_str(),
        "message": msg.as_str(),
        "recipients": [to.digits()],
    })
}

/// Decode a 2xx response body.
pub fn decode_arkesel_send_response(json: &str) -> Result<SendReply, TransportError> {
    let parsed: ArkeselJsonResponse = serde_json::from_str(json)?;

    let status = parsed.status.unwrap_or_default();
    if !status.eq_ignore_ascii_case(STATUS_SUCCESS) {
        let message = non_blank(parsed.message)
            .unwrap_or_else(|| format!("unexpected status: {status:?}"));
        return Ok(SendReply::Rejected { message });
    }

    let message_id = parsed
        .data
        .unwrap_or_default()
        .into_iter()
        .find_map(|it| non_blank(it.id))
        .ok_or(TransportError::MissingField { field: "data[].id" })?;

    Ok(SendReply::Accepted { message_id })
}

/// Extract the error text from a non-2xx response body, if it carries one.
pub fn decode_arkesel_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ArkeselJsonResponse>(body)
        .ok()
        .and_then(|parsed| non_blank(parsed.message))
}
