//! Transport layer: wire-format details per SMS vendor (serialization/deserialization).

mod arkesel;
mod twilio;

pub use arkesel::{
    decode_arkesel_error_message, decode_arkesel_send_response, encode_arkesel_send_body,
};
pub use twilio::{
    decode_twilio_error_message, decode_twilio_send_response, encode_twilio_send_form,
    twilio_messages_path,
};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is missing {field}")]
    MissingField { field: &'static str },
}

/// Vendor answer to a send request that reached the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendReply {
    Accepted { message_id: String },
    Rejected { message: String },
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|it| !it.trim().is_empty())
}
