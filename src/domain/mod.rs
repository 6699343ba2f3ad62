//! Domain layer: strong types with validation and invariants (no I/O).

mod phone;
mod response;
mod validation;
mod value;

pub use phone::{NormalizedPhone, PhoneValidation, Region, is_valid, normalize, normalize_in};
pub use response::{BulkSendResult, ProviderName, SIMULATED_ID_PREFIX, SendResult};
pub use validation::ValidationError;
pub use value::{AccountSid, ApiKey, AuthToken, MessageText, SenderId};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_rejects_empty() {
        assert!(matches!(
            ApiKey::new("   "),
            Err(ValidationError::Empty {
                field: ApiKey::FIELD
            })
        ));
    }

    #[test]
    fn credentials_are_trimmed() {
        assert_eq!(ApiKey::new(" key ").unwrap().as_str(), "key");
        assert_eq!(SenderId::new(" AutoWatch ").unwrap().as_str(), "AutoWatch");
        assert_eq!(AccountSid::new(" AC123 ").unwrap().as_str(), "AC123");
    }

    #[test]
    fn auth_token_rejects_empty_but_keeps_whitespace() {
        assert!(AuthToken::new("").is_err());
        assert_eq!(AuthToken::new(" tok ").unwrap().as_str(), " tok ");
    }

    #[test]
    fn message_text_rejects_blank() {
        assert!(matches!(
            MessageText::new(" \n "),
            Err(ValidationError::Empty {
                field: MessageText::FIELD
            })
        ));
    }

    #[test]
    fn message_text_length_limit_counts_characters() {
        assert!(MessageText::new("a".repeat(MessageText::MAX_CHARS)).is_ok());
        // Multi-byte characters count once each.
        assert!(MessageText::new("é".repeat(MessageText::MAX_CHARS)).is_ok());

        let err = MessageText::new("a".repeat(MessageText::MAX_CHARS + 1)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MessageTooLong {
                max: 1600,
                actual: 1601
            }
        );
    }

    #[test]
    fn message_segments() {
        assert_eq!(MessageText::new("hi").unwrap().segments(), 1);
        assert_eq!(MessageText::new("a".repeat(160)).unwrap().segments(), 1);
        assert_eq!(MessageText::new("a".repeat(161)).unwrap().segments(), 2);
        assert_eq!(MessageText::new("a".repeat(1600)).unwrap().segments(), 10);
    }

    #[test]
    fn provider_names_display() {
        assert_eq!(ProviderName::Arkesel.to_string(), "Arkesel");
        assert_eq!(ProviderName::Simulated.as_str(), "Simulated");
        assert!(ProviderName::Twilio.is_live());
        assert!(!ProviderName::Simulated.is_live());
    }

    #[test]
    fn send_result_constructors_keep_fields_exclusive() {
        let ok = SendResult::delivered(ProviderName::Twilio, "SM1");
        assert!(ok.success);
        assert_eq!(ok.message_id.as_deref(), Some("SM1"));
        assert!(ok.error.is_none());

        let bad = SendResult::failed(ProviderName::Arkesel, "boom");
        assert!(!bad.success);
        assert!(bad.message_id.is_none());
        assert_eq!(bad.error.as_deref(), Some("boom"));
    }

    #[test]
    fn send_result_serializes_for_the_dashboard() {
        let ok = SendResult::delivered(ProviderName::Simulated, "sim_1");
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "messageId": "sim_1",
                "provider": "Simulated"
            })
        );
    }

    #[test]
    fn provider_name_serializes_as_its_display_name() {
        for name in [
            ProviderName::Arkesel,
            ProviderName::Twilio,
            ProviderName::Simulated,
        ] {
            assert_eq!(
                serde_json::to_value(name).unwrap(),
                serde_json::Value::String(name.to_string())
            );
        }
    }

    #[test]
    fn bulk_result_counts_track_results() {
        let bulk: BulkSendResult = [
            SendResult::delivered(ProviderName::Simulated, "sim_1"),
            SendResult::failed(ProviderName::Simulated, "Invalid phone number format"),
            SendResult::delivered(ProviderName::Simulated, "sim_2"),
        ]
        .into_iter()
        .collect();

        assert_eq!(bulk.success, 2);
        assert_eq!(bulk.failed, 1);
        assert_eq!(bulk.success + bulk.failed, bulk.results.len());
        assert_eq!(bulk.results[1].error.as_deref(), Some("Invalid phone number format"));
    }
}
