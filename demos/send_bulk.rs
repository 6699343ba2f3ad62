use std::io;
use std::time::Duration;

use smsdispatch::{FailurePolicy, ProviderConfig, SmsDispatcher};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Comma separated, e.g. `0241234567,+233201234567`.
    let phones = std::env::var("SMS_PHONES").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SMS_PHONES environment variable is required",
        )
    })?;
    let recipients: Vec<&str> = phones.split(',').map(str::trim).collect();
    let message = std::env::var("SMS_MESSAGE")
        .unwrap_or_else(|_| "Registry update: please check your vehicle record.".to_owned());

    let dispatcher = SmsDispatcher::builder(ProviderConfig::from_env())
        .timeout(Duration::from_secs(15))
        .failure_policy(FailurePolicy::Report)
        .build()?;

    let bulk = dispatcher.send_bulk_sms(&recipients, &message).await;
    println!("sent: {}, failed: {}", bulk.success, bulk.failed);
    for (recipient, result) in recipients.iter().zip(&bulk.results) {
        println!(
            "{recipient}: {} via {}",
            result
                .message_id
                .as_deref()
                .or(result.error.as_deref())
                .unwrap_or_default(),
            result.provider
        );
    }

    Ok(())
}
