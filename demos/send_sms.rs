use std::io;

use smsdispatch::{ProviderConfig, SmsDispatcher};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let phone = std::env::var("SMS_PHONE").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SMS_PHONE environment variable is required",
        )
    })?;
    let message = std::env::var("SMS_MESSAGE")
        .unwrap_or_else(|_| "Vehicle detected at the main gate.".to_owned());

    let dispatcher = SmsDispatcher::new(&ProviderConfig::from_env());
    let result = dispatcher.send_sms(&phone, &message).await;

    println!(
        "provider: {}, success: {}, message_id: {:?}, error: {:?}",
        result.provider, result.success, result.message_id, result.error
    );

    Ok(())
}
