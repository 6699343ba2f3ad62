//! Client layer: provider selection, fallback, and bulk pacing around the transport calls.

mod provider;

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{ProviderConfig, select_provider};
use crate::domain::{
    BulkSendResult, MessageText, PhoneValidation, ProviderName, Region, SendResult,
    ValidationError, normalize_in,
};
use provider::{Endpoints, Provider};

const DEFAULT_ARKESEL_ENDPOINT: &str = "https://sms.arkesel.com/api/v2/sms/send";
const DEFAULT_TWILIO_BASE_URL: &str = "https://api.twilio.com";

/// Pause between consecutive sends of a bulk batch.
pub const DEFAULT_BULK_PACING: Duration = Duration::from_millis(100);
/// Artificial latency of the simulated provider.
pub const DEFAULT_SIMULATED_LATENCY: Duration = Duration::from_millis(500);

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

#[derive(Debug, Clone)]
enum RequestBody {
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone)]
struct HttpRequest {
    url: String,
    headers: Vec<(&'static str, String)>,
    basic_auth: Option<(String, String)>,
    body: RequestBody,
}

trait HttpTransport: Send + Sync {
    fn post<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let mut builder = self.client.post(&request.url);
            for (name, value) in &request.headers {
                builder = builder.header(*name, value);
            }
            if let Some((user, password)) = &request.basic_auth {
                builder = builder.basic_auth(user, Some(password));
            }
            builder = match &request.body {
                RequestBody::Json(json) => builder.json(json),
                RequestBody::Form(params) => builder.form(params),
            };

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors of a single provider attempt.
///
/// These never reach callers of [`SmsDispatcher`]; they are logged and folded into
/// [`SendResult::error`].
pub enum SmsError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status code without a provider error message.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The provider answered and refused the message.
    #[error("{provider} error: {message}")]
    Api {
        provider: ProviderName,
        message: String,
    },

    /// Response body could not be parsed as the expected format.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// A configured endpoint is not a valid URL.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0} does not issue HTTP requests")]
    UnsupportedProvider(ProviderName),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// What a send returns when every configured live provider failed.
pub enum FailurePolicy {
    /// Return the last live failure (`success: false`).
    #[default]
    Report,
    /// Hand the message to the simulated provider and return its success.
    Simulate,
}

#[derive(Debug, Clone, Copy)]
struct DispatchOptions {
    region: Region,
    phone_validation: PhoneValidation,
    bulk_pacing: Duration,
    simulated_latency: Duration,
    failure_policy: FailurePolicy,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            region: Region::default(),
            phone_validation: PhoneValidation::default(),
            bulk_pacing: DEFAULT_BULK_PACING,
            simulated_latency: DEFAULT_SIMULATED_LATENCY,
            failure_policy: FailurePolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
/// Builder for [`SmsDispatcher`].
pub struct SmsDispatcherBuilder {
    config: ProviderConfig,
    arkesel_endpoint: String,
    twilio_base_url: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    options: DispatchOptions,
}

impl SmsDispatcherBuilder {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            arkesel_endpoint: DEFAULT_ARKESEL_ENDPOINT.to_owned(),
            twilio_base_url: DEFAULT_TWILIO_BASE_URL.to_owned(),
            timeout: None,
            user_agent: None,
            options: DispatchOptions::default(),
        }
    }

    /// Override the Arkesel send endpoint URL.
    pub fn arkesel_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.arkesel_endpoint = endpoint.into();
        self
    }

    /// Override the Twilio API base URL; the Messages resource path is appended to it.
    pub fn twilio_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.twilio_base_url = base_url.into();
        self
    }

    /// Set an HTTP client timeout applied to each provider request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Numbering convention used to normalize recipients without a country code.
    pub fn region(mut self, region: Region) -> Self {
        self.options.region = region;
        self
    }

    /// Opt into [`PhoneValidation::NumberingPlan`] to reject numbers with unassigned country
    /// codes before any provider is called.
    pub fn phone_validation(mut self, validation: PhoneValidation) -> Self {
        self.options.phone_validation = validation;
        self
    }

    pub fn bulk_pacing(mut self, pacing: Duration) -> Self {
        self.options.bulk_pacing = pacing;
        self
    }

    pub fn simulated_latency(mut self, latency: Duration) -> Self {
        self.options.simulated_latency = latency;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.options.failure_policy = policy;
        self
    }

    /// Build a [`SmsDispatcher`].
    ///
    /// Fails if an endpoint override is not a valid URL or the HTTP client cannot be built.
    pub fn build(self) -> Result<SmsDispatcher, SmsError> {
        url::Url::parse(&self.arkesel_endpoint)?;
        url::Url::parse(&self.twilio_base_url)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|err| SmsError::Transport(Box::new(err)))?;

        Ok(SmsDispatcher::assemble(
            &self.config,
            Endpoints {
                arkesel: self.arkesel_endpoint,
                twilio_base: self.twilio_base_url,
            },
            self.options,
            Arc::new(ReqwestTransport { client }),
        ))
    }
}

#[derive(Clone)]
/// Sends SMS through the first working provider: Arkesel, then Twilio, then (when no live
/// provider is configured) the simulated provider.
///
/// Callers always receive a [`SendResult`] / [`BulkSendResult`]; provider errors are logged
/// and folded into the result.
pub struct SmsDispatcher {
    chain: Vec<Provider>,
    simulated: Provider,
    selected: ProviderName,
    endpoints: Endpoints,
    options: DispatchOptions,
    http: Arc<dyn HttpTransport>,
}

impl SmsDispatcher {
    /// Create a dispatcher with default endpoints and timings.
    ///
    /// For more customization, use [`SmsDispatcher::builder`].
    pub fn new(config: &ProviderConfig) -> Self {
        Self::assemble(
            config,
            Endpoints {
                arkesel: DEFAULT_ARKESEL_ENDPOINT.to_owned(),
                twilio_base: DEFAULT_TWILIO_BASE_URL.to_owned(),
            },
            DispatchOptions::default(),
            Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        )
    }

    /// Start building a dispatcher with custom settings.
    pub fn builder(config: ProviderConfig) -> SmsDispatcherBuilder {
        SmsDispatcherBuilder::new(config)
    }

    fn assemble(
        config: &ProviderConfig,
        endpoints: Endpoints,
        options: DispatchOptions,
        http: Arc<dyn HttpTransport>,
    ) -> Self {
        let mut chain = Vec::with_capacity(2);
        if let Some(arkesel) = config.arkesel.clone() {
            chain.push(Provider::Arkesel(arkesel));
        }
        if let Some(twilio) = config.twilio.clone() {
            chain.push(Provider::Twilio(twilio));
        }

        let selected = select_provider(config);
        let available = config.available();
        if available.is_empty() {
            info!(primary = %selected, "no live SMS provider configured; messages are simulated");
        } else {
            info!(?available, primary = %selected, "SMS providers configured");
        }

        Self {
            chain,
            simulated: Provider::Simulated {
                latency: options.simulated_latency,
            },
            selected,
            endpoints,
            options,
            http,
        }
    }

    /// Provider that handles sends first, for display.
    pub fn provider_name(&self) -> ProviderName {
        self.selected
    }

    /// Send `message` to `to`.
    ///
    /// Invalid numbers and messages are rejected before any network call. Live providers are
    /// tried in priority order; see [`FailurePolicy`] for the outcome when all of them fail.
    pub async fn send_sms(&self, to: &str, message: &str) -> SendResult {
        match self.dispatch(to, message).await {
            Ok(result) => result,
            Err(err) => SendResult::failed(self.selected, err.to_string()),
        }
    }

    /// Send `message` to every recipient, one after another, in input order.
    ///
    /// Consecutive sends are separated by the bulk pacing delay. A failed recipient is
    /// recorded and does not stop the batch.
    pub async fn send_bulk_sms<S>(&self, recipients: &[S], message: &str) -> BulkSendResult
    where
        S: AsRef<str>,
    {
        let mut bulk = BulkSendResult::with_capacity(recipients.len());
        for (index, recipient) in recipients.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.options.bulk_pacing).await;
            }
            bulk.push(self.send_sms(recipient.as_ref(), message).await);
        }

        info!(
            total = recipients.len(),
            success = bulk.success,
            failed = bulk.failed,
            "bulk sms finished"
        );
        bulk
    }

    async fn dispatch(&self, to: &str, message: &str) -> Result<SendResult, SmsError> {
        let phone = self
            .options
            .phone_validation
            .check(normalize_in(self.options.region, to))?;
        let text = MessageText::new(message)?;

        let mut last_failure = None;
        for provider in &self.chain {
            let name = provider.name();
            match provider
                .send(self.http.as_ref(), &self.endpoints, &phone, &text)
                .await
            {
                Ok(result) => return Ok(result),
                Err(err) => {
                    warn!(provider = %name, error = %err, "sms provider attempt failed");
                    last_failure = Some(SendResult::failed(name, err.to_string()));
                }
            }
        }

        match last_failure {
            Some(failure) if self.options.failure_policy == FailurePolicy::Report => Ok(failure),
            Some(_) => {
                debug!("all live providers failed; falling back to simulated send");
                self.simulated
                    .send(self.http.as_ref(), &self.endpoints, &phone, &text)
                    .await
            }
            None => {
                self.simulated
                    .send(self.http.as_ref(), &self.endpoints, &phone, &text)
                    .await
            }
        }
    }
}
