//! Access to the remote payment service.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::{ConfigError, GatewayConfig};
use crate::types::{PayRequest, PayResponse, Pid, StatusReport};

/// Transport or protocol failure of a single call.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment service answered with HTTP {status}")]
    HttpStatus { status: StatusCode },

    #[error("payment service sent an unreadable body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The two calls the client makes against the payment service.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Send a `pay` envelope.
    async fn create_payment(&self, request: &PayRequest) -> Result<PayResponse, GatewayError>;

    /// Ask for the current status of a payment.
    async fn check_status(&self, pid: &Pid) -> Result<StatusReport, GatewayError>;
}

/// [`PaymentGateway`] over HTTP. No request timeout is set.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    config: GatewayConfig,
    rpc_url: Url,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: GatewayConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rpc_url = config.rpc_url()?;
        Ok(Self {
            client,
            config,
            rpc_url,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::HttpStatus { status });
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn create_payment(&self, request: &PayRequest) -> Result<PayResponse, GatewayError> {
        tracing::debug!(url = %self.rpc_url, request_id = %request.id, "sending pay request");
        let response = self
            .client
            .post(self.rpc_url.clone())
            .json(request)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn check_status(&self, pid: &Pid) -> Result<StatusReport, GatewayError> {
        let url = self.config.check_url(pid)?;
        tracing::debug!(%url, %pid, "checking payment status");
        let response = self.client.get(url).send().await?;
        Self::read_json(response).await
    }
}
