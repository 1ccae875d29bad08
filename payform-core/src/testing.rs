//! Scripted gateway shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::time::Instant;

use crate::gateway::{GatewayError, PaymentGateway};
use crate::types::{PayRequest, PayResponse, Pid, StatusReport};

#[derive(Default)]
pub(crate) struct ScriptedGateway {
    statuses: Mutex<VecDeque<Result<StatusReport, GatewayError>>>,
    payments: Mutex<VecDeque<Result<PayResponse, GatewayError>>>,
    status_calls: Mutex<Vec<Instant>>,
    pay_requests: Mutex<Vec<PayRequest>>,
}

impl ScriptedGateway {
    pub(crate) fn always_processing() -> Self {
        Self::default()
    }

    pub(crate) fn with_statuses<'a>(statuses: impl IntoIterator<Item = &'a str>) -> Self {
        let gateway = Self::default();
        for status in statuses {
            gateway.push_status(status);
        }
        gateway
    }

    pub(crate) fn with_pay_result(result: Value) -> Self {
        let gateway = Self::default();
        gateway.push_payment(Ok(serde_json::from_value(result).expect("valid pay response")));
        gateway
    }

    pub(crate) fn push_status(&self, status: &str) {
        self.statuses.lock().unwrap().push_back(Ok(StatusReport {
            status: Some(status.to_string()),
            pid: None,
        }));
    }

    pub(crate) fn push_status_failure(&self) {
        self.statuses
            .lock()
            .unwrap()
            .push_back(Err(GatewayError::HttpStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
            }));
    }

    pub(crate) fn push_payment(&self, result: Result<PayResponse, GatewayError>) {
        self.payments.lock().unwrap().push_back(result);
    }

    pub(crate) fn status_calls(&self) -> Vec<Instant> {
        self.status_calls.lock().unwrap().clone()
    }

    pub(crate) fn pay_requests(&self) -> Vec<PayRequest> {
        self.pay_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn create_payment(&self, request: &PayRequest) -> Result<PayResponse, GatewayError> {
        self.pay_requests.lock().unwrap().push(request.clone());
        self.payments
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(PayResponse::default()))
    }

    async fn check_status(&self, _pid: &Pid) -> Result<StatusReport, GatewayError> {
        self.status_calls.lock().unwrap().push(Instant::now());
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(StatusReport {
                    status: Some("processing".to_string()),
                    pid: None,
                })
            })
    }
}
