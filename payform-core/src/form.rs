//! The card form: field state, live validation and submission.

use thiserror::Error;

use crate::format::{format_card_number, format_cvv, format_expiration, Masked};
use crate::gateway::{GatewayError, PaymentGateway};
use crate::route::Route;
use crate::types::{CardFormInput, PayParams, PayRequest, PayResponse};
use crate::validation::{self, split_full_name, Field, FieldError, ValidationErrors};

pub const SUBMIT_LABEL: &str = "Оплатить";
pub const SUBMIT_BUSY_LABEL: &str = "Отправка...";

/// Why a valid form did not lead to a status page. The display text is the
/// blocking notification shown to the user.
#[derive(Debug, Error)]
pub enum SubmitFailure {
    #[error("Ошибка оплаты: PID не получен")]
    MissingPid,

    #[error("Произошла ошибка при оплате")]
    Gateway(#[source] GatewayError),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Rejected(ValidationErrors),
    /// Navigate to the status page of the new payment.
    Accepted(Route),
    Failed(SubmitFailure),
    /// A submission is already in flight; nothing was sent.
    Busy,
}

impl SubmitOutcome {
    pub fn route(&self) -> Option<&Route> {
        match self {
            SubmitOutcome::Accepted(route) => Some(route),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct PaymentForm {
    card_number: Masked,
    expiration: Masked,
    cvv: String,
    full_name: String,
    errors: ValidationErrors,
    submit_attempted: bool,
    submitting: bool,
}

impl PaymentForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill every field at once, as if each value had been pasted.
    pub fn from_input(input: &CardFormInput) -> Self {
        let mut form = Self::new();
        form.card_number = format_card_number(&input.card_number);
        form.expiration = format_expiration(&input.expiration);
        form.cvv = input.cvv.clone();
        form.full_name = input.full_name.clone();
        form
    }

    /// Masked card inputs validate on every keystroke.
    pub fn input_card_number(&mut self, raw: &str) -> &str {
        self.card_number = format_card_number(raw);
        self.revalidate(Field::CardNumber);
        &self.card_number.display
    }

    pub fn input_expiration(&mut self, raw: &str) -> &str {
        self.expiration = format_expiration(raw);
        self.revalidate(Field::Expiration);
        &self.expiration.display
    }

    /// Plain inputs validate on change only once a submit was attempted.
    pub fn input_cvv(&mut self, raw: &str) -> &str {
        self.cvv = format_cvv(raw).canonical;
        if self.submit_attempted {
            self.revalidate(Field::Cvv);
        }
        &self.cvv
    }

    pub fn input_full_name(&mut self, raw: &str) -> &str {
        self.full_name = raw.to_string();
        if self.submit_attempted {
            self.revalidate(Field::FullName);
        }
        &self.full_name
    }

    /// Values the schema sees: unmasked card digits, masked expiration.
    pub fn values(&self) -> CardFormInput {
        CardFormInput {
            card_number: self.card_number.canonical.clone(),
            cvv: self.cvv.clone(),
            expiration: self.expiration.canonical.clone(),
            full_name: self.full_name.clone(),
        }
    }

    /// What the input for `field` currently shows.
    pub fn display(&self, field: Field) -> &str {
        match field {
            Field::CardNumber => &self.card_number.display,
            Field::Expiration => &self.expiration.display,
            Field::Cvv => &self.cvv,
            Field::FullName => &self.full_name,
        }
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<FieldError> {
        self.errors.get(field)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submit_label(&self) -> &'static str {
        if self.submitting {
            SUBMIT_BUSY_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    fn revalidate(&mut self, field: Field) {
        let values = self.values();
        self.errors.set(field, validation::validate_field(field, &values));
    }

    /// Validate every field and build the `pay` envelope with a fresh id.
    pub fn prepare(&mut self) -> Result<PayRequest, ValidationErrors> {
        self.submit_attempted = true;
        let values = self.values();
        if let Err(errors) = validation::validate(&values) {
            self.errors = errors.clone();
            return Err(errors);
        }
        self.errors = ValidationErrors::default();

        let Some((first, last)) = split_full_name(&values.full_name) else {
            let mut errors = ValidationErrors::default();
            errors.set(Field::FullName, Some(FieldError::FullNameWordCount));
            self.errors = errors.clone();
            return Err(errors);
        };

        Ok(PayRequest::new(PayParams {
            pan: values.card_number,
            expire: values.expiration,
            cardholder: format!("{first} {last}"),
            cvc: values.cvv,
        }))
    }

    /// Validate and mark the form busy. The returned envelope must be settled
    /// with [`PaymentForm::finish_submit`].
    pub fn start_submit(&mut self) -> Result<PayRequest, SubmitOutcome> {
        if self.submitting {
            tracing::debug!("submission already in flight");
            return Err(SubmitOutcome::Busy);
        }
        let request = self.prepare().map_err(|errors| {
            tracing::debug!(invalid_fields = errors.len(), "submission blocked by validation");
            SubmitOutcome::Rejected(errors)
        })?;
        self.submitting = true;
        Ok(request)
    }

    /// Settle an in-flight submission with the service's answer.
    pub fn finish_submit(
        &mut self,
        request: &PayRequest,
        result: Result<PayResponse, GatewayError>,
    ) -> SubmitOutcome {
        self.submitting = false;
        match result {
            Ok(response) => match response.pid() {
                Some(pid) => {
                    tracing::info!(request_id = %request.id, %pid, "payment created");
                    SubmitOutcome::Accepted(Route::Status(pid))
                }
                None => {
                    match &response.error {
                        Some(rpc) => tracing::warn!(
                            request_id = %request.id,
                            code = rpc.code,
                            message = %rpc.message,
                            "payment service returned an error"
                        ),
                        None => tracing::warn!(
                            request_id = %request.id,
                            "payment response carried no pid"
                        ),
                    }
                    SubmitOutcome::Failed(SubmitFailure::MissingPid)
                }
            },
            Err(err) => {
                tracing::warn!(request_id = %request.id, error = %err, "payment request failed");
                SubmitOutcome::Failed(SubmitFailure::Gateway(err))
            }
        }
    }

    /// Validate, send the payment and decide where to go next. No retry is
    /// attempted on failure. Dropping the future mid-request leaves the form
    /// idle again.
    pub async fn submit<G>(&mut self, gateway: &G) -> SubmitOutcome
    where
        G: PaymentGateway + ?Sized,
    {
        let request = match self.start_submit() {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };

        let result = {
            let _in_flight = InFlight(&mut self.submitting);
            gateway.create_payment(&request).await
        };
        self.finish_submit(&request, result)
    }
}

/// Clears the busy flag when the request future goes away, finished or not.
struct InFlight<'a>(&'a mut bool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGateway;
    use crate::types::Pid;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::time::Duration;

    use crate::types::StatusReport;

    /// A service that accepts the request and never answers.
    struct StalledGateway;

    #[async_trait]
    impl PaymentGateway for StalledGateway {
        async fn create_payment(&self, _request: &PayRequest) -> Result<PayResponse, GatewayError> {
            std::future::pending().await
        }

        async fn check_status(&self, _pid: &Pid) -> Result<StatusReport, GatewayError> {
            std::future::pending().await
        }
    }

    fn filled_form() -> PaymentForm {
        let mut form = PaymentForm::new();
        form.input_card_number("4111 1111 1111 1111");
        form.input_expiration("1225");
        form.input_cvv("123");
        form.input_full_name("  Ivan   Petrov ");
        form
    }

    #[tokio::test]
    async fn pid_navigates_to_status_page() {
        let gateway = ScriptedGateway::with_pay_result(json!({"result": {"pid": "abc123"}}));
        let mut form = filled_form();

        let outcome = form.submit(&gateway).await;
        let route = outcome.route().expect("should navigate");
        assert_eq!(route, &Route::Status(Pid::new("abc123").unwrap()));
        assert_eq!(route.path().as_deref(), Some("/abc123"));
        assert!(!form.is_submitting());
        assert_eq!(form.submit_label(), SUBMIT_LABEL);

        let requests = gateway.pay_requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.jsonrpc, "2.0");
        assert_eq!(request.method, "pay");
        assert_eq!(
            request.params,
            PayParams {
                pan: "4111111111111111".to_string(),
                expire: "12/25".to_string(),
                cardholder: "Ivan Petrov".to_string(),
                cvc: "123".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn missing_pid_is_a_blocking_failure() {
        let gateway = ScriptedGateway::with_pay_result(json!({"result": {}}));
        let mut form = filled_form();

        let outcome = form.submit(&gateway).await;
        assert!(outcome.route().is_none());
        match outcome {
            SubmitOutcome::Failed(failure @ SubmitFailure::MissingPid) => {
                assert_eq!(failure.to_string(), "Ошибка оплаты: PID не получен");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_keeps_user_on_form() {
        let gateway = ScriptedGateway::default();
        gateway.push_payment(Err(GatewayError::HttpStatus {
            status: StatusCode::BAD_GATEWAY,
        }));
        let mut form = filled_form();

        match form.submit(&gateway).await {
            SubmitOutcome::Failed(failure @ SubmitFailure::Gateway(_)) => {
                assert_eq!(failure.to_string(), "Произошла ошибка при оплате");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!form.is_submitting());
        assert_eq!(form.display(Field::CardNumber), "4111 1111 1111 1111");
    }

    #[tokio::test]
    async fn invalid_form_sends_nothing() {
        let gateway = ScriptedGateway::with_pay_result(json!({"result": {"pid": "abc123"}}));
        let mut form = filled_form();
        form.input_full_name("Ivan");
        form.input_expiration("1320");

        match form.submit(&gateway).await {
            SubmitOutcome::Rejected(errors) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors.get(Field::FullName), Some(FieldError::FullNameWordCount));
                assert_eq!(errors.get(Field::Expiration), Some(FieldError::ExpirationRange));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(gateway.pay_requests().is_empty());
        assert_eq!(form.errors().len(), 2);
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn retry_after_failure_uses_new_request_id() {
        let gateway = ScriptedGateway::with_pay_result(json!({"result": {}}));
        gateway.push_payment(Ok(serde_json::from_value(json!({"result": {"pid": "p2"}})).unwrap()));
        let mut form = filled_form();

        assert!(form.submit(&gateway).await.route().is_none());
        assert!(form.submit(&gateway).await.route().is_some());

        let requests = gateway.pay_requests();
        assert_eq!(requests.len(), 2);
        assert_ne!(requests[0].id, requests[1].id);
    }

    #[test]
    fn masked_inputs_validate_on_change() {
        let mut form = PaymentForm::new();
        assert_eq!(form.input_card_number("4111"), "4111");
        assert_eq!(form.error(Field::CardNumber), Some(FieldError::CardNumberLength));

        form.input_card_number("4111111111111111");
        assert_eq!(form.error(Field::CardNumber), None);

        assert_eq!(form.input_expiration("13"), "13");
        assert_eq!(form.error(Field::Expiration), Some(FieldError::ExpirationFormat));
        assert_eq!(form.input_expiration("1226"), "12/26");
        assert_eq!(form.error(Field::Expiration), None);
    }

    #[test]
    fn plain_inputs_validate_after_first_submit() {
        let mut form = PaymentForm::new();
        form.input_cvv("1");
        form.input_full_name("I");
        assert!(form.error(Field::Cvv).is_none());
        assert!(form.error(Field::FullName).is_none());

        assert!(form.prepare().is_err());
        assert_eq!(form.error(Field::Cvv), Some(FieldError::Cvv));

        form.input_cvv("123");
        assert_eq!(form.error(Field::Cvv), None);
        form.input_full_name("Ivan Petrov");
        assert_eq!(form.error(Field::FullName), None);
    }

    #[test]
    fn cvv_input_is_capped() {
        let mut form = PaymentForm::new();
        assert_eq!(form.input_cvv("12345"), "123");
    }

    #[test]
    fn from_input_masks_card_fields() {
        let form = PaymentForm::from_input(&CardFormInput {
            card_number: "4111111111111111".to_string(),
            cvv: "123".to_string(),
            expiration: "1225".to_string(),
            full_name: "Ivan Petrov".to_string(),
        });
        assert_eq!(form.display(Field::CardNumber), "4111 1111 1111 1111");
        assert_eq!(form.values().expiration, "12/25");
        assert!(form.errors().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_submission_leaves_form_idle() {
        let mut form = filled_form();

        let cancelled =
            tokio::time::timeout(Duration::from_secs(5), form.submit(&StalledGateway)).await;
        assert!(cancelled.is_err());
        assert!(!form.is_submitting());
        assert_eq!(form.submit_label(), SUBMIT_LABEL);

        let gateway = ScriptedGateway::with_pay_result(json!({"result": {"pid": "abc123"}}));
        assert!(form.submit(&gateway).await.route().is_some());
        assert_eq!(gateway.pay_requests().len(), 1);
    }

    #[test]
    fn started_submission_is_busy_until_settled() {
        let mut form = filled_form();
        let request = form.start_submit().expect("form is valid");
        assert!(form.is_submitting());
        assert_eq!(form.submit_label(), SUBMIT_BUSY_LABEL);
        assert!(matches!(form.start_submit(), Err(SubmitOutcome::Busy)));

        let response = serde_json::from_value(json!({"result": {"pid": "abc123"}})).unwrap();
        let outcome = form.finish_submit(&request, Ok(response));
        assert!(outcome.route().is_some());
        assert!(!form.is_submitting());
        assert_eq!(form.submit_label(), SUBMIT_LABEL);
    }
}
