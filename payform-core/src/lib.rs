//! Core library for payform: card form validation and masking, payment
//! submission over JSON-RPC and payment status polling.

pub mod config;
pub mod error;
pub mod form;
pub mod format;
pub mod gateway;
pub mod output;
pub mod poller;
pub mod route;
pub mod types;
pub mod validation;
pub mod view;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, GatewayConfig};
pub use error::{PayformError, Result};
pub use form::{PaymentForm, SubmitFailure, SubmitOutcome};
pub use format::{format_card_number, format_expiration, mask_pan, Masked};
pub use gateway::{GatewayError, HttpGateway, PaymentGateway};
pub use output::{field_issues, AgentError, FieldIssue, OutputMode};
pub use poller::{PollState, StatusPage, StatusPoller, POLL_INTERVAL};
pub use route::Route;
pub use types::{CardFormInput, PayParams, PayRequest, PayResponse, PaymentStatus, Pid, StatusReport};
pub use validation::{validate, validate_field, Field, FieldError, ValidationErrors};
pub use view::StatusView;
