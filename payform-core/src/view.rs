//! Static views of the status page.

use serde::Serialize;

use crate::poller::PollState;
use crate::types::PaymentStatus;

/// Title of the card form, also shown while a payment is processing.
pub const FORM_TITLE: &str = "Оплата банковской картой";
pub const SUCCESS_TITLE: &str = "Оплата прошла успешно";
pub const FAILURE_TITLE: &str = "Произошла ошибка";
pub const POLL_ERROR_MESSAGE: &str = "Ошибка при проверке платежа";
pub const INVALID_PARAM_MESSAGE: &str = "Неверный параметр платежа";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusView {
    InProgress,
    Success,
    Failure,
    PollError,
    InvalidParam,
}

impl StatusView {
    pub fn for_state(state: &PollState) -> StatusView {
        match state {
            PollState::Status(PaymentStatus::Processing) => StatusView::InProgress,
            PollState::Status(PaymentStatus::Ok) => StatusView::Success,
            PollState::Status(PaymentStatus::Fail) => StatusView::Failure,
            PollState::Halted(_) => StatusView::PollError,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            StatusView::InProgress => FORM_TITLE,
            StatusView::Success => SUCCESS_TITLE,
            StatusView::Failure => FAILURE_TITLE,
            StatusView::PollError => POLL_ERROR_MESSAGE,
            StatusView::InvalidParam => INVALID_PARAM_MESSAGE,
        }
    }

    /// Views after which nothing on the page changes.
    pub const fn is_final(self) -> bool {
        !matches!(self, StatusView::InProgress)
    }
}
