//! Field rules for the card form.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::Serialize;
use thiserror::Error;

use crate::types::CardFormInput;

pub const CARD_NUMBER_MIN_LEN: usize = 13;
pub const CARD_NUMBER_MAX_LEN: usize = 19;
pub const CVV_LEN: usize = 3;
pub const FULL_NAME_MIN_LEN: usize = 2;
/// Accepted two-digit expiration years, inclusive.
pub const EXPIRATION_YEAR_MIN: u32 = 21;
pub const EXPIRATION_YEAR_MAX: u32 = 26;

/// Form fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    CardNumber,
    Expiration,
    Cvv,
    FullName,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::CardNumber,
        Field::Expiration,
        Field::Cvv,
        Field::FullName,
    ];

    /// Stable identifier used in JSON output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Field::CardNumber => "cardNumber",
            Field::Expiration => "expiration",
            Field::Cvv => "cvv",
            Field::FullName => "fullName",
        }
    }

    /// Label shown above the input.
    pub const fn label(self) -> &'static str {
        match self {
            Field::CardNumber => "Номер карты",
            Field::Expiration => "Месяц/Год",
            Field::Cvv => "Код",
            Field::FullName => "Владелец карты",
        }
    }

    pub const fn placeholder(self) -> &'static str {
        match self {
            Field::CardNumber => "0000 0000 0000 0000",
            Field::Expiration => "MM/YY",
            Field::Cvv => "***",
            Field::FullName => "IVAN IVANOV",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failed rule. The display text is what the user sees.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("Номер карты должен содержать от 13 до 19 цифр")]
    CardNumberLength,
    #[error("Номер карты должен содержать только цифры")]
    CardNumberDigits,
    #[error("CVV должен содержать ровно 3 цифры")]
    Cvv,
    #[error("Введите дату в формате MM/YY")]
    ExpirationFormat,
    #[error("Неверный срок действия карты")]
    ExpirationRange,
    #[error("Введите имя и фамилию")]
    FullNameTooShort,
    #[error("Имя может содержать только буквы и пробелы")]
    FullNameCharacters,
    #[error("Требуется ровно два слова (имя и фамилия)")]
    FullNameWordCount,
}

/// Field-to-error mapping produced by a failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<Field, FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.0.get(&field).copied()
    }

    pub fn set(&mut self, field: Field, error: Option<FieldError>) {
        match error {
            Some(error) => {
                self.0.insert(field, error);
            }
            None => {
                self.0.remove(&field);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
        self.0.iter().map(|(field, error)| (*field, *error))
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, error) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

type FieldValidator = fn(&CardFormInput) -> Option<FieldError>;

const VALIDATORS: [(Field, FieldValidator); 4] = [
    (Field::CardNumber, check_card_number),
    (Field::Expiration, check_expiration),
    (Field::Cvv, check_cvv),
    (Field::FullName, check_full_name),
];

/// Run every field rule. All fields are checked even after a failure.
pub fn validate(input: &CardFormInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    for (field, check) in VALIDATORS {
        errors.set(field, check(input));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Run the rules of one field.
pub fn validate_field(field: Field, input: &CardFormInput) -> Option<FieldError> {
    VALIDATORS
        .iter()
        .find(|(candidate, _)| *candidate == field)
        .and_then(|(_, check)| check(input))
}

fn all_ascii_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

fn check_card_number(input: &CardFormInput) -> Option<FieldError> {
    let len = input.card_number.chars().count();
    if !(CARD_NUMBER_MIN_LEN..=CARD_NUMBER_MAX_LEN).contains(&len) {
        return Some(FieldError::CardNumberLength);
    }
    if !all_ascii_digits(&input.card_number) {
        return Some(FieldError::CardNumberDigits);
    }
    None
}

fn check_cvv(input: &CardFormInput) -> Option<FieldError> {
    if input.cvv.len() == CVV_LEN && all_ascii_digits(&input.cvv) {
        None
    } else {
        Some(FieldError::Cvv)
    }
}

/// `MM/YY` with two ASCII digits on each side of the slash.
fn parse_expiration(value: &str) -> Option<(u32, u32)> {
    let (month, year) = value.split_once('/')?;
    if month.len() != 2 || year.len() != 2 || !all_ascii_digits(month) || !all_ascii_digits(year)
    {
        return None;
    }
    Some((month.parse().ok()?, year.parse().ok()?))
}

fn check_expiration(input: &CardFormInput) -> Option<FieldError> {
    let Some((month, year)) = parse_expiration(&input.expiration) else {
        return Some(FieldError::ExpirationFormat);
    };
    if (1..=12).contains(&month) && (EXPIRATION_YEAR_MIN..=EXPIRATION_YEAR_MAX).contains(&year) {
        None
    } else {
        Some(FieldError::ExpirationRange)
    }
}

/// Latin and Cyrillic letters, including `ё`/`Ё`.
fn is_name_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
        || ('а'..='я').contains(&c)
        || ('А'..='Я').contains(&c)
        || c == 'ё'
        || c == 'Ё'
}

/// Split a cardholder name into first and last name. Only exactly two
/// whitespace-separated words qualify.
pub fn split_full_name(value: &str) -> Option<(&str, &str)> {
    let mut words = value.split_whitespace();
    let first = words.next()?;
    let last = words.next()?;
    if words.next().is_some() {
        return None;
    }
    Some((first, last))
}

fn check_full_name(input: &CardFormInput) -> Option<FieldError> {
    let name = &input.full_name;
    if name.chars().count() < FULL_NAME_MIN_LEN {
        return Some(FieldError::FullNameTooShort);
    }
    if !name.chars().all(|c| is_name_letter(c) || c.is_whitespace()) {
        return Some(FieldError::FullNameCharacters);
    }
    if split_full_name(name).is_none() {
        return Some(FieldError::FullNameWordCount);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> CardFormInput {
        CardFormInput {
            card_number: "4111111111111111".to_string(),
            cvv: "123".to_string(),
            expiration: "12/25".to_string(),
            full_name: "Ivan Petrov".to_string(),
        }
    }

    #[test]
    fn accepts_reference_card() {
        assert!(validate(&valid_input()).is_ok());
    }

    #[test]
    fn accepts_cyrillic_name() {
        let input = CardFormInput {
            full_name: "Пётр Ёжиков".to_string(),
            ..valid_input()
        };
        assert!(validate(&input).is_ok());
    }

    #[test]
    fn rejects_month_out_of_range() {
        let input = CardFormInput {
            expiration: "13/25".to_string(),
            ..valid_input()
        };
        assert_eq!(
            validate_field(Field::Expiration, &input),
            Some(FieldError::ExpirationRange)
        );
        let zero = CardFormInput {
            expiration: "00/25".to_string(),
            ..valid_input()
        };
        assert_eq!(
            validate_field(Field::Expiration, &zero),
            Some(FieldError::ExpirationRange)
        );
    }

    #[test]
    fn rejects_year_outside_window() {
        for expiration in ["12/20", "12/27"] {
            let input = CardFormInput {
                expiration: expiration.to_string(),
                ..valid_input()
            };
            assert_eq!(
                validate_field(Field::Expiration, &input),
                Some(FieldError::ExpirationRange),
                "{expiration}"
            );
        }
        for expiration in ["01/21", "12/26"] {
            let input = CardFormInput {
                expiration: expiration.to_string(),
                ..valid_input()
            };
            assert_eq!(validate_field(Field::Expiration, &input), None);
        }
    }

    #[test]
    fn rejects_unmasked_expiration() {
        for expiration in ["1225", "1/25", "12/2", "ab/cd", ""] {
            let input = CardFormInput {
                expiration: expiration.to_string(),
                ..valid_input()
            };
            assert_eq!(
                validate_field(Field::Expiration, &input),
                Some(FieldError::ExpirationFormat),
                "{expiration}"
            );
        }
    }

    #[test]
    fn rejects_single_and_triple_word_names() {
        for name in ["Ivan", "Ivan Petrov Sidorov"] {
            let input = CardFormInput {
                full_name: name.to_string(),
                ..valid_input()
            };
            assert_eq!(
                validate_field(Field::FullName, &input),
                Some(FieldError::FullNameWordCount),
                "{name}"
            );
        }
    }

    #[test]
    fn name_rules_apply_in_order() {
        let short = CardFormInput {
            full_name: "I".to_string(),
            ..valid_input()
        };
        assert_eq!(
            validate_field(Field::FullName, &short),
            Some(FieldError::FullNameTooShort)
        );

        let digits = CardFormInput {
            full_name: "Ivan P3trov".to_string(),
            ..valid_input()
        };
        assert_eq!(
            validate_field(Field::FullName, &digits),
            Some(FieldError::FullNameCharacters)
        );
    }

    #[test]
    fn name_allows_surrounding_whitespace() {
        let input = CardFormInput {
            full_name: "  Ivan   Petrov ".to_string(),
            ..valid_input()
        };
        assert_eq!(validate_field(Field::FullName, &input), None);
        assert_eq!(split_full_name(&input.full_name), Some(("Ivan", "Petrov")));
    }

    #[test]
    fn card_number_length_checked_before_digits() {
        let short = CardFormInput {
            card_number: "4111".to_string(),
            ..valid_input()
        };
        assert_eq!(
            validate_field(Field::CardNumber, &short),
            Some(FieldError::CardNumberLength)
        );

        let letters = CardFormInput {
            card_number: "4111x11111111111".to_string(),
            ..valid_input()
        };
        assert_eq!(
            validate_field(Field::CardNumber, &letters),
            Some(FieldError::CardNumberDigits)
        );
    }

    #[test]
    fn card_number_bounds_are_inclusive() {
        for len in [13, 19] {
            let input = CardFormInput {
                card_number: "4".repeat(len),
                ..valid_input()
            };
            assert_eq!(validate_field(Field::CardNumber, &input), None);
        }
        for len in [12, 20] {
            let input = CardFormInput {
                card_number: "4".repeat(len),
                ..valid_input()
            };
            assert!(validate_field(Field::CardNumber, &input).is_some());
        }
    }

    #[test]
    fn cvv_must_be_three_digits() {
        for cvv in ["12", "1234", "12a", ""] {
            let input = CardFormInput {
                cvv: cvv.to_string(),
                ..valid_input()
            };
            assert_eq!(validate_field(Field::Cvv, &input), Some(FieldError::Cvv));
        }
    }

    #[test]
    fn every_field_is_reported() {
        let errors = validate(&CardFormInput::default()).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors.get(Field::CardNumber),
            Some(FieldError::CardNumberLength)
        );
        assert_eq!(errors.get(Field::FullName), Some(FieldError::FullNameTooShort));
    }

    #[test]
    fn error_text_is_user_facing() {
        assert_eq!(
            FieldError::Cvv.to_string(),
            "CVV должен содержать ровно 3 цифры"
        );
    }
}
