//! Keystroke formatters for the masked card inputs.

/// Maximum PAN length accepted by the card input.
pub const CARD_NUMBER_MAX_DIGITS: usize = 19;
/// Digits per group in the displayed card number.
pub const CARD_NUMBER_GROUP: usize = 4;
/// `MMYY` digits kept by the expiration input.
pub const EXPIRATION_MAX_DIGITS: usize = 4;
/// Characters kept by the CVV input.
pub const CVV_MAX_LEN: usize = 3;

/// Result of formatting one keystroke: what the input shows and what the
/// form validates and submits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Masked {
    pub display: String,
    pub canonical: String,
}

fn ascii_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Group up to 19 digits by four. The canonical value keeps every digit that
/// was typed so an over-long paste still fails validation.
pub fn format_card_number(raw: &str) -> Masked {
    let digits = ascii_digits(raw);

    let mut display = String::with_capacity(CARD_NUMBER_MAX_DIGITS + 4);
    for (i, c) in digits.chars().take(CARD_NUMBER_MAX_DIGITS).enumerate() {
        if i > 0 && i % CARD_NUMBER_GROUP == 0 {
            display.push(' ');
        }
        display.push(c);
    }

    Masked {
        display,
        canonical: digits,
    }
}

/// Keep four digits and insert `/` after the month once the year starts.
/// Display and canonical values are the same string.
pub fn format_expiration(raw: &str) -> Masked {
    let digits: String = ascii_digits(raw)
        .chars()
        .take(EXPIRATION_MAX_DIGITS)
        .collect();

    let masked = if digits.len() > 2 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits
    };

    Masked {
        display: masked.clone(),
        canonical: masked,
    }
}

/// The CVV input only caps its length.
pub fn format_cvv(raw: &str) -> Masked {
    let value: String = raw.chars().take(CVV_MAX_LEN).collect();
    Masked {
        display: value.clone(),
        canonical: value,
    }
}

/// Hide the middle of a PAN for confirmation screens: `4111 **** **** 1111`.
pub fn mask_pan(pan: &str) -> String {
    let digits = ascii_digits(pan);
    let count = digits.chars().count();
    if count <= 8 {
        return format_card_number(&digits).display;
    }

    let hidden: String = digits
        .chars()
        .enumerate()
        .map(|(i, c)| if i < 4 || i >= count - 4 { c } else { '*' })
        .collect();

    let mut grouped = String::new();
    for (i, c) in hidden.chars().enumerate() {
        if i > 0 && i % CARD_NUMBER_GROUP == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    grouped
}
