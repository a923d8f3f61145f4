//! Phone number masking for the auth screen and dial pad

use regex::Regex;
use std::sync::OnceLock;

fn non_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\D").expect("static pattern"))
}

/// Digits only
pub fn digits(input: &str) -> String {
    non_digits().replace_all(input, "").into_owned()
}

/// Mask a phone number as `+D (DDD) DDD-DD-DD`, growing with the digit count.
/// Digits past the eleventh are dropped.
pub fn format_phone(input: &str) -> String {
    let d: Vec<char> = digits(input).chars().take(11).collect();
    let part = |from: usize, to: usize| -> String { d[from..to.min(d.len())].iter().collect() };

    match d.len() {
        0 => String::new(),
        1 => format!("+{}", d[0]),
        2..=4 => format!("+{} ({}", d[0], part(1, 4)),
        5..=7 => format!("+{} ({}) {}", d[0], part(1, 4), part(4, 7)),
        8..=9 => format!("+{} ({}) {}-{}", d[0], part(1, 4), part(4, 7), part(7, 9)),
        _ => format!(
            "+{} ({}) {}-{}-{}",
            d[0],
            part(1, 4),
            part(4, 7),
            part(7, 9),
            part(9, 11)
        ),
    }
}

/// The form sent to the backend: `+` followed by the digits
pub fn clean_phone(input: &str) -> String {
    format!("+{}", digits(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone_by_length() {
        assert_eq!(format_phone(""), "");
        assert_eq!(format_phone("abc"), "");
        assert_eq!(format_phone("7"), "+7");
        assert_eq!(format_phone("79"), "+7 (9");
        assert_eq!(format_phone("7999"), "+7 (999");
        assert_eq!(format_phone("79991"), "+7 (999) 1");
        assert_eq!(format_phone("7999123"), "+7 (999) 123");
        assert_eq!(format_phone("79991234"), "+7 (999) 123-4");
        assert_eq!(format_phone("799912345"), "+7 (999) 123-45");
        assert_eq!(format_phone("7999123456"), "+7 (999) 123-45-6");
        assert_eq!(format_phone("79991234567"), "+7 (999) 123-45-67");
    }

    #[test]
    fn test_format_phone_drops_extra_digits() {
        assert_eq!(format_phone("799912345678"), "+7 (999) 123-45-67");
    }

    #[test]
    fn test_reformatting_masked_value_is_stable() {
        let masked = format_phone("79991234567");
        assert_eq!(format_phone(&masked), masked);
        // typing one more digit into a partially masked value
        assert_eq!(format_phone("+7 (999) 12"), "+7 (999) 12");
        assert_eq!(format_phone("+7 (999) 123-4"), "+7 (999) 123-4");
    }

    #[test]
    fn test_clean_phone() {
        assert_eq!(clean_phone("+7 (999) 123-45-67"), "+79991234567");
        assert_eq!(clean_phone(""), "+");
    }
}
