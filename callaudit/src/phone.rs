use once_cell::sync::Lazy;
use regex::Regex;

static NON_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\D+").unwrap());

/// Strips everything but digits from a raw phone number.
/// Input with no digits normalizes to an empty string.
pub fn normalize(raw: &str) -> String {
    NON_DIGITS.replace_all(raw, "").into_owned()
}

/// Last 10 digits of the normalized number, used as the national-number
/// comparison key so differing country-code prefixes still match.
/// Numbers with fewer than 10 digits keep whatever digits they have.
pub fn suffix10(raw: &str) -> String {
    let digits = normalize(raw);
    let cut = digits.len().saturating_sub(10);
    digits[cut..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_formatting() {
        assert_eq!(normalize("+1 (555) 123-4567"), "15551234567");
        assert_eq!(normalize("555.123.4567 ext 9"), "55512345679");
        assert_eq!(normalize("anonymous"), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn suffix10_takes_last_ten_digits() {
        assert_eq!(suffix10("+15551234567"), "5551234567");
        assert_eq!(suffix10("5551234567"), "5551234567");
        assert_eq!(suffix10("+44 20 7946 0958"), "2079460958");
    }

    #[test]
    fn suffix10_keeps_short_numbers_whole() {
        assert_eq!(suffix10("123-4567"), "1234567");
        assert_eq!(suffix10("911"), "911");
        assert_eq!(suffix10("no digits"), "");
    }

    #[test]
    fn suffix10_matches_across_country_codes() {
        assert_eq!(suffix10("+15551234567"), suffix10("(555) 123-4567"));
    }
}
