use once_cell::sync::Lazy;
use regex::Regex;

static CAMEL_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_\-\s]+").unwrap());

/// Turns raw column identifiers into human-facing display names.
pub trait Humanizer {
    fn humanize(&self, raw: &str) -> String;
}

/// Default humanizer: `created_at` -> `Created At`, `customerId` -> `Customer ID`.
///
/// Input with no alphanumeric characters is returned unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleHumanizer;

impl Humanizer for SimpleHumanizer {
    fn humanize(&self, raw: &str) -> String {
        if !raw.chars().any(char::is_alphanumeric) {
            return raw.to_string();
        }

        let spaced = CAMEL_BOUNDARY.replace_all(raw, "$1 $2");
        SEPARATORS
            .split(&spaced)
            .filter(|word| !word.is_empty())
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn capitalize(word: &str) -> String {
    if word.eq_ignore_ascii_case("id") {
        return "ID".to_string();
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_and_kebab_case() {
        let h = SimpleHumanizer;
        assert_eq!(h.humanize("created_at"), "Created At");
        assert_eq!(h.humanize("order-total"), "Order Total");
        assert_eq!(h.humanize("customer_id"), "Customer ID");
    }

    #[test]
    fn camel_case() {
        assert_eq!(SimpleHumanizer.humanize("customerId"), "Customer ID");
        assert_eq!(SimpleHumanizer.humanize("sum2Total"), "Sum2 Total");
    }

    #[test]
    fn unrecognizable_input_is_unchanged() {
        assert_eq!(SimpleHumanizer.humanize("?column?"), "?column?");
        assert_eq!(SimpleHumanizer.humanize("--"), "--");
        assert_eq!(SimpleHumanizer.humanize(""), "");
    }
}
