//! Phone number normalization.
//!
//! All phones are stored in canonical `+`-prefixed E.164 form. Inbound
//! webhook traffic and admin-typed numbers arrive in whatever shape the
//! sender's address book produced, so profile lookups expand a number into
//! the set of variants that may have been stored.

/// Strips everything but digits from a phone number.
pub fn digits_only(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalizes a phone number to canonical `+`-prefixed form.
///
/// A leading local `0` is rewritten to the Israeli country code, matching
/// how family members type local numbers.
pub fn canonicalize(phone: &str) -> String {
    let digits = digits_only(phone);
    if let Some(rest) = digits.strip_prefix('0') {
        format!("+972{rest}")
    } else {
        format!("+{digits}")
    }
}

/// Ensures a `+` prefix without further rewriting.
pub fn with_plus(phone: &str) -> String {
    if phone.starts_with('+') {
        phone.to_string()
    } else {
        format!("+{phone}")
    }
}

/// Expands a phone number into lookup variants tolerating stored formatting
/// differences: raw digits, `+`-prefixed, leading-1-stripped and
/// leading-972-stripped forms, each with and without the `+` prefix.
pub fn lookup_variants(phone: &str) -> Vec<String> {
    let digits = digits_only(phone);
    let mut bases = vec![digits.clone()];

    if let Some(rest) = digits.strip_prefix('1') {
        bases.push(rest.to_string());
    }
    if let Some(rest) = digits.strip_prefix("972") {
        bases.push(rest.to_string());
    }

    let mut variants = Vec::new();
    for base in bases {
        if base.is_empty() {
            continue;
        }
        if !variants.contains(&base) {
            variants.push(base.clone());
        }
        let plussed = format!("+{base}");
        if !variants.contains(&plussed) {
            variants.push(plussed);
        }
    }
    variants
}

/// Strips the messaging channel prefix (`whatsapp:`) from a webhook sender.
pub fn strip_channel_prefix(from: &str) -> &str {
    from.strip_prefix("whatsapp:").unwrap_or(from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("+1 (555) 123-4567"), "15551234567");
        assert_eq!(digits_only("whatsapp:+972501234567"), "972501234567");
    }

    #[test]
    fn test_canonicalize_plain_international() {
        assert_eq!(canonicalize("15551234567"), "+15551234567");
        assert_eq!(canonicalize("+15551234567"), "+15551234567");
    }

    #[test]
    fn test_canonicalize_local_israeli() {
        assert_eq!(canonicalize("0501234567"), "+972501234567");
    }

    #[test]
    fn test_with_plus() {
        assert_eq!(with_plus("15551234567"), "+15551234567");
        assert_eq!(with_plus("+15551234567"), "+15551234567");
    }

    #[test]
    fn test_lookup_variants_us_number() {
        let variants = lookup_variants("+15551234567");
        assert!(variants.contains(&"15551234567".to_string()));
        assert!(variants.contains(&"+15551234567".to_string()));
        // Leading-1 stripped form for numbers stored without country code
        assert!(variants.contains(&"5551234567".to_string()));
        assert!(variants.contains(&"+5551234567".to_string()));
    }

    #[test]
    fn test_lookup_variants_israeli_number() {
        let variants = lookup_variants("+972501234567");
        assert!(variants.contains(&"972501234567".to_string()));
        assert!(variants.contains(&"501234567".to_string()));
    }

    #[test]
    fn test_lookup_variants_no_duplicates() {
        let variants = lookup_variants("+972501234567");
        let unique: std::collections::HashSet<_> = variants.iter().collect();
        assert_eq!(unique.len(), variants.len());
    }

    #[test]
    fn test_strip_channel_prefix() {
        assert_eq!(strip_channel_prefix("whatsapp:+15551234567"), "+15551234567");
        assert_eq!(strip_channel_prefix("+15551234567"), "+15551234567");
    }
}
