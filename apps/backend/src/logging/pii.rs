use std::fmt;

/// Masks an email address for logs: keeps the first character of the local
/// part and the full domain. Anything without an `@` is fully masked.
pub fn redact_email(input: &str) -> String {
    match input.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        _ if input.is_empty() => String::new(),
        _ => "***".to_string(),
    }
}

/// Display wrapper for a possibly sensitive address.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", redact_email(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", redact_email(self.0))
    }
}
