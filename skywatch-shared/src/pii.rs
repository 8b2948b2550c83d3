use serde::{Serialize, Deserialize, Serializer};
use std::fmt;

/// Wrapper for personal data that keeps it out of log lines.
///
/// Emails render as their first character plus the domain
/// (`a***@example.com`), anything else as `********`. Serialization is
/// untouched so API bodies still carry the real value.
#[derive(Clone, Deserialize)]
pub struct Masked<T>(pub T);

fn mask(raw: &str) -> String {
    match raw.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        _ => "********".to_string(),
    }
}

impl<T: fmt::Display> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", mask(&self.0.to_string()))
    }
}

impl<T: fmt::Display> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", mask(&self.0.to_string()))
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_masking() {
        assert_eq!(Masked("alice@example.com").to_string(), "a***@example.com");
        assert_eq!(format!("{:?}", Masked("bob@x.com".to_string())), "b***@x.com");
    }

    #[test]
    fn test_secret_masking() {
        assert_eq!(Masked("hunter2").to_string(), "********");
        assert_eq!(Masked("@nolocal").to_string(), "********");
    }

    #[test]
    fn test_serialization_keeps_value() {
        let json = serde_json::to_string(&Masked("alice@example.com")).unwrap();
        assert_eq!(json, "\"alice@example.com\"");
        assert_eq!(Masked(5).into_inner(), 5);
    }
}
