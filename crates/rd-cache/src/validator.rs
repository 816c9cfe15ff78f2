//! Content-stamp validity predicates.

/// Decides at read time whether a stored entry still matches the caller's
/// view of the content.
///
/// Runs independently of TTL: an entry must be both fresh and accepted by
/// the validator to count as a hit.
///
/// Any `Fn(Option<&str>, Option<&str>) -> bool` closure is a validator, taking
/// `(stored, requested)`.
pub trait StampValidator: Send + Sync {
    /// Check a stored stamp against the requested one.
    ///
    /// # Arguments
    ///
    /// * `stored` - Stamp recorded when the entry was inserted
    /// * `requested` - Stamp supplied with the lookup, `None` if the caller has none
    fn is_valid(&self, stored: Option<&str>, requested: Option<&str>) -> bool;
}

/// Default validator: exact string equality.
///
/// A lookup without a stamp accepts any entry. A lookup with a stamp only
/// accepts an entry stored with the same stamp.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactStamp;

impl StampValidator for ExactStamp {
    fn is_valid(&self, stored: Option<&str>, requested: Option<&str>) -> bool {
        match requested {
            None => true,
            Some(requested) => stored == Some(requested),
        }
    }
}

impl<F> StampValidator for F
where
    F: Fn(Option<&str>, Option<&str>) -> bool + Send + Sync,
{
    fn is_valid(&self, stored: Option<&str>, requested: Option<&str>) -> bool {
        self(stored, requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_stamp_without_request_accepts_anything() {
        assert!(ExactStamp.is_valid(None, None));
        assert!(ExactStamp.is_valid(Some("abc"), None));
    }

    #[test]
    fn test_exact_stamp_requires_equal_stamp() {
        assert!(ExactStamp.is_valid(Some("abc"), Some("abc")));
        assert!(!ExactStamp.is_valid(Some("abc"), Some("def")));
        assert!(!ExactStamp.is_valid(None, Some("abc")));
    }

    #[test]
    fn test_closure_validator() {
        let prefix = |stored: Option<&str>, requested: Option<&str>| match (stored, requested) {
            (Some(s), Some(r)) => s.starts_with(r),
            _ => true,
        };
        assert!(prefix.is_valid(Some("abcdef"), Some("abc")));
        assert!(!prefix.is_valid(Some("abcdef"), Some("xyz")));
    }
}
