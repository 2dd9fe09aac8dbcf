//! Reference numbers for new journal entries.
//!
//! References look like `JE-000042`. The next number is one past the
//! highest numeric suffix already in use; references that do not follow
//! the pattern are ignored when numbering but still count for uniqueness.

use super::error::JournalError;

/// Generates and checks entry references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceGenerator {
    prefix: String,
    width: usize,
}

impl Default for ReferenceGenerator {
    fn default() -> Self {
        Self::new("JE-", 6)
    }
}

impl ReferenceGenerator {
    /// Creates a generator with a custom prefix and zero-padded width.
    #[must_use]
    pub fn new(prefix: impl Into<String>, width: usize) -> Self {
        Self {
            prefix: prefix.into(),
            width,
        }
    }

    /// Formats reference number `n`.
    #[must_use]
    pub fn format(&self, n: u64) -> String {
        format!("{}{:0width$}", self.prefix, n, width = self.width)
    }

    /// Extracts the sequence number of a reference with this prefix.
    #[must_use]
    pub fn sequence_of(&self, reference: &str) -> Option<u64> {
        let reference = reference.trim();
        let head = reference.get(..self.prefix.len())?;
        if !head.eq_ignore_ascii_case(&self.prefix) {
            return None;
        }
        let digits = &reference[self.prefix.len()..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Suggests the next free reference given the ones already in use.
    #[must_use]
    pub fn next<'a, I>(&self, existing: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        let highest = existing
            .into_iter()
            .filter_map(|r| self.sequence_of(r))
            .max()
            .unwrap_or(0);
        self.format(highest.saturating_add(1))
    }

    /// Fails if `candidate` matches an existing reference, ignoring case
    /// and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// `DuplicateReference` with the trimmed candidate.
    pub fn ensure_unique<'a, I>(candidate: &str, existing: I) -> Result<(), JournalError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let candidate = candidate.trim();
        if existing
            .into_iter()
            .any(|r| r.trim().eq_ignore_ascii_case(candidate))
        {
            return Err(JournalError::DuplicateReference(candidate.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_first_reference() {
        let generator = ReferenceGenerator::default();
        assert_eq!(generator.next(std::iter::empty()), "JE-000001");
    }

    #[test]
    fn test_next_skips_past_highest() {
        let generator = ReferenceGenerator::default();
        let existing = ["JE-000003", "je-000010", "INV-99", "JE-000007"];
        assert_eq!(generator.next(existing), "JE-000011");
    }

    #[rstest]
    #[case("JE-000042", Some(42))]
    #[case(" je-7 ", Some(7))]
    #[case("JE-", None)]
    #[case("JE-12a", None)]
    #[case("AP-000001", None)]
    #[case("J", None)]
    fn test_sequence_of(#[case] reference: &str, #[case] expected: Option<u64>) {
        assert_eq!(ReferenceGenerator::default().sequence_of(reference), expected);
    }

    #[test]
    fn test_custom_prefix() {
        let generator = ReferenceGenerator::new("ADJ/", 4);
        assert_eq!(generator.next(["ADJ/0009"]), "ADJ/0010");
    }

    #[test]
    fn test_duplicate_reference_is_case_insensitive() {
        let err = ReferenceGenerator::ensure_unique(" je-000001", ["JE-000001"]).unwrap_err();
        assert_eq!(err, JournalError::DuplicateReference("je-000001".to_string()));
        assert!(ReferenceGenerator::ensure_unique("JE-000002", ["JE-000001"]).is_ok());
    }
}
