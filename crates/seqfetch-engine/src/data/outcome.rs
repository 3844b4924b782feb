/// Position of a fragment in the remote sequence.
pub type FragmentIndex = u64;

/// Classification of a single fragment fetch.
///
/// Fatal conditions are not a variant: they travel as the `Err` side of
/// [`Result<FetchOutcome>`](crate::Result).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The fragment exists and this many bytes were stored.
    Present(u64),

    /// The server reported the fragment missing, or sent an empty body.
    Absent,
}

impl FetchOutcome {
    /// Build an outcome from a byte count, folding empty bodies into [`FetchOutcome::Absent`].
    #[must_use]
    pub fn from_len(len: u64) -> Self {
        if len == 0 { FetchOutcome::Absent } else { FetchOutcome::Present(len) }
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, FetchOutcome::Present(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_absent() {
        assert_eq!(FetchOutcome::from_len(0), FetchOutcome::Absent);
        assert!(!FetchOutcome::from_len(0).is_present());
    }

    #[test]
    fn test_non_empty_body_is_present() {
        assert_eq!(FetchOutcome::from_len(188), FetchOutcome::Present(188));
        assert!(FetchOutcome::Present(1).is_present());
    }
}
