use crate::config::CollectBounds;
use pairs_vector_store::count_whitespace_tokens;

/// Why a pair was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RejectReason {
    TooShort,
    TooLong,
    TooManyChars,
}

impl RejectReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RejectReason::TooShort => "too_short",
            RejectReason::TooLong => "too_long",
            RejectReason::TooManyChars => "too_many_chars",
        }
    }
}

/// Token-length and character-length gate applied to both sides of a pair.
#[derive(Debug, Clone, Copy)]
pub struct LengthFilter {
    min_len: usize,
    max_len: usize,
    max_chars: usize,
}

impl LengthFilter {
    #[must_use]
    pub const fn new(bounds: &CollectBounds) -> Self {
        Self {
            min_len: bounds.min_len,
            max_len: bounds.max_len,
            max_chars: bounds.max_chars,
        }
    }

    pub fn check(&self, instruction: &str, response: &str) -> Result<(), RejectReason> {
        let li = count_whitespace_tokens(instruction);
        let lr = count_whitespace_tokens(response);
        if li < self.min_len || lr < self.min_len {
            return Err(RejectReason::TooShort);
        }
        if li > self.max_len || lr > self.max_len {
            return Err(RejectReason::TooLong);
        }
        if instruction.chars().count() > self.max_chars || response.chars().count() > self.max_chars
        {
            return Err(RejectReason::TooManyChars);
        }
        Ok(())
    }

    #[must_use]
    pub fn passes(&self, instruction: &str, response: &str) -> bool {
        self.check(instruction, response).is_ok()
    }
}
