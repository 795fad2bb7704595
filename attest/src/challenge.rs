//! Challenge records and the displayed secret code.

use vigil_types::{ApiKey, EntropySource, Nonce, Timestamp};

/// The secret code displayed to the human: three digits, 0–9, repetition
/// allowed. Submitting the digits reversed signals duress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChallengeCode([u8; Self::LENGTH]);

impl ChallengeCode {
    pub const LENGTH: usize = 3;

    /// Generate three independent uniformly random digits.
    pub fn generate(entropy: &dyn EntropySource) -> Self {
        let mut digits = [0u8; Self::LENGTH];
        let mut filled = 0;
        let mut buf = [0u8; 8];
        while filled < Self::LENGTH {
            entropy.fill(&mut buf);
            for &byte in &buf {
                // Reject bytes ≥ 250 so the modulo is uniform over 0–9
                if byte < 250 {
                    digits[filled] = byte % 10;
                    filled += 1;
                    if filled == Self::LENGTH {
                        break;
                    }
                }
            }
        }
        Self(digits)
    }

    /// Build a code from explicit digits. `None` if any is not 0–9.
    pub fn from_digits(digits: [u8; Self::LENGTH]) -> Option<Self> {
        digits.iter().all(|d| *d <= 9).then_some(Self(digits))
    }

    pub fn digits(&self) -> [u8; Self::LENGTH] {
        self.0
    }

    /// The digits joined in order, e.g. `[4,1,9]` → `"419"`.
    pub fn joined(&self) -> String {
        self.0.iter().map(|d| char::from(b'0' + d)).collect()
    }

    /// The digits in reverse order — the duress code for this challenge.
    pub fn reversed(&self) -> Self {
        let mut digits = self.0;
        digits.reverse();
        Self(digits)
    }

    /// Whether the code reads the same reversed. For palindromic codes the
    /// duress code collides with the normal code, so duress cannot be
    /// signaled — a known limitation of the scheme.
    pub fn is_palindrome(&self) -> bool {
        self.0 == self.reversed().0
    }
}

/// A pending challenge: the code, its binding nonce, and its lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct Challenge {
    pub nonce: Nonce,
    pub code: ChallengeCode,
    pub issued_at: Timestamp,
    pub expiry: Timestamp,
    pub used: bool,
    pub owner_key: ApiKey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_nullables::NullEntropy;
    use vigil_types::SystemEntropy;

    #[test]
    fn generated_digits_are_in_range() {
        for _ in 0..100 {
            let code = ChallengeCode::generate(&SystemEntropy);
            assert!(code.digits().iter().all(|d| *d <= 9));
        }
    }

    #[test]
    fn generation_is_deterministic_under_null_entropy() {
        let entropy = NullEntropy::constant(vec![4, 1, 9]);
        let code = ChallengeCode::generate(&entropy);
        assert_eq!(code.digits(), [4, 1, 9]);
    }

    #[test]
    fn rejection_sampling_skips_biased_bytes() {
        // 255 and 250 must be rejected; only 7, 3, 9 survive
        let entropy = NullEntropy::constant(vec![255, 7, 250, 3, 9]);
        let code = ChallengeCode::generate(&entropy);
        assert_eq!(code.digits(), [7, 3, 9]);
    }

    #[test]
    fn joined_and_reversed() {
        let code = ChallengeCode::from_digits([4, 1, 9]).unwrap();
        assert_eq!(code.joined(), "419");
        assert_eq!(code.reversed().joined(), "914");
    }

    #[test]
    fn from_digits_rejects_non_digits() {
        assert!(ChallengeCode::from_digits([4, 1, 10]).is_none());
        assert!(ChallengeCode::from_digits([0, 0, 0]).is_some());
    }

    #[test]
    fn palindrome_detection() {
        assert!(ChallengeCode::from_digits([3, 1, 3]).unwrap().is_palindrome());
        assert!(ChallengeCode::from_digits([7, 7, 7]).unwrap().is_palindrome());
        assert!(!ChallengeCode::from_digits([4, 1, 9]).unwrap().is_palindrome());
    }
}
