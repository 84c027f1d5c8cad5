//! Text CAPTCHA: code generation, verification, and the widget state machine.
//!
//! Purely client-side; the relay never sees the code.

use rand::Rng;

/// Digits 2-9 and uppercase letters without the easily confused I and O
pub const ALPHABET: &[u8; 32] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Characters per challenge
pub const CODE_LENGTH: usize = 6;

/// Draw a fresh challenge code
pub fn generate<R: Rng>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// True when `attempt`, upper-cased, is exactly `expected`
pub fn verify(expected: &str, attempt: &str) -> bool {
    attempt.to_uppercase() == expected
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Unverified,
    Verified,
}

/// Challenge plus the user's current entry.
///
/// Transitions:
/// - `refresh`: new code, entry cleared, always `Unverified`
/// - `attempt`: `Verified` iff the entry matches; an empty entry changes nothing
#[derive(Debug, Clone)]
pub struct CaptchaWidget {
    code: String,
    entry: String,
    state: Verification,
}

impl CaptchaWidget {
    pub fn new() -> Self {
        Self::with_rng(&mut rand::rng())
    }

    pub fn with_rng<R: Rng>(rng: &mut R) -> Self {
        Self {
            code: generate(rng),
            entry: String::new(),
            state: Verification::Unverified,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn state(&self) -> Verification {
        self.state
    }

    pub fn is_verified(&self) -> bool {
        self.state == Verification::Verified
    }

    /// An entry was typed and does not match (drives the error styling)
    pub fn is_rejected(&self) -> bool {
        !self.entry.is_empty() && !self.is_verified()
    }

    /// Issue a new code. Returns the verification to report (always false).
    pub fn refresh(&mut self) -> bool {
        self.refresh_with(&mut rand::rng())
    }

    pub fn refresh_with<R: Rng>(&mut self, rng: &mut R) -> bool {
        self.code = generate(rng);
        self.entry.clear();
        self.state = Verification::Unverified;
        false
    }

    /// Record the user's entry (upper-cased, at most [`CODE_LENGTH`] characters).
    ///
    /// Returns the verification to report, or `None` for an empty entry.
    pub fn attempt(&mut self, entry: &str) -> Option<bool> {
        self.entry = entry.to_uppercase().chars().take(CODE_LENGTH).collect();
        if self.entry.is_empty() {
            return None;
        }

        let ok = verify(&self.code, &self.entry);
        self.state = if ok {
            Verification::Verified
        } else {
            Verification::Unverified
        };
        Some(ok)
    }
}

impl Default for CaptchaWidget {
    fn default() -> Self {
        Self::new()
    }
}
