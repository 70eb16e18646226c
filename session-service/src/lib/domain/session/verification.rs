use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::session::errors::AuthError;
use crate::session::models::Challenge;
use crate::session::models::ChallengeId;
use crate::session::ports::KeyValueCache;

/// Two-factor arithmetic puzzle with single-digit operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArithmeticPuzzle {
    pub prompt: String,
    pub answer: String,
}

impl ArithmeticPuzzle {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let a: u8 = rng.gen_range(0..=9);
        let b: u8 = rng.gen_range(0..=9);

        let (prompt, answer) = match rng.gen_range(0..3) {
            0 => (format!("{} + {} = ?", a, b), u16::from(a) + u16::from(b)),
            1 => {
                // Larger operand first so the answer never goes negative
                let (a, b) = if a >= b { (a, b) } else { (b, a) };
                (format!("{} - {} = ?", a, b), u16::from(a - b))
            }
            _ => (format!("{} * {} = ?", a, b), u16::from(a) * u16::from(b)),
        };

        Self {
            prompt,
            answer: answer.to_string(),
        }
    }
}

/// Single-use verification codes, one slot per login context.
pub struct VerificationCodeCache<C>
where
    C: KeyValueCache,
{
    cache: Arc<C>,
    ttl: Duration,
    key_prefix: String,
}

impl<C> VerificationCodeCache<C>
where
    C: KeyValueCache,
{
    /// # Arguments
    /// * `cache` - Shared store holding outstanding codes
    /// * `ttl` - Lifetime of an issued code
    /// * `key_prefix` - Namespace prepended to every key
    pub fn new(cache: Arc<C>, ttl: Duration, key_prefix: impl Into<String>) -> Self {
        Self {
            cache,
            ttl,
            key_prefix: key_prefix.into(),
        }
    }

    /// Generate a code for the context and store it, replacing any earlier one.
    ///
    /// # Errors
    /// * `AuthenticationError` - Shared store unavailable
    pub async fn issue(&self, challenge_id: &ChallengeId) -> Result<Challenge, AuthError> {
        let puzzle = ArithmeticPuzzle::random(&mut rand::thread_rng());

        self.cache
            .set(&self.key(challenge_id), &puzzle.answer, self.ttl)
            .await?;

        tracing::debug!(
            challenge_id = %challenge_id,
            ttl_seconds = self.ttl.as_secs(),
            "Verification code issued"
        );

        Ok(Challenge {
            id: *challenge_id,
            prompt: puzzle.prompt,
            expires_in_seconds: self.ttl.as_secs(),
        })
    }

    /// Consume the stored code and compare it with the submitted one.
    ///
    /// The entry is removed whatever the outcome, so a code can be tried only once.
    ///
    /// # Errors
    /// * `CodeExpired` - No code is stored (expired, consumed, or never issued)
    /// * `CodeMismatch` - Stored code differs, ignoring ASCII case and surrounding whitespace
    /// * `AuthenticationError` - Shared store unavailable
    pub async fn consume_and_validate(
        &self,
        challenge_id: &ChallengeId,
        submitted: &str,
    ) -> Result<(), AuthError> {
        let stored = self
            .cache
            .take(&self.key(challenge_id))
            .await?
            .ok_or(AuthError::CodeExpired)?;

        if !stored.eq_ignore_ascii_case(submitted.trim()) {
            return Err(AuthError::CodeMismatch);
        }

        Ok(())
    }

    fn key(&self, challenge_id: &ChallengeId) -> String {
        format!("{}captcha:{}", self.key_prefix, challenge_id)
    }
}
