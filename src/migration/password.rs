//! Password generation for re-created database users.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::CryptoRng;

use crate::error::{MigrationError, Result};

pub const DEFAULT_PASSWORD_LENGTH: usize = 20;

/// One character from each class is guaranteed
pub const MIN_PASSWORD_LENGTH: usize = 4;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
pub const SPECIAL_CHARACTERS: &[u8] = b"!@#$%^&*-_=+";

/// Generates passwords with at least one lowercase, uppercase, digit and symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordGenerator {
    length: usize,
}

impl Default for PasswordGenerator {
    fn default() -> Self {
        Self {
            length: DEFAULT_PASSWORD_LENGTH,
        }
    }
}

impl PasswordGenerator {
    pub fn new(length: usize) -> Result<Self> {
        if length < MIN_PASSWORD_LENGTH {
            return Err(MigrationError::Config(format!(
                "password length must be at least {}, got {}",
                MIN_PASSWORD_LENGTH, length
            )));
        }
        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Generate using the thread-local CSPRNG (ChaCha, reseeded from the OS)
    pub fn generate(&self) -> String {
        self.generate_with(&mut rand::rng())
    }

    /// Generate from a caller-supplied generator; only cryptographically secure ones are accepted
    pub fn generate_with<R: CryptoRng + ?Sized>(&self, rng: &mut R) -> String {
        let alphabet: Vec<u8> = [LOWERCASE, UPPERCASE, DIGITS, SPECIAL_CHARACTERS].concat();

        let mut password: Vec<u8> = Vec::with_capacity(self.length);
        for class in [LOWERCASE, UPPERCASE, DIGITS, SPECIAL_CHARACTERS] {
            password.extend(class.choose(rng));
        }
        while password.len() < self.length {
            password.extend(alphabet.choose(rng));
        }

        // Guaranteed characters must not sit in fixed positions
        password.shuffle(rng);

        password.into_iter().map(char::from).collect()
    }
}
