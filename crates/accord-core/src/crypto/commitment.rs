//! Commitment and Salt for the commit-reveal scheme.
//!
//! A commitment binds a value as `SHA-256(value || salt)`. The salt's
//! entropy dominates the committed domain (a single bit or a short
//! message), so the digest reveals nothing about the value until the
//! salt is disclosed.

use crate::audit::{AuditLevel, AuditSink};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Number of random bytes in a commitment salt.
pub const SALT_LENGTH: usize = 16;

/// Error from creating a commitment.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum CommitError {
    #[error("bit must be 0 or 1, got {0}")]
    InvalidBit(u8),
}

/// Error from checking a reveal against its commitment.
///
/// Any variant is a hard integrity failure for the enclosing round.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("salt is not valid hex of length {}", SALT_LENGTH * 2)]
    InvalidSalt,

    #[error("bit commitment mismatch")]
    BitMismatch,

    #[error("message commitment mismatch")]
    MessageMismatch,

    #[error("nothing committed to reveal")]
    NothingCommitted,
}

/// Salt for the commitment scheme
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt([u8; SALT_LENGTH]);

impl Salt {
    /// Create a new random salt
    pub fn random() -> Self {
        let mut bytes = [0u8; SALT_LENGTH];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; SALT_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; SALT_LENGTH] {
        &self.0
    }

    /// Hex encoding, as presented at reveal time
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode a revealed hex salt. Anything that is not exactly
    /// `SALT_LENGTH` bytes of valid hex is rejected.
    pub fn from_hex(salt_hex: &str) -> Result<Self, IntegrityError> {
        let bytes = hex::decode(salt_hex).map_err(|_| IntegrityError::InvalidSalt)?;
        let bytes: [u8; SALT_LENGTH] =
            bytes.try_into().map_err(|_| IntegrityError::InvalidSalt)?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", hex::encode(&self.0[..8]))
    }
}

/// Commitment = SHA-256(value || salt)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment([u8; 32]);

impl Commitment {
    /// Create a commitment from value bytes and salt
    pub fn new(value_bytes: &[u8], salt: &Salt) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(value_bytes);
        hasher.update(salt.as_bytes());
        let result = hasher.finalize();
        Self(result.into())
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verify that the given value and salt produce this commitment.
    ///
    /// Comparison is constant-time over the digest bytes.
    pub fn verify(&self, value_bytes: &[u8], salt: &Salt) -> bool {
        constant_time_eq(&self.0, &Self::new(value_bytes, salt).0)
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Constant-time comparison; must not leak how many bytes matched.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }

    diff == 0
}

/// First few characters of a message, for audit lines. The trail records
/// enough to reconstruct the action without storing the full plaintext.
fn preview(text: &str) -> String {
    text.chars().take(10).collect()
}

/// Commit a single bit (0 or 1) with a fresh random salt.
///
/// Rejects anything outside {0, 1} before creating any state.
pub fn commit_bit(bit: u8, audit: &dyn AuditSink) -> Result<(Commitment, Salt), CommitError> {
    if bit > 1 {
        return Err(CommitError::InvalidBit(bit));
    }
    let salt = Salt::random();
    let commitment = Commitment::new(&[bit], &salt);
    audit.record(
        AuditLevel::Info,
        &format!("commit_bit: bit={bit}, digest={commitment}"),
    );
    Ok((commitment, salt))
}

/// Verify a revealed bit and hex salt against the original commitment.
pub fn verify_bit(
    commitment: &Commitment,
    bit: u8,
    salt_hex: &str,
    audit: &dyn AuditSink,
) -> Result<(), IntegrityError> {
    let salt = match Salt::from_hex(salt_hex) {
        Ok(salt) => salt,
        Err(err) => {
            audit.record(
                AuditLevel::Warning,
                &format!("verify_bit: invalid salt hex: {salt_hex}"),
            );
            return Err(err);
        }
    };
    if !commitment.verify(&[bit], &salt) {
        audit.record(
            AuditLevel::Warning,
            &format!("verify_bit mismatch: expected={commitment}, bit={bit}"),
        );
        return Err(IntegrityError::BitMismatch);
    }
    audit.record(AuditLevel::Info, &format!("verify_bit: bit={bit}, commitment OK"));
    Ok(())
}

/// Commit an arbitrary UTF-8 string with a fresh random salt.
pub fn commit_message(text: &str, audit: &dyn AuditSink) -> (Commitment, Salt) {
    let salt = Salt::random();
    let commitment = Commitment::new(text.as_bytes(), &salt);
    audit.record(
        AuditLevel::Info,
        &format!(
            "commit_message: message=\"{}...\", digest={commitment}",
            preview(text)
        ),
    );
    (commitment, salt)
}

/// Verify a revealed message and hex salt against the original commitment.
pub fn verify_message(
    commitment: &Commitment,
    text: &str,
    salt_hex: &str,
    audit: &dyn AuditSink,
) -> Result<(), IntegrityError> {
    let salt = match Salt::from_hex(salt_hex) {
        Ok(salt) => salt,
        Err(err) => {
            audit.record(
                AuditLevel::Warning,
                &format!("verify_message: invalid salt hex: {salt_hex}"),
            );
            return Err(err);
        }
    };
    if !commitment.verify(text.as_bytes(), &salt) {
        audit.record(
            AuditLevel::Warning,
            &format!(
                "verify_message mismatch: expected={commitment}, message=\"{}...\"",
                preview(text)
            ),
        );
        return Err(IntegrityError::MessageMismatch);
    }
    audit.record(AuditLevel::Info, "verify_message: message verified, commitment OK");
    Ok(())
}
