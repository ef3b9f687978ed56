//! Cryptographic primitives for the Accord protocol.
//!
//! This module provides:
//! - Commitment and Salt for the commit-reveal scheme
//! - Audited commit/verify operations over a single bit or a UTF-8 message

mod commitment;

pub use commitment::{
    commit_bit, commit_message, verify_bit, verify_message, CommitError, Commitment,
    IntegrityError, Salt, SALT_LENGTH,
};
