//! Proof-of-work checks and work arithmetic
//!
//! The two numeric helpers feed chain selection: a block's proof is the
//! expected number of hashes to meet its target, and the equivalent
//! time between two chain points converts a work difference into
//! seconds at the tip's difficulty.

use crate::consensus::{ChainView, Params, Target, Work};
use crate::crypto::Hash;
use log::debug;
use thiserror::Error;

/// Why a proof of work was rejected
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PowError {
    /// The compact target is negative, zero, overflowed, or above the
    /// network's limit
    #[error("target below minimum work")]
    TargetOutOfRange,
    /// The block hash exceeds the claimed target
    #[error("hash doesn't match claimed target")]
    HashAboveTarget,
}

/// Validate that `hash` satisfies the compact target `bits`.
pub fn validate_proof_of_work(hash: &Hash, bits: u32, params: &Params) -> Result<(), PowError> {
    let (target, negative, overflow) = Target::decode_compact(bits);

    // Check range
    if negative || target.is_zero() || overflow || target > params.pow_limit {
        return Err(PowError::TargetOutOfRange);
    }

    // Check proof of work matches claimed amount
    if Target::from(hash.to_le_u256()) > target {
        return Err(PowError::HashAboveTarget);
    }

    Ok(())
}

/// Boolean surface over [`validate_proof_of_work`].
pub fn check_proof_of_work(hash: &Hash, bits: u32, params: &Params) -> bool {
    match validate_proof_of_work(hash, bits, params) {
        Ok(()) => true,
        Err(err) => {
            debug!("proof of work rejected: {}", err);
            false
        }
    }
}

/// Expected number of hashes needed to meet `block`'s target.
///
/// This is 2^256 / (target + 1), which cannot be represented directly;
/// since 2^256 is at least target + 1, it equals
/// (~target / (target + 1)) + 1. Invalid targets contribute no work.
pub fn block_proof<C: ChainView>(block: &C) -> Work {
    let (target, negative, overflow) = Target::decode_compact(block.bits());
    if negative || overflow || target.is_zero() {
        return Work::zero();
    }
    (!target / (target + Target::one())) + Target::one()
}

/// Seconds it would take to redo the work difference between `from` and
/// `to`, assuming the hashrate implied by the difficulty at `tip`.
///
/// Negative when `to` carries less accumulated work than `from`;
/// saturates at `i64::MAX` magnitude beyond 63 bits.
pub fn block_proof_equivalent_time<C: ChainView>(
    to: &C,
    from: &C,
    tip: &C,
    params: &Params,
) -> i64 {
    let (delta, sign) = if to.chain_work() > from.chain_work() {
        (to.chain_work() - from.chain_work(), 1i64)
    } else {
        (from.chain_work() - to.chain_work(), -1i64)
    };
    let r = delta * params.pow_target_spacing as u64 / block_proof(tip);
    if r.bit_len() > 63 {
        return sign * i64::MAX;
    }
    sign * r.low_u64() as i64
}
