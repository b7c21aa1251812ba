//! Kimoto Gravity Well retarget
//!
//! Walks a variable window of recent blocks, maintaining a running mean
//! of their targets, until the observed block rate drifts outside an
//! event-horizon envelope that tightens as the window grows. The
//! envelope math is IEEE-754 double precision and consensus-observable;
//! the running mean is integer arithmetic where every truncation
//! matters.

use crate::consensus::{BlockHeader, ChainView, Params, Target};
use log::debug;

/// Seconds in a day, the unit the window bounds are expressed in.
const TIME_DAY_SECONDS: i64 = 60 * 60 * 24;

/// Compute the next required work with the Kimoto Gravity Well.
///
/// Returns the minimum difficulty until the chain is deep enough to
/// fill the smallest window.
pub fn kimoto_gravity_well<C: ChainView>(
    pindex_last: Option<&C>,
    _header: &BlockHeader,
    params: &Params,
) -> u32 {
    let target_spacing = params.pow_target_spacing;
    let past_seconds_min = (TIME_DAY_SECONDS as f64 * 0.0185) as i64;
    let past_seconds_max = (TIME_DAY_SECONDS as f64 * 0.23125) as i64;
    let past_blocks_min = (past_seconds_min / target_spacing) as u64;
    let past_blocks_max = (past_seconds_max / target_spacing) as u64;

    let pow_limit = params.pow_limit;

    let last = match pindex_last {
        None => return pow_limit.to_compact(),
        Some(last) => last,
    };
    if last.height() == 0 || last.height() < past_blocks_min {
        return pow_limit.to_compact();
    }

    let old = Target::from_compact(last.bits());

    let mut mass: u64 = 0;
    let mut actual_seconds: i64 = 0;
    let mut target_seconds: i64 = 0;
    let mut ratio: f64 = 1.0;
    let mut avg = Target::zero();
    let mut avg_prev = Target::zero();

    let mut reading = last;
    let mut i: u64 = 1;
    loop {
        if reading.height() == 0 {
            break;
        }
        if past_blocks_max > 0 && i > past_blocks_max {
            break;
        }
        mass += 1;

        // Running mean with a signed delta; dividing the magnitude
        // truncates toward zero, like signed division would.
        let decoded = Target::from_compact(reading.bits());
        avg = if i == 1 {
            decoded
        } else if decoded >= avg_prev {
            avg_prev + (decoded - avg_prev) / i
        } else {
            avg_prev - (avg_prev - decoded) / i
        };
        avg_prev = avg;

        actual_seconds = last.time() - reading.time();
        target_seconds = target_spacing * mass as i64;
        ratio = 1.0;
        if actual_seconds < 0 {
            actual_seconds = 0;
        }
        if actual_seconds != 0 && target_seconds != 0 {
            ratio = target_seconds as f64 / actual_seconds as f64;
        }
        let event_horizon = 1.0 + 0.7084 * (mass as f64 / 39.96).powf(-1.228);
        let event_horizon_fast = event_horizon;
        let event_horizon_slow = 1.0 / event_horizon;

        if mass >= past_blocks_min
            && (ratio <= event_horizon_slow || ratio >= event_horizon_fast)
        {
            break;
        }
        match reading.prev() {
            None => break,
            Some(prev) => reading = prev,
        }
        i += 1;
    }

    let mut new = avg;
    if actual_seconds != 0 && target_seconds != 0 {
        new = new * actual_seconds as u64 / target_seconds as u64;
    }
    if new > pow_limit {
        new = pow_limit;
    }

    debug!(
        "kimoto gravity well: rate adjustment ratio {} before {:08x} {} after {:08x} {}",
        ratio,
        last.bits(),
        old,
        new.to_compact(),
        new
    );

    new.to_compact()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::BlockIndex;
    use crate::crypto::Hash;
    use std::sync::Arc;

    fn params_kgw() -> Params {
        let mut params = Params::mainnet();
        params.pow_limit = Target::from_compact(0x1e0fffff);
        params.pow_target_spacing = 60;
        params
    }

    fn header() -> BlockHeader {
        BlockHeader::new(1, Hash::zero(), Hash::zero(), 0, 0, 0)
    }

    fn spaced_chain(len: usize, spacing: i64, bits: u32) -> Arc<BlockIndex> {
        let mut node = Arc::new(BlockIndex::new(0, 0, bits, Target::zero(), None));
        for k in 1..len as u64 {
            node = Arc::new(BlockIndex::new(
                k,
                spacing * k as i64,
                bits,
                Target::zero(),
                Some(node),
            ));
        }
        node
    }

    #[test]
    fn test_genesis_and_shallow_chain_return_pow_limit() {
        let params = params_kgw();
        // 86400 * 0.0185 / 60 = 26 blocks minimum
        assert_eq!(
            kimoto_gravity_well::<BlockIndex>(None, &header(), &params),
            0x1e0fffff
        );
        let tip = spaced_chain(10, 60, 0x1c0168fd);
        assert_eq!(
            kimoto_gravity_well(Some(&*tip), &header(), &params),
            0x1e0fffff
        );
    }

    #[test]
    fn test_full_window_at_exact_spacing() {
        let params = params_kgw();
        // 400 blocks at exact spacing never breaches the envelope, so
        // the walk runs to the 333-block maximum window.
        let tip = spaced_chain(400, 60, 0x1c0168fd);
        let bits = kimoto_gravity_well(Some(&*tip), &header(), &params);
        // mass 333, actual covers 332 spacings
        let expected =
            (Target::from_compact(0x1c0168fd) * (332 * 60) / (333 * 60)).to_compact();
        assert_eq!(bits, expected);
    }

    #[test]
    fn test_fast_blocks_tighten_target() {
        let params = params_kgw();
        // Ten-second blocks; the rate ratio crosses the event horizon
        // once the minimum window is reached, and the target drops.
        let tip = spaced_chain(400, 10, 0x1c0168fd);
        let bits = kimoto_gravity_well(Some(&*tip), &header(), &params);
        let result = Target::from_compact(bits);
        assert!(result < Target::from_compact(0x1c0168fd));
        // Break happens right at the minimum window mass of 26
        let expected =
            (Target::from_compact(0x1c0168fd) * (25 * 10) / (26 * 60)).to_compact();
        assert_eq!(bits, expected);
    }

    #[test]
    fn test_slow_blocks_ease_target_within_limit() {
        let params = params_kgw();
        let tip = spaced_chain(400, 600, 0x1c0168fd);
        let bits = kimoto_gravity_well(Some(&*tip), &header(), &params);
        let result = Target::from_compact(bits);
        assert!(result > Target::from_compact(0x1c0168fd));
        assert!(result <= params.pow_limit);
    }

    #[test]
    fn test_output_never_exceeds_pow_limit() {
        let mut params = params_kgw();
        params.pow_limit = Target::from_compact(0x1c0fffff);
        // Slow chain mined near the limit already
        let tip = spaced_chain(400, 6000, 0x1c0ffff0);
        let bits = kimoto_gravity_well(Some(&*tip), &header(), &params);
        assert_eq!(bits, 0x1c0fffff);
    }

    #[test]
    fn test_running_mean_truncation_order() {
        let params = params_kgw();
        // Alternating targets; the recursive mean is order-dependent
        // and must match the reference truncation step by step.
        let bits_seq = [0x1c0168fd, 0x1c028dfa, 0x1c0168fd, 0x1c028dfa];
        let mut node = Arc::new(BlockIndex::new(0, 0, 0x1c0168fd, Target::zero(), None));
        for k in 1..=40u64 {
            let bits = bits_seq[(k % 4) as usize];
            node = Arc::new(BlockIndex::new(k, 60 * k as i64, bits, Target::zero(), Some(node)));
        }
        let got = kimoto_gravity_well(Some(&*node), &header(), &params);

        // Recompute the walk independently
        let mut avg = Target::zero();
        let mut reading = Some(&*node);
        let mut i = 1u64;
        let mut mass = 0u64;
        let (mut actual, mut target) = (0i64, 0i64);
        while let Some(block) = reading {
            if block.height == 0 || i > 333 {
                break;
            }
            mass += 1;
            let decoded = Target::from_compact(block.bits);
            avg = if i == 1 {
                decoded
            } else if decoded >= avg {
                avg + (decoded - avg) / i
            } else {
                avg - (avg - decoded) / i
            };
            actual = node.time - block.time;
            target = 60 * mass as i64;
            reading = block.prev.as_deref();
            i += 1;
        }
        let mut expected = avg;
        if actual != 0 && target != 0 {
            expected = expected * actual as u64 / target as u64;
        }
        assert_eq!(got, expected.to_compact());
    }
}
