//! DigiShield retarget
//!
//! Retargets every block against the single previous spacing, with an
//! asymmetric clamp: at most a quarter down, at most half up. The
//! target spacing itself is time-activated; the chain moved from
//! thirty-second to two-minute blocks at the X11 switchover.
//!
//! The retarget interval is derived as timespan over spacing and comes
//! out at one, which makes the non-boundary branches unreachable. They
//! are kept because the derivation is part of the consensus contract
//! and a parameter change would re-enable them.

use crate::consensus::{BlockHeader, ChainView, Network, Params, Target};
use log::debug;

/// Compute the next required work with DigiShield.
pub fn digishield<C: ChainView>(
    pindex_last: Option<&C>,
    header: &BlockHeader,
    params: &Params,
) -> u32 {
    let pow_limit = params.pow_limit;
    let pow_limit_compact = pow_limit.to_compact();
    let testnet = params.network == Network::Testnet;

    let mut target_spacing: i64 = 60 * 2;
    if (!testnet && header.time >= params.forks.x11_start_time)
        || (testnet && header.time >= params.forks.testnet_spacing_pivot_time)
    {
        // Two-minute blocks once the X11 era starts
        target_spacing = 60 * 2;
    } else if !testnet
        && pindex_last.map_or(false, |last| last.height() + 1 >= params.forks.digishield_height)
        && header.time < params.forks.x11_start_time
    {
        // Thirty-second blocks between the DigiShield and X11 forks
        target_spacing = 30;
    }

    // Retarget every block
    let retarget_timespan = target_spacing;
    let retarget_spacing = target_spacing;
    let retarget_interval = (retarget_timespan / retarget_spacing) as u64;

    // Genesis block
    let last = match pindex_last {
        None => return pow_limit_compact,
        Some(last) => last,
    };

    // Only change once per interval
    let height = last.height() + 1;
    if height % retarget_interval != 0 {
        if params.allow_min_difficulty_blocks {
            // If the candidate's timestamp is more than twice the
            // spacing late, allow mining a minimum-difficulty block.
            if header.time > last.time() + retarget_spacing * 2 {
                return pow_limit_compact;
            }
        } else {
            // Return the last non-minimum-difficulty target instead
            let mut pindex = last;
            while let Some(prev) = pindex.prev() {
                if pindex.height() % retarget_interval == 0 || pindex.bits() != pow_limit_compact
                {
                    break;
                }
                pindex = prev;
            }
            return pindex.bits();
        }
        return last.bits();
    }

    // Go back one interval, except for the first retarget after genesis
    let blocks_to_go_back = if height != retarget_interval {
        retarget_interval
    } else {
        retarget_interval - 1
    };

    let mut pindex_first = last;
    for _ in 0..blocks_to_go_back {
        pindex_first = pindex_first
            .prev()
            .expect("chain view shorter than declared height");
    }

    // Limit adjustment step
    let mut actual_timespan = last.time() - pindex_first.time();
    debug!("actual timespan {} before bounds", actual_timespan);

    let mut new = Target::from_compact(last.bits());

    let low = retarget_timespan - retarget_timespan / 4;
    let high = retarget_timespan + retarget_timespan / 2;
    if actual_timespan < low {
        actual_timespan = low;
    }
    if actual_timespan > high {
        actual_timespan = high;
    }

    // Retarget
    new = new * actual_timespan as u64 / retarget_timespan as u64;

    debug!(
        "digishield: retarget timespan {} actual timespan {} after {:08x} {}",
        retarget_timespan,
        actual_timespan,
        new.to_compact(),
        new
    );

    if new > pow_limit {
        new = pow_limit;
    }

    new.to_compact()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::BlockIndex;
    use crate::crypto::Hash;
    use std::sync::Arc;

    const X11_TIME: i64 = 1_406_160_000;

    fn params_digi() -> Params {
        let mut params = Params::mainnet();
        params.pow_limit = Target::from_compact(0x1e0fffff);
        params
    }

    fn header_at(time: i64) -> BlockHeader {
        BlockHeader::new(1, Hash::zero(), Hash::zero(), time, 0, 0)
    }

    fn pair(height: u64, prev_time: i64, tip_time: i64, bits: u32) -> Arc<BlockIndex> {
        let prev = Arc::new(BlockIndex::new(
            height - 1,
            prev_time,
            bits,
            Target::zero(),
            None,
        ));
        Arc::new(BlockIndex::new(height, tip_time, bits, Target::zero(), Some(prev)))
    }

    #[test]
    fn test_genesis_returns_pow_limit() {
        let params = params_digi();
        let bits = digishield::<BlockIndex>(None, &header_at(X11_TIME), &params);
        assert_eq!(bits, 0x1e0fffff);
    }

    #[test]
    fn test_exact_spacing_keeps_target() {
        let params = params_digi();
        let tip = pair(250_000, X11_TIME, X11_TIME + 120, 0x1b0404cb);
        let bits = digishield(Some(&*tip), &header_at(X11_TIME + 240), &params);
        assert_eq!(bits, 0x1b0404cb);
    }

    #[test]
    fn test_slow_block_clamped_to_three_halves() {
        let params = params_digi();
        // 500 seconds observed, clamped to 180
        let tip = pair(250_000, X11_TIME, X11_TIME + 500, 0x1b0404cb);
        let bits = digishield(Some(&*tip), &header_at(X11_TIME + 600), &params);
        let expected = (Target::from_compact(0x1b0404cb) * 180 / 120).to_compact();
        assert_eq!(bits, expected);
        assert_eq!(bits, 0x1b060730);
    }

    #[test]
    fn test_fast_block_clamped_to_three_quarters() {
        let params = params_digi();
        let tip = pair(250_000, X11_TIME, X11_TIME + 10, 0x1b0404cb);
        let bits = digishield(Some(&*tip), &header_at(X11_TIME + 130), &params);
        let expected = (Target::from_compact(0x1b0404cb) * 90 / 120).to_compact();
        assert_eq!(bits, expected);
    }

    #[test]
    fn test_thirty_second_spacing_before_x11() {
        let params = params_digi();
        // Candidate mined before the X11 pivot in the DigiShield range:
        // spacing is 30 seconds, so an exact 30-second block holds steady.
        let t0 = X11_TIME - 10_000;
        let tip = pair(250_000, t0, t0 + 30, 0x1b0404cb);
        let bits = digishield(Some(&*tip), &header_at(t0 + 60), &params);
        assert_eq!(bits, 0x1b0404cb);
    }

    #[test]
    fn test_result_clamped_by_pow_limit() {
        let mut params = params_digi();
        params.pow_limit = Target::from_compact(0x1b0404cb);
        // Slow block would ease the target past the limit
        let tip = pair(250_000, X11_TIME, X11_TIME + 500, 0x1b0404cb);
        let bits = digishield(Some(&*tip), &header_at(X11_TIME + 600), &params);
        assert_eq!(bits, 0x1b0404cb);
    }
}
