//! Retarget dispatch and the V1 fixed-interval algorithm
//!
//! Four retarget algorithms were active over the chain's history. The
//! dispatcher selects one from the candidate height and the network;
//! the height ranges reproduce the historically mined chain exactly,
//! including the single height at the DigiShield boundary that still
//! retargets with V1.

use crate::consensus::{
    dark_gravity_wave, digishield, kimoto_gravity_well, BlockHeader, ChainView, ForkSchedule,
    Network, Params, Target,
};
use log::debug;

/// V1 averages over this many retarget intervals once the history fix
/// is active.
const RETARGET_HISTORY_FACTOR: u64 = 4;

/// Which retarget algorithm computes the next required work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetargetMode {
    /// Fixed-interval retarget with the history-factor extension
    V1,
    /// Kimoto Gravity Well, variable-window ratio of rates
    Kimoto,
    /// DigiShield, per-block asymmetric clamp
    DigiShield,
    /// Dark Gravity Wave v3, 24-block weighted average
    DarkGravity,
}

/// Select the retarget algorithm for a candidate block at `height`.
///
/// Testnet retargets with Dark Gravity Wave at every height. Mainnet
/// follows the fork schedule; the comparisons are deliberately strict,
/// so the height exactly at the DigiShield boundary falls through to V1.
pub fn retarget_mode(network: Network, height: u64, forks: &ForkSchedule) -> RetargetMode {
    if network == Network::Testnet {
        return RetargetMode::DarkGravity;
    }
    if height >= forks.kimoto_height && height < forks.digishield_height {
        RetargetMode::Kimoto
    } else if height > forks.digishield_height && height < forks.dark_gravity_height {
        RetargetMode::DigiShield
    } else if height >= forks.dark_gravity_height {
        RetargetMode::DarkGravity
    } else {
        RetargetMode::V1
    }
}

/// Compute the compact target required for the block following `pindex_last`.
///
/// `pindex_last` is the current tip the candidate builds on; `header` is
/// the candidate block's header (only its timestamp is consulted).
pub fn next_work_required<C: ChainView>(
    pindex_last: Option<&C>,
    header: &BlockHeader,
    params: &Params,
) -> u32 {
    let height = pindex_last.map_or(0, |last| last.height() + 1);
    match retarget_mode(params.network, height, &params.forks) {
        RetargetMode::V1 => next_work_required_v1(pindex_last, header, params),
        RetargetMode::Kimoto => kimoto_gravity_well(pindex_last, header, params),
        RetargetMode::DigiShield => digishield(pindex_last, header, params),
        RetargetMode::DarkGravity => dark_gravity_wave(pindex_last, header, params),
    }
}

/// V1 retarget: adjust once per interval by the ratio of actual to
/// target timespan, clamped to a factor of four.
///
/// Past the history-fix height the actual timespan is averaged over
/// four full intervals, which keeps a temporary hashrate majority from
/// moving difficulty at will.
pub fn next_work_required_v1<C: ChainView>(
    pindex_last: Option<&C>,
    header: &BlockHeader,
    params: &Params,
) -> u32 {
    let interval = params.difficulty_adjustment_interval();
    let pow_limit = params.pow_limit;
    let pow_limit_compact = pow_limit.to_compact();

    // Genesis block
    let last = match pindex_last {
        None => return pow_limit_compact,
        Some(last) => last,
    };

    // Only change once per interval
    let height = last.height() + 1;
    if height % interval != 0 {
        if params.allow_min_difficulty_blocks {
            // If the candidate's timestamp is more than twice the target
            // spacing late, allow mining a minimum-difficulty block.
            if header.time > last.time() + params.pow_target_spacing * 2 {
                return pow_limit_compact;
            }
            // Return the last non-minimum-difficulty target instead
            let mut pindex = last;
            while let Some(prev) = pindex.prev() {
                if pindex.height() % interval == 0 || pindex.bits() != pow_limit_compact {
                    break;
                }
                pindex = prev;
            }
            return pindex.bits();
        }
        return last.bits();
    }

    // Go back one full interval, except for the first retarget after
    // genesis, and four intervals once the history fix is active.
    let mut blocks_to_go_back = if height != interval {
        interval
    } else {
        interval - 1
    };
    if last.height() > params.forks.retarget_fix_height {
        blocks_to_go_back = RETARGET_HISTORY_FACTOR * interval;
    }

    let mut pindex_first = last;
    for _ in 0..blocks_to_go_back {
        pindex_first = pindex_first
            .prev()
            .expect("chain view shorter than declared height");
    }

    // Limit adjustment step
    let mut actual_timespan = if last.height() > params.forks.retarget_fix_height {
        (last.time() - pindex_first.time()) / RETARGET_HISTORY_FACTOR as i64
    } else {
        last.time() - pindex_first.time()
    };
    debug!("actual timespan {} before bounds", actual_timespan);

    let target_timespan = params.pow_target_timespan;
    if actual_timespan < target_timespan / 4 {
        actual_timespan = target_timespan / 4;
    }
    if actual_timespan > target_timespan * 4 {
        actual_timespan = target_timespan * 4;
    }

    // Retarget
    let old = Target::from_compact(last.bits());
    let mut new = old * actual_timespan as u64 / target_timespan as u64;

    if new > pow_limit {
        new = pow_limit;
    }

    debug!(
        "retarget: target timespan {} actual timespan {} before {:08x} {} after {:08x} {}",
        target_timespan,
        actual_timespan,
        last.bits(),
        old,
        new.to_compact(),
        new
    );

    new.to_compact()
}
