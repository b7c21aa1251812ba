//! Dark Gravity Wave v3 retarget
//!
//! Fixed 24-block window. The window's targets fold into a weighted
//! running average while the observed timespan accumulates per
//! transition, unclamped, so backward time jumps subtract. The final
//! adjustment is the ratio of observed to expected timespan, bounded to
//! a factor of three either way.

use crate::consensus::{BlockHeader, ChainView, Params, Target};
use log::debug;

/// Window size in blocks; minimum chain depth and averaging span alike.
const PAST_BLOCKS_MIN: u64 = 24;
/// Maximum blocks walked; equal to the minimum for this algorithm.
const PAST_BLOCKS_MAX: u64 = 24;

/// Compute the next required work with Dark Gravity Wave v3.
pub fn dark_gravity_wave<C: ChainView>(
    pindex_last: Option<&C>,
    header: &BlockHeader,
    params: &Params,
) -> u32 {
    let pow_limit = params.pow_limit;

    let mut target_spacing = params.pow_target_spacing;
    if header.time > params.forks.dark_gravity_spacing_pivot_time {
        target_spacing = 60 * 2;
    }

    let last = match pindex_last {
        None => return pow_limit.to_compact(),
        Some(last) => last,
    };
    if last.height() == 0 || last.height() < PAST_BLOCKS_MIN {
        return pow_limit.to_compact();
    }

    let mut count_blocks: u64 = 0;
    let mut actual_timespan: i64 = 0;
    let mut last_block_time: i64 = 0;
    let mut avg = Target::zero();
    let mut avg_prev = Target::zero();

    let mut reading = last;
    let mut i: u64 = 1;
    loop {
        if reading.height() == 0 {
            break;
        }
        if PAST_BLOCKS_MAX > 0 && i > PAST_BLOCKS_MAX {
            break;
        }
        count_blocks += 1;

        if count_blocks <= PAST_BLOCKS_MIN {
            avg = if count_blocks == 1 {
                Target::from_compact(reading.bits())
            } else {
                (avg_prev * count_blocks + Target::from_compact(reading.bits()))
                    / (count_blocks + 1)
            };
            avg_prev = avg;
        }

        if last_block_time > 0 {
            // Not clamped; a backward jump contributes negatively
            actual_timespan += last_block_time - reading.time();
        }
        last_block_time = reading.time();

        match reading.prev() {
            None => break,
            Some(prev) => reading = prev,
        }
        i += 1;
    }

    let mut new = avg;

    let target_timespan = count_blocks as i64 * target_spacing;

    if actual_timespan < target_timespan / 3 {
        actual_timespan = target_timespan / 3;
    }
    if actual_timespan > target_timespan * 3 {
        actual_timespan = target_timespan * 3;
    }

    // Retarget
    new = new * actual_timespan as u64 / target_timespan as u64;

    debug!(
        "dark gravity wave: target timespan {} actual timespan {} after {:08x} {}",
        target_timespan,
        actual_timespan,
        new.to_compact(),
        new
    );

    if new > pow_limit {
        // Full reset to the limit on overshoot
        new = pow_limit;
    }

    new.to_compact()
}
