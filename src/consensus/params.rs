//! Consensus parameters
//!
//! One immutable record per network. Constructed once at startup and
//! shared read-only with every consensus call.

use crate::consensus::Target;
use crate::constants::{
    DARK_GRAVITY_SPACING_PIVOT_TIME, FORK_HEIGHT_DARK_GRAVITY, FORK_HEIGHT_DIGISHIELD,
    FORK_HEIGHT_KIMOTO, FORK_HEIGHT_X11, GENESIS_HASH_MAIN, GENESIS_HASH_TEST,
    RETARGET_FIX_HEIGHT, TESTNET_SPACING_PIVOT_TIME, X11_START_TIME,
};
use crate::crypto::Hash;
use serde::{Deserialize, Serialize};

/// Which chain a node is following
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    /// Production chain
    Mainnet,
    /// Public test chain
    Testnet,
}

/// Heights and timestamps at which retarget behavior changed.
///
/// These are part of consensus history; every node must agree on them
/// or split at the recorded heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkSchedule {
    /// First height retargeted by the Kimoto Gravity Well
    pub kimoto_height: u64,
    /// Height bounding the Kimoto era; DigiShield runs strictly above it
    pub digishield_height: u64,
    /// X11 switchover height (informational, never compared)
    pub x11_height: u64,
    /// First height retargeted by Dark Gravity Wave v3
    pub dark_gravity_height: u64,
    /// Height after which V1 averages over four full retarget intervals
    pub retarget_fix_height: u64,
    /// Timestamp activating two-minute spacing on mainnet
    pub x11_start_time: i64,
    /// Timestamp activating two-minute spacing on testnet (DigiShield)
    pub testnet_spacing_pivot_time: i64,
    /// Timestamp past which Dark Gravity Wave targets two-minute spacing
    pub dark_gravity_spacing_pivot_time: i64,
}

impl Default for ForkSchedule {
    fn default() -> Self {
        ForkSchedule {
            kimoto_height: FORK_HEIGHT_KIMOTO,
            digishield_height: FORK_HEIGHT_DIGISHIELD,
            x11_height: FORK_HEIGHT_X11,
            dark_gravity_height: FORK_HEIGHT_DARK_GRAVITY,
            retarget_fix_height: RETARGET_FIX_HEIGHT,
            x11_start_time: X11_START_TIME,
            testnet_spacing_pivot_time: TESTNET_SPACING_PIVOT_TIME,
            dark_gravity_spacing_pivot_time: DARK_GRAVITY_SPACING_PIVOT_TIME,
        }
    }
}

/// Parameters that influence chain consensus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Which chain these parameters describe
    pub network: Network,
    /// Hash of the genesis block
    pub genesis_hash: Hash,
    /// Blocks between subsidy halvings
    pub subsidy_halving_interval: u64,
    /// Majority threshold enforcing a block version upgrade
    pub majority_enforce_block_upgrade: u32,
    /// Majority threshold rejecting outdated block versions
    pub majority_reject_block_outdated: u32,
    /// Window over which version majorities are counted
    pub majority_window: u32,
    /// Maximum allowed target, i.e. minimum difficulty
    pub pow_limit: Target,
    /// Testnet-only slack: allow minimum-difficulty blocks when the
    /// chain stalls
    pub allow_min_difficulty_blocks: bool,
    /// Nominal seconds per block
    pub pow_target_spacing: i64,
    /// Seconds per V1 retarget window
    pub pow_target_timespan: i64,
    /// Recorded retarget forks
    pub forks: ForkSchedule,
}

impl Params {
    /// Mainnet consensus parameters
    pub fn mainnet() -> Params {
        Params {
            network: Network::Mainnet,
            genesis_hash: Hash::from_hex(GENESIS_HASH_MAIN).unwrap_or_else(|_| Hash::zero()),
            subsidy_halving_interval: 840_000,
            majority_enforce_block_upgrade: 750,
            majority_reject_block_outdated: 950,
            majority_window: 1000,
            pow_limit: Target::from_compact(0x1e0f_ffff),
            allow_min_difficulty_blocks: false,
            pow_target_spacing: 60,
            pow_target_timespan: 24 * 60 * 60,
            forks: ForkSchedule::default(),
        }
    }

    /// Testnet consensus parameters
    pub fn testnet() -> Params {
        Params {
            network: Network::Testnet,
            genesis_hash: Hash::from_hex(GENESIS_HASH_TEST).unwrap_or_else(|_| Hash::zero()),
            allow_min_difficulty_blocks: true,
            ..Params::mainnet()
        }
    }

    /// Blocks between V1 retargets
    pub fn difficulty_adjustment_interval(&self) -> u64 {
        (self.pow_target_timespan / self.pow_target_spacing) as u64
    }
}
