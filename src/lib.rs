//! Onyx (ONX) Proof-of-Work Difficulty Core
//!
//! Pure consensus-critical difficulty logic: compact target encoding,
//! retarget algorithm selection and evaluation, and the work arithmetic
//! used by chain selection. Everything here is a function of its inputs
//! plus an immutable parameter record and a read-only chain view; there
//! is no I/O and no global state.
//!
//! ONX is the short form used in addresses, logos, and protocol identifiers.

pub mod consensus;
pub mod crypto;

/// Protocol constants - HARD-CODED, NEVER CONFIGURABLE
pub mod constants {
    /// Height at which the Kimoto Gravity Well retarget activates (February 2014 fork)
    pub const FORK_HEIGHT_KIMOTO: u64 = 35_000;

    /// Height at which the DigiShield retarget activates (April 2014 fork)
    pub const FORK_HEIGHT_DIGISHIELD: u64 = 200_000;

    /// Height of the X11 switchover fork (July 2014, informational)
    pub const FORK_HEIGHT_X11: u64 = 300_000;

    /// Height at which Dark Gravity Wave v3 activates (February 2015 fork)
    pub const FORK_HEIGHT_DARK_GRAVITY: u64 = 385_000;

    /// Height after which V1 retargets average over four full intervals.
    /// Protects against a majority hashrate moving difficulty at will.
    pub const RETARGET_FIX_HEIGHT: u64 = 15_000;

    /// Start of the X11 era: Thu Jul 24 2014 00:00:00 UTC.
    /// Mainnet block spacing switches to two minutes at this timestamp.
    pub const X11_START_TIME: i64 = 1_406_160_000;

    /// Testnet spacing pivot used by the DigiShield retarget
    pub const TESTNET_SPACING_PIVOT_TIME: i64 = 1_405_296_000;

    /// Timestamp past which Dark Gravity Wave targets two-minute spacing
    pub const DARK_GRAVITY_SPACING_PIVOT_TIME: i64 = 1_406_160_000;

    /// Mainnet genesis block hash
    pub const GENESIS_HASH_MAIN: &str =
        "7d51af3a7a48bd26513a9a1272c6d86eea234bdbbd1b1dcf71e885a072476ba1";

    /// Testnet genesis block hash
    pub const GENESIS_HASH_TEST: &str =
        "41fed2704bbd9b89e04b10675ae14a13c6e29fc7ce42563b6000f7800e8cace3";
}
