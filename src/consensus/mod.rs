//! Consensus module - targets, retarget algorithms, and work arithmetic

mod block;
mod dark_gravity;
mod difficulty;
mod digishield;
mod kimoto;
mod params;
mod target;
mod work;

pub use block::*;
pub use dark_gravity::*;
pub use difficulty::*;
pub use digishield::*;
pub use kimoto::*;
pub use params::*;
pub use target::*;
pub use work::*;
