//! Pure recommendation engine
//!
//! Everything here is synchronous and operates on caller-supplied inputs;
//! there is no memoization between calls, so re-ranking after a profile or
//! weather change is simply another call.

pub mod compatibility;
pub mod ranking;
pub mod seasonal;
pub mod similarity;
pub mod success;
pub mod weather_fit;
pub mod weights;

pub use compatibility::*;
pub use ranking::*;
pub use seasonal::*;
pub use similarity::*;
pub use success::*;
pub use weather_fit::*;
pub use weights::*;
