//! Domain models for the TreeMatch recommendation engine

mod behavior;
mod location;
mod profile;
mod recommendation;
mod species;
mod weather;

pub use behavior::*;
pub use location::*;
pub use profile::*;
pub use recommendation::*;
pub use species::*;
pub use weather::*;
