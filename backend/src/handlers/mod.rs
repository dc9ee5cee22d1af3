//! HTTP handlers

mod behavior;
mod health;
mod location;
mod recommendation;
mod zone;

pub use behavior::*;
pub use health::*;
pub use location::*;
pub use recommendation::*;
pub use zone::*;

use rust_decimal::Decimal;
use validator::ValidationError;

fn validate_latitude(latitude: &Decimal) -> Result<(), ValidationError> {
    shared::validate_latitude(*latitude).map_err(|_| ValidationError::new("latitude_range"))
}

fn validate_longitude(longitude: &Decimal) -> Result<(), ValidationError> {
    shared::validate_longitude(*longitude).map_err(|_| ValidationError::new("longitude_range"))
}
