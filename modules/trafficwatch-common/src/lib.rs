pub mod config;
pub mod error;
pub mod geo;
pub mod types;

pub use config::Config;
pub use error::{TrafficWatchError, ValidationError};
pub use geo::{haversine_km, EARTH_RADIUS_KM};
pub use types::*;
