//! Geographic coordinate value type.
//!
//! [`Coordinate`] is the unit every other module exchanges: the position
//! service produces it, the tracker stores it in the trail and the camera
//! controller centers on it.

mod types;

pub use types::{CoordError, Coordinate, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
