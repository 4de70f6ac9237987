//! Platform position service abstraction.
//!
//! The [`PositionService`] trait is the boundary to the OS location API:
//! a bounded one-shot fix plus a continuous subscription that delivers
//! [`PositionEvent`]s to a sink until the [`SubscriptionHandle`] is given
//! back through [`PositionService::unsubscribe`].

mod options;
mod service;

pub use options::{AccuracyTier, ParseAccuracyError, WatchOptions, DEFAULT_UPDATE_INTERVAL};
pub use service::{PositionError, PositionEvent, PositionService, PositionSink, SubscriptionHandle};
