//! In-process notification hub.
//!
//! A [`Hub`] keeps, per user, the set of live subscriber channels and fans
//! every published [`Event`] out to them. Delivery is best effort: a full
//! subscriber buffer drops the event for that subscriber only, and nothing
//! is persisted or replayed.

pub use event::{Event, Payload};
pub use hub::{DEFAULT_CAPACITY, Hub, Subscription, SubscriptionHandle};

mod event;
mod hub;
