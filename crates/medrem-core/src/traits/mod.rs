//! Capability traits defined in `medrem-core` and implemented by other crates.

pub mod clock;
pub mod push;

pub use clock::{Clock, FixedClock, SystemClock};
pub use push::{DeliveryStatus, PushDelivery, PushMessage, PushSender};
