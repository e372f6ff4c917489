//! Change listeners and the stream stages used to post-process value changes.

mod debounce;
mod distinct;
mod hub;
mod pipeline;

pub use debounce::Debounce;
pub use distinct::DistinctUntilChanged;
pub use hub::{ChangeHub, Listener, Subscription, ValueChange};
pub use pipeline::QuietPeriod;
