pub mod events;
pub mod registry;
pub mod scheduler;

pub use events::{ClientMessage, ServerEvent, NEWS_CHANNEL};
pub use registry::{ClientId, EventReceiver, SubscriptionRegistry};
pub use scheduler::{BroadcastConfig, BroadcastScheduler, SchedulerHandle, TickOutcome};
