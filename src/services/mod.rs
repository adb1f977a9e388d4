pub mod chat_summary;
pub mod providers;
pub mod recent_activity;

pub use chat_summary::ChatSummaryWriter;
pub use recent_activity::{FeedNotifier, FeedSubscription, RecentActivityFeed};
