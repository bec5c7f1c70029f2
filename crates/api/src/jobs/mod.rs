//! Background job scheduler and job implementations.

mod activity_nudge;
mod dispatch_notifications;
mod gap_detection;
mod scheduler;
mod token_cleanup;

pub use activity_nudge::ActivityNudgeJob;
pub use dispatch_notifications::DispatchNotificationsJob;
pub use gap_detection::GapDetectionJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
pub use token_cleanup::TokenCleanupJob;
