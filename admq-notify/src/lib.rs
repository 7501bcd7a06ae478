//! Best-effort notification dispatch, decoupled from registration
//! admission: a durable Redis queue, a submit client, and a delivery
//! worker with attempt-capped exponential backoff. Nothing here shares a
//! lock or a blocking call with the admission path; a broker outage costs
//! notifications, never registrations.

mod notify_client;
mod notify_job;
mod notify_worker;

pub use notify_client::NotifyClient;
pub use notify_job::{Notification, NotificationKind, NotifySender, TracingSender};
pub use notify_worker::NotifyWorker;
