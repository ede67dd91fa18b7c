pub mod page;
pub mod sink;

pub use page::{Delivery, PageMonitor};
pub use sink::{BadgeStyle, LogSink, NotificationSink, RecordingSink, SinkEvent, status_text};
