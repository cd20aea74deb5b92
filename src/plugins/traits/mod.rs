pub mod notifier;

pub use notifier::{NotificationField, NotificationMessage, NotifierPlugin};
