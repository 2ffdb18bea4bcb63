pub mod dispatcher;
pub mod email;
pub mod templates;

pub use dispatcher::NotificationDispatcher;
pub use email::EmailDispatcher;
