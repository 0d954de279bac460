//! Email notifications driven by the event bus.
//!
//! The [`NotificationDispatcher`] subscribes to the bus, resolves recipients
//! from the database and sends templated email.

pub mod dispatcher;

pub use dispatcher::NotificationDispatcher;
