//! Roofline event bus and outbound email.
//!
//! - [`EventBus`] is the in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`; handlers publish a [`PlatformEvent`] after
//!   each notifiable mutation.
//! - [`delivery::email`] sends plain-text mail over SMTP.
//! - [`templates`] renders the subject and body for each notification kind.

pub mod bus;
pub mod delivery;
pub mod templates;

pub use bus::{event_types, EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use templates::Notification;
