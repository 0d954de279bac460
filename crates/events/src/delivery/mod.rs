//! Outbound delivery channels.

pub mod email;
