//! Database entities

pub mod webhook;

pub use webhook::Entity as Webhook;
