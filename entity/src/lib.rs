use uuid::Uuid;

// Core entities
pub mod action_items;
pub mod meetings;
pub mod notifications;
pub mod teams;
pub mod users;

// Enumerations shared across entities
pub mod member_status;
pub mod priority;
pub mod roles;
pub mod status;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
