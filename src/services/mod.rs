//! Services Layer
//!
//! Business logic behind the dispatchers. Handlers parse the request,
//! services talk to the database and the media stores.

pub mod analytics;
pub mod catalog;
pub mod currency;
pub mod gamification;
pub mod media;
pub mod purchase;
pub mod settings;
pub mod tracking;
