#![forbid(unsafe_code)]

pub mod events;
pub mod metadata;
pub mod reconcile;
pub mod record;
pub mod uri;
