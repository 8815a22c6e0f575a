//! SeaORM entities of the local record store.

pub mod record;

pub use record::{Column as RecordColumn, Entity as Record, Model as RecordModel};
