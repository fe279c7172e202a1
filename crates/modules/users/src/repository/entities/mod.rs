//! SeaORM entities owned by the users module.

pub mod user;
