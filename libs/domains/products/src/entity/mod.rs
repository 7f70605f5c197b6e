//! Sea-ORM entities backing the Postgres repository

pub mod category;
pub mod product;
