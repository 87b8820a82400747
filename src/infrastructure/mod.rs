pub mod broker;
pub mod database;
pub mod repositories;
