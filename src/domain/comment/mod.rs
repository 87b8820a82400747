pub mod entity;
pub mod errors;
pub mod media;
pub mod store;
