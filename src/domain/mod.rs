pub mod comment;
pub mod events;
pub mod queue;
pub mod scope;
pub mod shared;
