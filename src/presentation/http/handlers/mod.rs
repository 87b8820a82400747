pub mod actions;
pub mod auth;
pub mod comments;
pub mod health;
pub mod queues;
pub mod stream;
