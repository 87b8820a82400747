pub mod connection;
pub mod paginator;
pub mod reconciler;
pub mod view;
