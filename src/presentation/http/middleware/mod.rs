pub mod moderator;
pub mod request_id;
