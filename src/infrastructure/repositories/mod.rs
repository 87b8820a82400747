pub mod memory_comment_store;
pub mod sqlx_comment_store;
