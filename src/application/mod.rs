pub mod moderation;
pub mod queues;
