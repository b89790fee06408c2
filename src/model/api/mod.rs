pub mod candidate;
pub mod chat;
pub mod election;
pub mod id;
pub mod registration;
pub mod vote;
