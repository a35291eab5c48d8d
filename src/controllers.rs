pub mod auth;
pub mod health;
pub mod photos;
pub mod ping;
pub mod token;
