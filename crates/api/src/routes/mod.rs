pub mod callbacks;
pub mod envvars;
pub mod health;
pub mod logs;
pub mod previews;
pub mod services;
pub mod user;
pub mod webhooks;
