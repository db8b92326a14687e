pub mod auth;
pub mod responses;
pub mod tokens;
