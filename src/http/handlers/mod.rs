pub mod auth;
pub mod core;
pub mod pages;
pub mod reports;
