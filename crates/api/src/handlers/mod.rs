//! HTTP request handlers

pub mod ai;
pub mod auth;
pub mod brewlogs;
pub mod coffees;
pub mod health;
pub mod users;
