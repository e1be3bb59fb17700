pub mod api;
pub mod auth;
pub mod common;
pub mod election;
pub mod mongodb;
pub mod registry;
