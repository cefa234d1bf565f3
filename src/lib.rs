// Library for tests to access modules

pub mod collector;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod routes;
pub mod store;
