pub mod app;
pub mod deserializers;
pub mod error;
mod routes;
