pub mod api;
pub mod config;
pub mod db;
pub mod entities;
pub mod metrics;
pub mod migrator;
pub mod services;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
mod test_support;

pub use sea_orm;
