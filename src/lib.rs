pub mod agent;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod exec;
pub mod ops;
pub mod safety;
