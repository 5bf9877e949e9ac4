pub mod actions;
pub mod audit;
pub mod cli;
pub mod error;
pub mod policy;
pub mod runtime;
pub mod settings;
