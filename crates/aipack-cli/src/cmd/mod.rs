pub mod agent;
pub mod config;
pub mod hook;
pub mod install;
pub mod upgrade;
