pub mod agent;
pub mod api;
pub mod config;
pub mod controller;
pub mod extraction;
pub mod prompts;
pub mod score;
pub mod session;
