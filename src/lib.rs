//! deployer - deployment artifacts for Phoenix applications
//!
//! Analyzes the `mix.exs` of a GitHub repository, renders a Dockerfile,
//! Terraform files and a GitHub Actions workflow for Cloud Run, estimates
//! the monthly cost and reviews the setup for security issues.

pub mod analyzer;
pub mod cli;
pub mod commands;
pub mod config;
pub mod generator;
pub mod global;
pub mod home;
pub mod pricing;
pub mod security;
pub mod wizard;
