//! Integration test modules

mod dashboard;
mod display;
mod transcript;
