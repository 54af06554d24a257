#![cfg(test)]

pub mod common;
pub mod pipeline_tests;
pub mod application_tests;
