//! Route handlers

pub mod features;
pub mod predictions;
