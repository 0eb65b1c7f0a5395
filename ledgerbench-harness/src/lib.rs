pub mod collector;
pub mod compare;
pub mod config;
pub mod corpus;
pub mod driver;
pub mod error;
pub mod memory;
pub mod report;
pub mod state;
pub mod stats;
pub mod store;
pub mod workload;

pub use error::{HarnessError, Result};
