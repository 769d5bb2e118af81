pub mod config;
pub mod duck;
pub mod fetch;
pub mod history;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod transform;
pub mod write;

pub use config::EtlConfig;
pub use pipeline::{run, RunReport};
