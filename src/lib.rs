pub mod analysis;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod present;
pub mod record;
pub mod report;
pub mod table;
