pub mod analyzers;
pub mod config;
pub mod dates;
pub mod error;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod record;
pub mod refresh;
pub mod snapshot;
