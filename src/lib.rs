pub mod analyzers;
pub mod classify;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod quarter;
pub mod records;
pub mod signal;
