pub mod aggregator;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod markup;
pub mod matchups;
pub mod matrix;
pub mod meta;
pub mod model;
pub mod pipeline;
pub mod remote;
pub mod score;
pub mod verbose;
