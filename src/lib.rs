#![forbid(unsafe_code)]

pub mod audit;
pub mod cli;
pub mod config;
pub mod enrich;
pub mod fetch;
pub mod formats;
pub mod googlebooks;
pub mod load;
pub mod logging;
pub mod normalize;
pub mod nytimes;
pub mod openlibrary;
pub mod pipeline;
pub mod store;
pub mod transform;
