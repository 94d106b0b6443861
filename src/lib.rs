pub mod aggregate;
pub mod bucket;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod sources;
pub mod stats;
pub mod window;
