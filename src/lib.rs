pub mod social {
    pub mod config;
    pub mod directive;
    pub mod error;
    pub mod graph;
    pub mod ingest;
    pub mod macros;
    pub mod network;
    pub mod report;
    pub mod utils;
}
