//! Configuration management for building and solving formulas

pub mod settings;

pub use settings::{
    CliOverrides, EnumerationConfig, OutputConfig, OutputFormat, Settings, SolverBackend,
    SolverConfig, StoreConfig,
};
