pub mod config;
pub mod containers;
pub mod nonstandard;
pub mod preset;
pub mod primitives;
pub mod traits;
