pub mod enrich;
pub mod provider;
pub mod ratios;
pub mod types;
