// Adapters layer: turn outside input (CLI pairs, JSON, CSV) into parameter mappings and back.

pub mod csv_batch;
pub mod input;
