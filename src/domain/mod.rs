// Domain layer: feature values, rows and the model port. No I/O here.

pub mod model;
pub mod ports;
