// Domain layer: benchmark models and ports. No process or file handling here.

pub mod model;
pub mod ports;
