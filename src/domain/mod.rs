// Domain layer: core models and ports (interfaces) for font acquisition.

pub mod model;
pub mod ports;
