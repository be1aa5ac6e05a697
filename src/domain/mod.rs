// Domain layer: deployment models and the ports external collaborators implement.

pub mod model;
pub mod ports;
