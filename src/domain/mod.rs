// Domain layer: payload model and the service port the demo talks to.

pub mod model;
pub mod ports;
