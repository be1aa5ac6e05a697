// Adapters layer: concrete artifact sources and deployers.

pub mod artifacts;
pub mod deployers;
