// Módulo de mapas: trait común + implementación Leaflet

pub mod leaflet;
pub mod traits;

pub use leaflet::LeafletMapFactory;
pub use traits::*;
