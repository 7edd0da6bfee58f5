use serde::Serialize;

use crate::config::MapConfig;
use crate::models::Position;

/// Identificador de un marcador dentro de un mapa
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub usize);

/// Identificador de una polilínea dentro de un mapa
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PolylineId(pub usize);

/// Crea mapas enlazados a un contenedor del DOM
pub trait MapFactory {
    type Map: MapSurface;

    /// Crear un mapa en `container_id` centrado en `center`
    fn create_map(
        &self,
        container_id: &str,
        center: Position,
        zoom: f64,
        options: &MapOptions,
    ) -> Result<Self::Map, MapError>;
}

/// Operaciones de un mapa ya creado
pub trait MapSurface {
    fn add_tile_layer(&mut self, url_template: &str, options: &TileLayerOptions) -> Result<(), MapError>;

    fn add_marker(&mut self, at: Position) -> Result<MarkerId, MapError>;

    fn add_polyline(&mut self, vertices: &[Position], style: &PolylineStyle) -> Result<PolylineId, MapError>;

    /// Reemplaza la lista completa de vértices de la polilínea
    fn set_polyline_vertices(&mut self, id: PolylineId, vertices: &[Position]) -> Result<(), MapError>;

    /// Desplazamiento animado (no salta)
    fn pan_to(&mut self, at: Position) -> Result<(), MapError>;

    /// Recalcula el tamaño interno tras cambios de layout
    fn invalidate_size(&mut self);

    /// Destruye el mapa y todas sus capas
    fn remove(&mut self);
}

/// Opciones de creación del mapa (camelCase = nombres de Leaflet)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    pub min_zoom: f64,
    /// Sin `maxBounds` configurados no tiene efecto
    pub max_bounds_viscosity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayerOptions {
    pub no_wrap: bool,
    pub attribution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolylineStyle {
    pub color: String,
    pub weight: u32,
}

impl From<&MapConfig> for MapOptions {
    fn from(config: &MapConfig) -> Self {
        Self {
            min_zoom: config.min_zoom,
            max_bounds_viscosity: config.max_bounds_viscosity,
        }
    }
}

impl From<&MapConfig> for TileLayerOptions {
    fn from(config: &MapConfig) -> Self {
        Self {
            no_wrap: config.tile_no_wrap,
            attribution: config.tile_attribution.clone(),
        }
    }
}

impl From<&MapConfig> for PolylineStyle {
    fn from(config: &MapConfig) -> Self {
        Self {
            color: config.track_color.clone(),
            weight: config.track_weight,
        }
    }
}

/// Error del mapa
#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    /// La librería de mapas no está cargada en la página
    LibraryMissing,
    ContainerNotFound(String),
    InvalidCoordinates(Position),
    UnknownPolyline(PolylineId),
    Removed,
    Js(String),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::LibraryMissing => write!(f, "Map library is not loaded"),
            MapError::ContainerNotFound(id) => write!(f, "Map container '#{}' not found", id),
            MapError::InvalidCoordinates(p) => write!(f, "Invalid coordinates {}", p),
            MapError::UnknownPolyline(id) => write!(f, "Unknown polyline {}", id.0),
            MapError::Removed => write!(f, "Map was already removed"),
            MapError::Js(msg) => write!(f, "JS error: {}", msg),
        }
    }
}

impl std::error::Error for MapError {}
