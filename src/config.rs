use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub page_title: String,
    pub enable_logging: bool,
    pub tracker_config: TrackerConfig,
    pub map_config: MapConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_title: "Blank".to_string(),
            enable_logging: true,
            tracker_config: TrackerConfig::default(),
            map_config: MapConfig::default(),
        }
    }
}

/// Tope absoluto de puntos por montaje
pub const MAX_TRACK_POINTS: usize = 15;

/// Periodo de muestreo: 5 minutos
pub const POLL_INTERVAL_MS: u32 = 5 * 60 * 1000;

/// Por debajo de esto un intervalo no tiene sentido (0 haría girar el event loop)
pub const MIN_POLL_INTERVAL_MS: u32 = 1000;

/// Parámetros del muestreo de posiciones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Siempre en `1..=MAX_TRACK_POINTS`
    pub max_points: usize,
    pub poll_interval_ms: u32,
    pub invalidate_size_delay_ms: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_points: MAX_TRACK_POINTS,
            poll_interval_ms: POLL_INTERVAL_MS,
            invalidate_size_delay_ms: 200,
        }
    }
}

impl TrackerConfig {
    /// Lleva los valores a rangos válidos: tope en `1..=15`, periodo >= 1 s
    pub fn sanitized(self) -> Self {
        Self {
            max_points: self.max_points.clamp(1, MAX_TRACK_POINTS),
            poll_interval_ms: self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub container_id: String,
    pub initial_zoom: f64,
    pub min_zoom: f64,
    pub max_bounds_viscosity: f64,
    pub tile_url: String,
    pub tile_attribution: String,
    pub tile_no_wrap: bool,
    pub track_color: String,
    pub track_weight: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            container_id: "map".to_string(),
            initial_zoom: 10.0,
            min_zoom: 3.0,
            max_bounds_viscosity: 1.0,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            tile_attribution: "© OpenStreetMap contributors".to_string(),
            tile_no_wrap: true,
            track_color: "blue".to_string(),
            track_weight: 4,
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno en tiempo de compilación
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let tracker = defaults.tracker_config;
        let map = defaults.map_config;

        Self {
            page_title: option_env!("PAGE_TITLE")
                .map(str::to_string)
                .unwrap_or(defaults.page_title),
            enable_logging: parse_or(option_env!("ENABLE_LOGGING"), defaults.enable_logging),
            // El periodo (5 min) y la alta precisión no son configurables
            tracker_config: TrackerConfig {
                max_points: parse_or(option_env!("MAX_TRACK_POINTS"), tracker.max_points),
                invalidate_size_delay_ms: parse_or(
                    option_env!("INVALIDATE_SIZE_DELAY_MS"),
                    tracker.invalidate_size_delay_ms,
                ),
                ..tracker
            }
            .sanitized(),
            map_config: MapConfig {
                container_id: option_env!("MAP_CONTAINER_ID")
                    .map(str::to_string)
                    .unwrap_or(map.container_id),
                initial_zoom: parse_or(option_env!("INITIAL_ZOOM"), map.initial_zoom),
                min_zoom: parse_or(option_env!("MIN_ZOOM"), map.min_zoom),
                max_bounds_viscosity: parse_or(
                    option_env!("MAX_BOUNDS_VISCOSITY"),
                    map.max_bounds_viscosity,
                ),
                tile_url: option_env!("TILE_URL")
                    .map(str::to_string)
                    .unwrap_or(map.tile_url),
                tile_attribution: option_env!("TILE_ATTRIBUTION")
                    .map(str::to_string)
                    .unwrap_or(map.tile_attribution),
                tile_no_wrap: parse_or(option_env!("TILE_NO_WRAP"), map.tile_no_wrap),
                track_color: option_env!("TRACK_COLOR")
                    .map(str::to_string)
                    .unwrap_or(map.track_color),
                track_weight: parse_or(option_env!("TRACK_WEIGHT"), map.track_weight),
            },
        }
    }

    /// Verifica si el modo de logging está habilitado
    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(default)
}

// Configuración global estática
lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}
