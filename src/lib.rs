// ============================================================================
// LOCATION TRAIL - Recorrido del usuario sobre un mapa Leaflet
// ============================================================================
// Arquitectura MVVM:
// - Components/Hooks: Yew, solo ciclo de vida y render
// - ViewModels: estado + lógica del tracker
// - Services: geolocalización y event loop (timers, tareas)
// - Maps: trait de mapa + implementación Leaflet
// - State: estado privado del tracker + notificaciones
// - Models: tipos compartidos
// ============================================================================

pub mod components;
pub mod config;
pub mod hooks;
pub mod maps;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
pub mod viewmodels;
