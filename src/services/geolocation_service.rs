// ============================================================================
// GEOLOCATION SERVICE - Posición actual del dispositivo
// ============================================================================
// Navegador: navigator.geolocation (callbacks -> future)
// Capacitor: Capacitor.Plugins.Geolocation (Promise -> future)
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::models::Position;

/// Opciones de la petición; nunca se pasa timeout propio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
}

impl PositionOptions {
    pub fn high_accuracy() -> Self {
        Self { enable_high_accuracy: true }
    }
}

/// Fuente de posiciones del dispositivo
#[allow(async_fn_in_trait)]
pub trait Geolocator {
    async fn current_position(&self, options: PositionOptions) -> Result<Position, GeolocationError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeolocationError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    /// No hay API de geolocalización en esta plataforma
    Unsupported,
    Unknown(String),
}

impl GeolocationError {
    /// Clasifica un error de plataforma: códigos W3C (1, 2, 3) o, si no hay
    /// código numérico, el mensaje (Capacitor rechaza con texto)
    pub fn classify(code: Option<f64>, message: &str) -> Self {
        match code.map(|c| c as u16) {
            Some(1) => return GeolocationError::PermissionDenied,
            Some(2) => return GeolocationError::PositionUnavailable,
            Some(3) => return GeolocationError::Timeout,
            _ => {}
        }

        let lower = message.to_lowercase();
        if lower.contains("denied") || lower.contains("permission") {
            GeolocationError::PermissionDenied
        } else if lower.contains("timeout") || lower.contains("timed out") {
            GeolocationError::Timeout
        } else if lower.contains("unavailable") || lower.contains("location services") {
            GeolocationError::PositionUnavailable
        } else if lower.contains("not implemented") || lower.contains("not available") {
            GeolocationError::Unsupported
        } else {
            GeolocationError::Unknown(message.to_string())
        }
    }

    fn from_js(error: &JsValue) -> Self {
        let code = js_sys::Reflect::get(error, &JsValue::from_str("code"))
            .ok()
            .and_then(|c| c.as_f64());
        let message = js_sys::Reflect::get(error, &JsValue::from_str("message"))
            .ok()
            .and_then(|m| m.as_string())
            .or_else(|| error.as_string())
            .unwrap_or_else(|| format!("{:?}", error));
        Self::classify(code, &message)
    }
}

impl std::fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeolocationError::PermissionDenied => write!(f, "Location permission denied"),
            GeolocationError::PositionUnavailable => write!(f, "Position unavailable"),
            GeolocationError::Timeout => write!(f, "Location request timed out"),
            GeolocationError::Unsupported => write!(f, "Geolocation is not supported"),
            GeolocationError::Unknown(msg) => write!(f, "Unknown geolocation error: {}", msg),
        }
    }
}

impl std::error::Error for GeolocationError {}

/// Construye una `Position` a partir de coordenadas crudas
pub fn position_from_coords(latitude: Option<f64>, longitude: Option<f64>) -> Result<Position, GeolocationError> {
    match (latitude, longitude) {
        (Some(lat), Some(lng)) => {
            let position = Position::new(lat, lng);
            if position.is_valid() {
                Ok(position)
            } else {
                Err(GeolocationError::PositionUnavailable)
            }
        }
        _ => Err(GeolocationError::PositionUnavailable),
    }
}

/// `{ coords: { latitude, longitude } }` (mismo formato en W3C y Capacitor)
fn position_from_js(value: &JsValue) -> Result<Position, GeolocationError> {
    let coords = js_sys::Reflect::get(value, &JsValue::from_str("coords"))
        .map_err(|_| GeolocationError::PositionUnavailable)?;
    let read = |key: &str| {
        js_sys::Reflect::get(&coords, &JsValue::from_str(key))
            .ok()
            .and_then(|v| v.as_f64())
    };
    position_from_coords(read("latitude"), read("longitude"))
}

// ----------------------------------------------------------------------------
// Navegador
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserGeolocation;

impl Geolocator for BrowserGeolocation {
    async fn current_position(&self, options: PositionOptions) -> Result<Position, GeolocationError> {
        let geolocation = web_sys::window()
            .ok_or(GeolocationError::Unsupported)?
            .navigator()
            .geolocation()
            .map_err(|_| GeolocationError::Unsupported)?;

        let (tx, rx) = oneshot::channel::<Result<Position, GeolocationError>>();
        let tx = Rc::new(RefCell::new(Some(tx)));

        let on_success = Closure::wrap(Box::new({
            let tx = tx.clone();
            move |value: JsValue| {
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(position_from_js(&value));
                }
            }
        }) as Box<dyn FnMut(JsValue)>);

        let on_error = Closure::wrap(Box::new({
            let tx = tx.clone();
            move |error: JsValue| {
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(Err(GeolocationError::from_js(&error)));
                }
            }
        }) as Box<dyn FnMut(JsValue)>);

        let js_options = web_sys::PositionOptions::new();
        js_options.set_enable_high_accuracy(options.enable_high_accuracy);

        geolocation
            .get_current_position_with_error_callback_and_options(
                on_success.as_ref().unchecked_ref(),
                Some(on_error.as_ref().unchecked_ref()),
                &js_options,
            )
            .map_err(|e| GeolocationError::from_js(&e))?;

        // Los closures tienen que seguir vivos hasta que JS responda
        let result = rx
            .await
            .unwrap_or_else(|_| Err(GeolocationError::Unknown("geolocation callback dropped".into())));
        drop(on_success);
        drop(on_error);
        result
    }
}

// ----------------------------------------------------------------------------
// Capacitor (app nativa)
// ----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CapacitorGeolocation {
    plugin: JsValue,
}

impl CapacitorGeolocation {
    /// `window.Capacitor.Plugins.Geolocation`, si existe
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let mut current: JsValue = window.into();
        for key in ["Capacitor", "Plugins", "Geolocation"] {
            current = js_sys::Reflect::get(&current, &JsValue::from_str(key)).ok()?;
            if current.is_undefined() || current.is_null() {
                return None;
            }
        }
        Some(Self { plugin: current })
    }
}

impl Geolocator for CapacitorGeolocation {
    async fn current_position(&self, options: PositionOptions) -> Result<Position, GeolocationError> {
        let method = js_sys::Reflect::get(&self.plugin, &JsValue::from_str("getCurrentPosition"))
            .ok()
            .and_then(|m| m.dyn_into::<js_sys::Function>().ok())
            .ok_or(GeolocationError::Unsupported)?;

        let js_options = js_sys::Object::new();
        js_sys::Reflect::set(
            &js_options,
            &JsValue::from_str("enableHighAccuracy"),
            &JsValue::from_bool(options.enable_high_accuracy),
        )
        .map_err(|e| GeolocationError::from_js(&e))?;

        let promise = method
            .call1(&self.plugin, &js_options)
            .map_err(|e| GeolocationError::from_js(&e))?
            .dyn_into::<js_sys::Promise>()
            .map_err(|_| GeolocationError::Unknown("getCurrentPosition did not return a Promise".into()))?;

        let value = JsFuture::from(promise)
            .await
            .map_err(|e| GeolocationError::from_js(&e))?;
        position_from_js(&value)
    }
}

// ----------------------------------------------------------------------------
// Selección por plataforma
// ----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum PlatformGeolocator {
    Capacitor(CapacitorGeolocation),
    Browser(BrowserGeolocation),
}

impl PlatformGeolocator {
    /// Capacitor dentro de la app nativa, navegador en cualquier otro caso
    pub fn detect() -> Self {
        match CapacitorGeolocation::detect() {
            Some(capacitor) => {
                log::info!("📱 Geolocalización vía Capacitor");
                PlatformGeolocator::Capacitor(capacitor)
            }
            None => {
                log::info!("🌐 Geolocalización vía navigator.geolocation");
                PlatformGeolocator::Browser(BrowserGeolocation)
            }
        }
    }
}

impl Geolocator for PlatformGeolocator {
    async fn current_position(&self, options: PositionOptions) -> Result<Position, GeolocationError> {
        match self {
            PlatformGeolocator::Capacitor(g) => g.current_position(options).await,
            PlatformGeolocator::Browser(g) => g.current_position(options).await,
        }
    }
}
