// ============================================================================
// LEAFLET FFI - Bindings a la global `L` de Leaflet
// ============================================================================
// Solo wrappers para funciones JS - Sin estado, sin lógica
// ============================================================================

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// `L.Map`
    pub type LeafletMap;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    pub fn create_map(container_id: &str, options: &JsValue) -> Result<LeafletMap, JsValue>;

    #[wasm_bindgen(method, js_name = setView)]
    pub fn set_view(this: &LeafletMap, center: &LatLng, zoom: f64) -> LeafletMap;

    #[wasm_bindgen(method, js_name = panTo)]
    pub fn pan_to(this: &LeafletMap, center: &LatLng) -> LeafletMap;

    #[wasm_bindgen(method, js_name = invalidateSize)]
    pub fn invalidate_size(this: &LeafletMap) -> LeafletMap;

    #[wasm_bindgen(method)]
    pub fn remove(this: &LeafletMap) -> LeafletMap;

    /// `L.LatLng`
    pub type LatLng;

    #[wasm_bindgen(js_namespace = L, js_name = latLng)]
    pub fn lat_lng(lat: f64, lng: f64) -> LatLng;

    /// `L.Layer` (tile layers, marcadores, polilíneas)
    pub type Layer;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Layer, map: &LeafletMap) -> Layer;

    #[wasm_bindgen(catch, js_namespace = L, js_name = tileLayer)]
    pub fn tile_layer(url_template: &str, options: &JsValue) -> Result<Layer, JsValue>;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    pub fn marker(at: &LatLng) -> Layer;

    /// `L.Polyline`
    #[wasm_bindgen(extends = Layer)]
    pub type Polyline;

    #[wasm_bindgen(js_namespace = L, js_name = polyline)]
    pub fn polyline(lat_lngs: &js_sys::Array, options: &JsValue) -> Polyline;

    #[wasm_bindgen(method, js_name = setLatLngs)]
    pub fn set_lat_lngs(this: &Polyline, lat_lngs: &js_sys::Array) -> Polyline;
}

/// Helper: ¿está `window.L` disponible?
pub fn is_leaflet_loaded() -> bool {
    web_sys::window()
        .and_then(|window| js_sys::Reflect::get(&window, &JsValue::from_str("L")).ok())
        .map(|l| !l.is_undefined() && !l.is_null())
        .unwrap_or(false)
}
