use wasm_bindgen::JsValue;

use crate::models::Position;
use crate::utils::leaflet_ffi::{self, LeafletMap, Layer, Polyline};
use super::{MapError, MapFactory, MapOptions, MapSurface, MarkerId, PolylineId, PolylineStyle, TileLayerOptions};

/// Crea mapas Leaflet sobre elementos del DOM
#[derive(Debug, Clone, Copy, Default)]
pub struct LeafletMapFactory;

impl MapFactory for LeafletMapFactory {
    type Map = LeafletSurface;

    fn create_map(
        &self,
        container_id: &str,
        center: Position,
        zoom: f64,
        options: &MapOptions,
    ) -> Result<LeafletSurface, MapError> {
        if !leaflet_ffi::is_leaflet_loaded() {
            return Err(MapError::LibraryMissing);
        }
        if !center.is_valid() {
            return Err(MapError::InvalidCoordinates(center));
        }

        let container_exists = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(container_id))
            .is_some();
        if !container_exists {
            return Err(MapError::ContainerNotFound(container_id.to_string()));
        }

        let js_options = to_js(options)?;
        let map = leaflet_ffi::create_map(container_id, &js_options).map_err(js_error)?;
        map.set_view(&lat_lng(center), zoom);

        log::info!("🗺️ Mapa Leaflet creado en #{} centrado en {} (zoom {})", container_id, center, zoom);

        Ok(LeafletSurface {
            map,
            layers: Vec::new(),
            markers: Vec::new(),
            polylines: Vec::new(),
            removed: false,
        })
    }
}

/// Mapa Leaflet vivo más las capas que le hemos añadido
pub struct LeafletSurface {
    map: LeafletMap,
    layers: Vec<Layer>,
    markers: Vec<Layer>,
    polylines: Vec<Polyline>,
    removed: bool,
}

impl LeafletSurface {
    fn ensure_alive(&self) -> Result<(), MapError> {
        if self.removed {
            Err(MapError::Removed)
        } else {
            Ok(())
        }
    }
}

impl MapSurface for LeafletSurface {
    fn add_tile_layer(&mut self, url_template: &str, options: &TileLayerOptions) -> Result<(), MapError> {
        self.ensure_alive()?;
        let js_options = to_js(options)?;
        let layer = leaflet_ffi::tile_layer(url_template, &js_options).map_err(js_error)?;
        layer.add_to(&self.map);
        self.layers.push(layer);
        Ok(())
    }

    fn add_marker(&mut self, at: Position) -> Result<MarkerId, MapError> {
        self.ensure_alive()?;
        let marker = leaflet_ffi::marker(&lat_lng(at));
        marker.add_to(&self.map);
        self.markers.push(marker);
        Ok(MarkerId(self.markers.len() - 1))
    }

    fn add_polyline(&mut self, vertices: &[Position], style: &PolylineStyle) -> Result<PolylineId, MapError> {
        self.ensure_alive()?;
        let js_style = to_js(style)?;
        let polyline = leaflet_ffi::polyline(&lat_lng_array(vertices), &js_style);
        polyline.add_to(&self.map);
        self.polylines.push(polyline);
        Ok(PolylineId(self.polylines.len() - 1))
    }

    fn set_polyline_vertices(&mut self, id: PolylineId, vertices: &[Position]) -> Result<(), MapError> {
        self.ensure_alive()?;
        let polyline = self.polylines.get(id.0).ok_or(MapError::UnknownPolyline(id))?;
        polyline.set_lat_lngs(&lat_lng_array(vertices));
        Ok(())
    }

    fn pan_to(&mut self, at: Position) -> Result<(), MapError> {
        self.ensure_alive()?;
        self.map.pan_to(&lat_lng(at));
        Ok(())
    }

    fn invalidate_size(&mut self) {
        if !self.removed {
            self.map.invalidate_size();
        }
    }

    fn remove(&mut self) {
        if self.removed {
            return;
        }
        // map.remove() también destruye todas las capas añadidas
        self.map.remove();
        self.layers.clear();
        self.markers.clear();
        self.polylines.clear();
        self.removed = true;
    }
}

fn lat_lng(position: Position) -> leaflet_ffi::LatLng {
    leaflet_ffi::lat_lng(position.latitude, position.longitude)
}

fn lat_lng_array(vertices: &[Position]) -> js_sys::Array {
    vertices
        .iter()
        .map(|p| JsValue::from(lat_lng(*p)))
        .collect()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, MapError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| MapError::Js(e.to_string()))
}

fn js_error(e: JsValue) -> MapError {
    MapError::Js(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}
