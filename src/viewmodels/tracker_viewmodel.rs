// ============================================================================
// TRACKER VIEWMODEL - Posición inicial, mapa, muestreo periódico y teardown
// ============================================================================
// Un `LocationTracker` por montaje del componente. Todo corre en el event
// loop (un hilo): el estado vive en un RefCell y nunca se presta a través
// de un `.await`.
// ============================================================================

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::{MapConfig, TrackerConfig};
use crate::maps::{MapError, MapFactory, MapOptions, MapSurface, MarkerId, PolylineId, PolylineStyle, TileLayerOptions};
use crate::models::Position;
use crate::services::{GeolocationError, Geolocator, PositionOptions, Scheduler};
use crate::state::{Subscribers, TrackerPhase, TrackerSnapshot, TrackerState};

/// Resultado de una lectura del intervalo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Punto añadido; `count` = longitud tras añadirlo
    Appended { count: usize },
    /// Tope alcanzado; el intervalo queda cancelado
    Capped,
    /// Otra lectura sigue en curso
    Busy,
    /// El tracker no está muestreando (sin iniciar, fallido o desmontado)
    Inactive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackerError {
    Geolocation(GeolocationError),
    Map(MapError),
    /// El componente se desmontó mientras la operación estaba en curso
    Disposed,
    AlreadyStarted(TrackerPhase),
}

impl std::fmt::Display for TrackerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerError::Geolocation(e) => write!(f, "Geolocation error: {}", e),
            TrackerError::Map(e) => write!(f, "Map error: {}", e),
            TrackerError::Disposed => write!(f, "Tracker was disposed"),
            TrackerError::AlreadyStarted(phase) => write!(f, "Tracker already started ({})", phase.as_str()),
        }
    }
}

impl std::error::Error for TrackerError {}

impl From<GeolocationError> for TrackerError {
    fn from(e: GeolocationError) -> Self {
        TrackerError::Geolocation(e)
    }
}

impl From<MapError> for TrackerError {
    fn from(e: MapError) -> Self {
        TrackerError::Map(e)
    }
}

struct TrackerInner<G, F: MapFactory, S: Scheduler> {
    tracker_config: TrackerConfig,
    map_config: MapConfig,
    geolocator: G,
    maps: F,
    scheduler: S,
    state: RefCell<TrackerState<F::Map, S::Interval>>,
    subscribers: Subscribers<TrackerSnapshot>,
}

impl<G, F: MapFactory, S: Scheduler> Drop for TrackerInner<G, F, S> {
    fn drop(&mut self) {
        // El intervalo se cancela al soltarse junto con el estado
        if let Some(mut map) = self.state.get_mut().map.take() {
            map.remove();
        }
    }
}

/// Tracker de ubicación + mapa. Clonar comparte la misma instancia.
pub struct LocationTracker<G, F: MapFactory, S: Scheduler> {
    inner: Rc<TrackerInner<G, F, S>>,
}

impl<G, F: MapFactory, S: Scheduler> Clone for LocationTracker<G, F, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<G, F, S> LocationTracker<G, F, S>
where
    G: Geolocator + 'static,
    F: MapFactory + 'static,
    F::Map: 'static,
    S: Scheduler + 'static,
{
    pub fn new(
        geolocator: G,
        maps: F,
        scheduler: S,
        tracker_config: TrackerConfig,
        map_config: MapConfig,
    ) -> Self {
        let tracker_config = tracker_config.sanitized();
        let max_points = tracker_config.max_points;
        Self {
            inner: Rc::new(TrackerInner {
                tracker_config,
                map_config,
                geolocator,
                maps,
                scheduler,
                state: RefCell::new(TrackerState::new(max_points)),
                subscribers: Subscribers::new(),
            }),
        }
    }

    fn from_weak(weak: &Weak<TrackerInner<G, F, S>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        self.inner.state.borrow().snapshot()
    }

    pub fn phase(&self) -> TrackerPhase {
        self.inner.state.borrow().phase
    }

    /// Copia de la secuencia de puntos en orden de llegada
    pub fn points(&self) -> Vec<Position> {
        self.inner.state.borrow().points.as_slice().to_vec()
    }

    pub fn marker_count(&self) -> usize {
        self.inner.state.borrow().markers.len()
    }

    pub fn is_polling(&self) -> bool {
        self.inner.state.borrow().interval.is_some()
    }

    pub fn has_map(&self) -> bool {
        self.inner.state.borrow().map.is_some()
    }

    /// Recibir un snapshot tras cada cambio de fase o punto nuevo
    pub fn subscribe<C>(&self, callback: C)
    where
        C: Fn(&TrackerSnapshot) + 'static,
    {
        self.inner.subscribers.subscribe(callback);
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        self.inner.subscribers.notify(&snapshot);
    }

    fn max_points(&self) -> usize {
        self.inner.state.borrow().points.capacity()
    }

    // ------------------------------------------------------------------------
    // Montaje
    // ------------------------------------------------------------------------

    /// Arranca la inicialización en segundo plano; los errores solo se registran
    pub fn mount(&self) {
        if let Err(e) = self.begin() {
            log::warn!("⚠️ {}, ignorando", e);
            return;
        }

        let tracker = self.clone();
        self.inner.scheduler.spawn_local(async move {
            match tracker.acquire_first_fix().await {
                Ok(()) => {}
                Err(TrackerError::Disposed) => {
                    log::info!("🔌 Inicialización descartada: el mapa ya fue desmontado");
                }
                Err(e) => {
                    log::error!("❌ Error al obtener la ubicación: {}", e);
                }
            }
        });
    }

    /// Primera posición, creación del mapa y arranque del intervalo
    pub async fn initialize(&self) -> Result<(), TrackerError> {
        self.begin()?;
        self.acquire_first_fix().await
    }

    /// `Uninitialized -> AwaitingFirstFix`
    fn begin(&self) -> Result<(), TrackerError> {
        {
            let mut state = self.inner.state.borrow_mut();
            match state.phase {
                TrackerPhase::Uninitialized => state.phase = TrackerPhase::AwaitingFirstFix,
                TrackerPhase::Disposed => return Err(TrackerError::Disposed),
                other => return Err(TrackerError::AlreadyStarted(other)),
            }
        }
        self.notify();
        Ok(())
    }

    async fn acquire_first_fix(&self) -> Result<(), TrackerError> {
        log::info!("📍 Solicitando posición inicial...");
        let fix = self.inner.geolocator.current_position(PositionOptions::high_accuracy()).await;

        if self.inner.state.borrow().is_disposed() {
            return Err(TrackerError::Disposed);
        }

        let start = match fix {
            Ok(position) => position,
            Err(e) => {
                self.fail_init();
                return Err(e.into());
            }
        };

        if let Err(e) = self.build_map(start) {
            self.fail_init();
            return Err(e);
        }
        log::info!("✅ Mapa inicializado en {}", start);

        self.schedule_invalidate_size();

        if self.inner.state.borrow().points.is_full() {
            self.cap();
        } else {
            self.start_polling();
        }
        self.notify();
        Ok(())
    }

    fn fail_init(&self) {
        self.inner.state.borrow_mut().phase = TrackerPhase::FailedInit;
        self.notify();
    }

    fn build_map(&self, start: Position) -> Result<(), TrackerError> {
        let map_config = &self.inner.map_config;
        let mut map = self.inner.maps.create_map(
            &map_config.container_id,
            start,
            map_config.initial_zoom,
            &MapOptions::from(map_config),
        )?;

        let (marker, polyline) = match decorate_map(&mut map, start, map_config) {
            Ok(ids) => ids,
            Err(e) => {
                // Un mapa a medio construir no debe quedar en el DOM
                map.remove();
                return Err(e.into());
            }
        };

        let mut state = self.inner.state.borrow_mut();
        state.points.push(start);
        state.markers.push(marker);
        state.polyline = Some(polyline);
        state.map = Some(map);
        state.phase = TrackerPhase::ActivePolling;
        Ok(())
    }

    /// Recalcula el tamaño cuando el contenedor ya es visible
    fn schedule_invalidate_size(&self) {
        let weak = Rc::downgrade(&self.inner);
        self.inner
            .scheduler
            .timeout(self.inner.tracker_config.invalidate_size_delay_ms, move || {
                if let Some(tracker) = Self::from_weak(&weak) {
                    let mut state = tracker.inner.state.borrow_mut();
                    if state.is_disposed() {
                        return;
                    }
                    if let Some(map) = state.map.as_mut() {
                        map.invalidate_size();
                    }
                }
            });
    }

    fn start_polling(&self) {
        let period_ms = self.inner.tracker_config.poll_interval_ms;
        let weak = Rc::downgrade(&self.inner);
        let interval = self.inner.scheduler.interval(period_ms, move || {
            if let Some(tracker) = Self::from_weak(&weak) {
                tracker.on_tick();
            }
        });
        self.inner.state.borrow_mut().interval = Some(interval);
        log::info!("⏰ Muestreo de posición cada {} segundos", period_ms / 1000);
    }

    // ------------------------------------------------------------------------
    // Muestreo
    // ------------------------------------------------------------------------

    /// El cuerpo corre fuera del callback del intervalo, así `poll` puede
    /// cancelarlo sin soltar el closure que se está ejecutando
    fn on_tick(&self) {
        if self.phase().is_terminal() {
            return;
        }
        let tracker = self.clone();
        self.inner.scheduler.spawn_local(async move {
            match tracker.poll().await {
                Ok(_) => {}
                Err(TrackerError::Disposed) => {
                    log::info!("🔌 Posición descartada: el mapa ya fue desmontado");
                }
                Err(e) => {
                    log::warn!("⚠️ Lectura de posición fallida, se reintenta en el próximo intervalo: {}", e);
                }
            }
        });
    }

    /// Una lectura del intervalo. Un fallo no detiene el muestreo.
    pub async fn poll(&self) -> Result<PollOutcome, TrackerError> {
        {
            let mut state = self.inner.state.borrow_mut();
            match state.phase {
                TrackerPhase::ActivePolling => {}
                TrackerPhase::Capped => return Ok(PollOutcome::Capped),
                _ => return Ok(PollOutcome::Inactive),
            }
            if state.points.is_full() {
                drop(state);
                self.cap();
                return Ok(PollOutcome::Capped);
            }
            if state.poll_in_flight {
                log::warn!("⚠️ Lectura anterior todavía en curso, saltando...");
                return Ok(PollOutcome::Busy);
            }
            state.poll_in_flight = true;
        }

        let fix = self.inner.geolocator.current_position(PositionOptions::high_accuracy()).await;

        let (position, count) = {
            let mut state = self.inner.state.borrow_mut();
            state.poll_in_flight = false;
            if state.is_disposed() {
                return Err(TrackerError::Disposed);
            }
            if state.phase != TrackerPhase::ActivePolling {
                return Ok(PollOutcome::Inactive);
            }
            let position = fix?;
            (position, append_point(&mut *state, position)?)
        };

        let outcome = match count {
            Some(count) => {
                log::info!("📍 Punto {} agregado: {}", count, position);
                self.notify();
                PollOutcome::Appended { count }
            }
            None => PollOutcome::Capped,
        };

        if self.inner.state.borrow().points.is_full() {
            self.cap();
        }
        Ok(outcome)
    }

    /// Tope alcanzado: cancelar el intervalo, no se piden más posiciones
    fn cap(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.phase != TrackerPhase::ActivePolling {
                return;
            }
            state.cancel_interval();
            state.phase = TrackerPhase::Capped;
        }
        log::info!("🏁 {} puntos máximos.", self.max_points());
        self.notify();
    }

    // ------------------------------------------------------------------------
    // Desmontaje
    // ------------------------------------------------------------------------

    /// Cancela el intervalo y destruye el mapa. Idempotente.
    pub fn unmount(&self) {
        let (map, had_interval) = {
            let mut state = self.inner.state.borrow_mut();
            if state.is_disposed() {
                return;
            }
            state.phase = TrackerPhase::Disposed;
            state.poll_in_flight = false;
            state.polyline = None;
            state.markers.clear();
            (state.map.take(), state.cancel_interval())
        };

        let had_map = map.is_some();
        if let Some(mut map) = map {
            map.remove();
        }
        let listeners = self.inner.subscribers.clear();

        log::info!(
            "🧹 Tracker desmontado (mapa: {}, intervalo: {}, subscribers: {})",
            if had_map { "destruido" } else { "no creado" },
            if had_interval { "cancelado" } else { "no activo" },
            listeners
        );
    }
}

/// Tile layer, marcador inicial y polilínea de un solo vértice
fn decorate_map<M: MapSurface>(
    map: &mut M,
    start: Position,
    map_config: &MapConfig,
) -> Result<(MarkerId, PolylineId), MapError> {
    map.add_tile_layer(&map_config.tile_url, &TileLayerOptions::from(map_config))?;
    let marker = map.add_marker(start)?;
    let polyline = map.add_polyline(&[start], &PolylineStyle::from(map_config))?;
    Ok((marker, polyline))
}

/// Añade el punto y sincroniza marcador, polilínea y vista.
/// `Ok(None)` si la secuencia ya estaba llena.
///
/// Todo o nada: si la polilínea o el marcador fallan, puntos, marcadores y
/// polilínea quedan como estaban. Un `pan_to` fallido solo se registra.
fn append_point<M: MapSurface, I>(
    state: &mut TrackerState<M, I>,
    position: Position,
) -> Result<Option<usize>, MapError> {
    let TrackerState {
        points,
        map,
        polyline,
        markers,
        ..
    } = state;

    let map = map.as_mut().ok_or(MapError::Removed)?;
    if points.is_full() {
        return Ok(None);
    }

    if let Some(id) = *polyline {
        let mut vertices = points.as_slice().to_vec();
        vertices.push(position);
        map.set_polyline_vertices(id, &vertices)?;
    }

    let marker = match map.add_marker(position) {
        Ok(marker) => marker,
        Err(e) => {
            if let Some(id) = *polyline {
                if let Err(restore) = map.set_polyline_vertices(id, points.as_slice()) {
                    log::warn!("⚠️ No se pudo restaurar la polilínea: {}", restore);
                }
            }
            return Err(e);
        }
    };

    // Ya se comprobó que hay hueco
    markers.push(marker);
    points.push(position);
    let count = points.len();

    if let Err(e) = map.pan_to(position) {
        log::warn!("⚠️ No se pudo centrar el mapa en {}: {}", position, e);
    }
    Ok(Some(count))
}
