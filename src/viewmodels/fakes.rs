// Dobles en memoria de geolocalización, mapa y scheduler para los tests

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::LocalSpawner;
use futures::task::LocalSpawnExt;

use crate::maps::{MapError, MapFactory, MapOptions, MapSurface, MarkerId, PolylineId, PolylineStyle, TileLayerOptions};
use crate::models::Position;
use crate::services::{GeolocationError, Geolocator, PositionOptions, Scheduler};

type Fix = Result<Position, GeolocationError>;

enum Scripted {
    Ready(Fix),
    Deferred(oneshot::Receiver<Fix>),
}

/// Devuelve las respuestas en el orden en que se programaron
#[derive(Clone, Default)]
pub struct FakeGeolocator {
    script: Rc<RefCell<VecDeque<Scripted>>>,
    requests: Rc<RefCell<Vec<PositionOptions>>>,
}

impl FakeGeolocator {
    pub fn push_fix(&self, position: Position) {
        self.script.borrow_mut().push_back(Scripted::Ready(Ok(position)));
    }

    pub fn push_error(&self, error: GeolocationError) {
        self.script.borrow_mut().push_back(Scripted::Ready(Err(error)));
    }

    /// La petición queda pendiente hasta que se use el sender
    pub fn push_deferred(&self) -> oneshot::Sender<Fix> {
        let (tx, rx) = oneshot::channel();
        self.script.borrow_mut().push_back(Scripted::Deferred(rx));
        tx
    }

    pub fn requests(&self) -> Vec<PositionOptions> {
        self.requests.borrow().clone()
    }
}

impl Geolocator for FakeGeolocator {
    async fn current_position(&self, options: PositionOptions) -> Fix {
        self.requests.borrow_mut().push(options);
        let next = self.script.borrow_mut().pop_front();
        match next {
            Some(Scripted::Ready(fix)) => fix,
            Some(Scripted::Deferred(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(GeolocationError::Unknown("sender dropped".into()))),
            None => Err(GeolocationError::PositionUnavailable),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreatedMap {
    pub container_id: String,
    pub center: Position,
    pub zoom: f64,
    pub options: MapOptions,
}

/// Todo lo que se le pidió a los mapas creados
#[derive(Debug, Clone, Default)]
pub struct MapRecord {
    pub created: Vec<CreatedMap>,
    pub tile_layers: Vec<(String, TileLayerOptions)>,
    pub markers: Vec<Position>,
    pub polylines: Vec<(Vec<Position>, PolylineStyle)>,
    pub pans: Vec<Position>,
    pub invalidations: usize,
    pub removed: usize,
}

/// Errores programados para la próxima llamada de cada tipo
#[derive(Default)]
struct MapFailures {
    marker: Option<MapError>,
    polyline_update: Option<MapError>,
    pan: Option<MapError>,
}

#[derive(Clone, Default)]
pub struct FakeMapFactory {
    record: Rc<RefCell<MapRecord>>,
    next_create_error: Rc<RefCell<Option<MapError>>>,
    failures: Rc<RefCell<MapFailures>>,
}

impl FakeMapFactory {
    pub fn record(&self) -> MapRecord {
        self.record.borrow().clone()
    }

    pub fn fail_next_create(&self, error: MapError) {
        *self.next_create_error.borrow_mut() = Some(error);
    }

    pub fn fail_next_marker(&self, error: MapError) {
        self.failures.borrow_mut().marker = Some(error);
    }

    pub fn fail_next_polyline_update(&self, error: MapError) {
        self.failures.borrow_mut().polyline_update = Some(error);
    }

    pub fn fail_next_pan(&self, error: MapError) {
        self.failures.borrow_mut().pan = Some(error);
    }
}

impl MapFactory for FakeMapFactory {
    type Map = FakeMap;

    fn create_map(
        &self,
        container_id: &str,
        center: Position,
        zoom: f64,
        options: &MapOptions,
    ) -> Result<FakeMap, MapError> {
        if let Some(error) = self.next_create_error.borrow_mut().take() {
            return Err(error);
        }
        self.record.borrow_mut().created.push(CreatedMap {
            container_id: container_id.to_string(),
            center,
            zoom,
            options: options.clone(),
        });
        Ok(FakeMap {
            record: self.record.clone(),
            failures: self.failures.clone(),
            removed: false,
        })
    }
}

pub struct FakeMap {
    record: Rc<RefCell<MapRecord>>,
    failures: Rc<RefCell<MapFailures>>,
    removed: bool,
}

impl FakeMap {
    fn ensure_alive(&self) -> Result<(), MapError> {
        if self.removed {
            Err(MapError::Removed)
        } else {
            Ok(())
        }
    }
}

impl MapSurface for FakeMap {
    fn add_tile_layer(&mut self, url_template: &str, options: &TileLayerOptions) -> Result<(), MapError> {
        self.ensure_alive()?;
        self.record
            .borrow_mut()
            .tile_layers
            .push((url_template.to_string(), options.clone()));
        Ok(())
    }

    fn add_marker(&mut self, at: Position) -> Result<MarkerId, MapError> {
        self.ensure_alive()?;
        if let Some(error) = self.failures.borrow_mut().marker.take() {
            return Err(error);
        }
        let mut record = self.record.borrow_mut();
        record.markers.push(at);
        Ok(MarkerId(record.markers.len() - 1))
    }

    fn add_polyline(&mut self, vertices: &[Position], style: &PolylineStyle) -> Result<PolylineId, MapError> {
        self.ensure_alive()?;
        let mut record = self.record.borrow_mut();
        record.polylines.push((vertices.to_vec(), style.clone()));
        Ok(PolylineId(record.polylines.len() - 1))
    }

    fn set_polyline_vertices(&mut self, id: PolylineId, vertices: &[Position]) -> Result<(), MapError> {
        self.ensure_alive()?;
        if let Some(error) = self.failures.borrow_mut().polyline_update.take() {
            return Err(error);
        }
        let mut record = self.record.borrow_mut();
        let polyline = record.polylines.get_mut(id.0).ok_or(MapError::UnknownPolyline(id))?;
        polyline.0 = vertices.to_vec();
        Ok(())
    }

    fn pan_to(&mut self, at: Position) -> Result<(), MapError> {
        self.ensure_alive()?;
        if let Some(error) = self.failures.borrow_mut().pan.take() {
            return Err(error);
        }
        self.record.borrow_mut().pans.push(at);
        Ok(())
    }

    fn invalidate_size(&mut self) {
        if !self.removed {
            self.record.borrow_mut().invalidations += 1;
        }
    }

    fn remove(&mut self) {
        if !self.removed {
            self.removed = true;
            self.record.borrow_mut().removed += 1;
        }
    }
}

struct IntervalSlot {
    period_ms: u32,
    tick: Rc<RefCell<Box<dyn FnMut()>>>,
    active: Rc<Cell<bool>>,
}

/// Soltarlo desactiva el intervalo, igual que `gloo_timers::callback::Interval`
pub struct FakeInterval {
    active: Rc<Cell<bool>>,
}

impl Drop for FakeInterval {
    fn drop(&mut self) {
        self.active.set(false);
    }
}

/// Intervalos y timeouts que se disparan a mano; las tareas van a un LocalPool
#[derive(Clone)]
pub struct FakeScheduler {
    spawner: LocalSpawner,
    intervals: Rc<RefCell<Vec<IntervalSlot>>>,
    timeouts: Rc<RefCell<Vec<(u32, Box<dyn FnOnce()>)>>>,
    timeout_delays: Rc<RefCell<Vec<u32>>>,
}

impl FakeScheduler {
    pub fn new(spawner: LocalSpawner) -> Self {
        Self {
            spawner,
            intervals: Rc::new(RefCell::new(Vec::new())),
            timeouts: Rc::new(RefCell::new(Vec::new())),
            timeout_delays: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Dispara una vez cada intervalo activo
    pub fn fire_intervals(&self) -> usize {
        let ticks: Vec<_> = self
            .intervals
            .borrow()
            .iter()
            .filter(|slot| slot.active.get())
            .map(|slot| slot.tick.clone())
            .collect();
        for tick in &ticks {
            (tick.borrow_mut())();
        }
        ticks.len()
    }

    pub fn run_timeouts(&self) {
        let pending = std::mem::take(&mut *self.timeouts.borrow_mut());
        for (_, callback) in pending {
            callback();
        }
    }

    pub fn active_intervals(&self) -> usize {
        self.intervals.borrow().iter().filter(|slot| slot.active.get()).count()
    }

    /// Periodo de cada intervalo creado, activo o no
    pub fn interval_periods(&self) -> Vec<u32> {
        self.intervals.borrow().iter().map(|slot| slot.period_ms).collect()
    }

    pub fn timeout_delays(&self) -> Vec<u32> {
        self.timeout_delays.borrow().clone()
    }
}

impl Scheduler for FakeScheduler {
    type Interval = FakeInterval;

    fn spawn_local<F>(&self, task: F)
    where
        F: Future<Output = ()> + 'static,
    {
        self.spawner.spawn_local(task).expect("local pool is gone");
    }

    fn interval<F>(&self, period_ms: u32, tick: F) -> FakeInterval
    where
        F: FnMut() + 'static,
    {
        let active = Rc::new(Cell::new(true));
        self.intervals.borrow_mut().push(IntervalSlot {
            period_ms,
            tick: Rc::new(RefCell::new(Box::new(tick))),
            active: active.clone(),
        });
        FakeInterval { active }
    }

    fn timeout<F>(&self, delay_ms: u32, callback: F)
    where
        F: FnOnce() + 'static,
    {
        self.timeout_delays.borrow_mut().push(delay_ms);
        self.timeouts.borrow_mut().push((delay_ms, Box::new(callback)));
    }
}
