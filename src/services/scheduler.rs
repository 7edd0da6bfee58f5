// ============================================================================
// SCHEDULER - Tareas async, intervalos y timeouts del event loop
// ============================================================================

use std::future::Future;

use gloo_timers::callback::{Interval, Timeout};

/// Acceso al event loop (un solo hilo, cooperativo)
pub trait Scheduler {
    /// Handle de un intervalo activo; soltarlo lo cancela
    type Interval: 'static;

    fn spawn_local<F>(&self, task: F)
    where
        F: Future<Output = ()> + 'static;

    fn interval<F>(&self, period_ms: u32, tick: F) -> Self::Interval
    where
        F: FnMut() + 'static;

    /// Timeout de un solo disparo; no se puede cancelar
    fn timeout<F>(&self, delay_ms: u32, callback: F)
    where
        F: FnOnce() + 'static;
}

/// Scheduler del navegador: gloo_timers + wasm_bindgen_futures
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    type Interval = Interval;

    fn spawn_local<F>(&self, task: F)
    where
        F: Future<Output = ()> + 'static,
    {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn interval<F>(&self, period_ms: u32, tick: F) -> Interval
    where
        F: FnMut() + 'static,
    {
        Interval::new(period_ms, tick)
    }

    fn timeout<F>(&self, delay_ms: u32, callback: F)
    where
        F: FnOnce() + 'static,
    {
        Timeout::new(delay_ms, callback).forget();
    }
}
