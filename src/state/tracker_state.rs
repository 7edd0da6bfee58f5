// ============================================================================
// TRACKER STATE - Estado privado de una instancia montada del mapa
// ============================================================================

use crate::maps::{MarkerId, PolylineId};
use crate::models::Position;

/// Fases del tracker
///
/// `Uninitialized -> AwaitingFirstFix -> ActivePolling -> Capped`, con
/// `FailedInit` alcanzable desde `AwaitingFirstFix`. `Disposed` se alcanza
/// desde cualquier fase al desmontar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    Uninitialized,
    AwaitingFirstFix,
    ActivePolling,
    Capped,
    FailedInit,
    Disposed,
}

impl TrackerPhase {
    /// Ninguna fase terminal vuelve a pedir posiciones
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrackerPhase::Capped | TrackerPhase::FailedInit | TrackerPhase::Disposed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerPhase::Uninitialized => "uninitialized",
            TrackerPhase::AwaitingFirstFix => "awaiting-first-fix",
            TrackerPhase::ActivePolling => "active-polling",
            TrackerPhase::Capped => "capped",
            TrackerPhase::FailedInit => "failed-init",
            TrackerPhase::Disposed => "disposed",
        }
    }
}

/// Secuencia de posiciones en orden de llegada, con tope fijo
#[derive(Debug, Clone, PartialEq)]
pub struct PointSequence {
    points: Vec<Position>,
    capacity: usize,
}

impl PointSequence {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Añade al final; devuelve la nueva longitud o `None` si ya está llena
    pub fn push(&mut self, position: Position) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        self.points.push(position);
        Some(self.points.len())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.points.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_slice(&self) -> &[Position] {
        &self.points
    }
}

/// Vista pública del estado, lo que ven los subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSnapshot {
    pub phase: TrackerPhase,
    pub point_count: usize,
}

impl Default for TrackerSnapshot {
    fn default() -> Self {
        Self {
            phase: TrackerPhase::Uninitialized,
            point_count: 0,
        }
    }
}

/// Estado mutable del tracker; `M` = mapa, `I` = handle del intervalo
pub struct TrackerState<M, I> {
    pub phase: TrackerPhase,
    pub points: PointSequence,
    pub map: Option<M>,
    pub polyline: Option<PolylineId>,
    pub markers: Vec<MarkerId>,
    pub interval: Option<I>,
    /// Hay una petición de posición del intervalo en curso
    pub poll_in_flight: bool,
}

impl<M, I> TrackerState<M, I> {
    pub fn new(max_points: usize) -> Self {
        Self {
            phase: TrackerPhase::Uninitialized,
            points: PointSequence::with_capacity(max_points),
            map: None,
            polyline: None,
            markers: Vec::new(),
            interval: None,
            poll_in_flight: false,
        }
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            phase: self.phase,
            point_count: self.points.len(),
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.phase == TrackerPhase::Disposed
    }

    /// Soltar el handle cancela el intervalo
    pub fn cancel_interval(&mut self) -> bool {
        self.interval.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_sequence_stops_at_capacity_and_keeps_order() {
        let mut seq = PointSequence::with_capacity(3);
        assert_eq!(seq.push(Position::new(1.0, 1.0)), Some(1));
        assert_eq!(seq.push(Position::new(2.0, 2.0)), Some(2));
        assert_eq!(seq.push(Position::new(3.0, 3.0)), Some(3));
        assert!(seq.is_full());
        assert_eq!(seq.push(Position::new(4.0, 4.0)), None);
        assert_eq!(seq.len(), 3);

        let lats: Vec<f64> = seq.as_slice().iter().map(|p| p.latitude).collect();
        assert_eq!(lats, vec![1.0, 2.0, 3.0]);
        assert_eq!(seq.as_slice().last(), Some(&Position::new(3.0, 3.0)));
    }

    #[test]
    fn duplicates_are_kept() {
        let mut seq = PointSequence::with_capacity(2);
        seq.push(Position::new(5.0, 5.0));
        seq.push(Position::new(5.0, 5.0));
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn terminal_phases() {
        assert!(TrackerPhase::Capped.is_terminal());
        assert!(TrackerPhase::FailedInit.is_terminal());
        assert!(TrackerPhase::Disposed.is_terminal());
        assert!(!TrackerPhase::ActivePolling.is_terminal());
        assert!(!TrackerPhase::AwaitingFirstFix.is_terminal());
    }

    #[test]
    fn cancel_interval_drops_the_handle_once() {
        let mut state: TrackerState<(), u8> = TrackerState::new(15);
        state.interval = Some(1);
        assert!(state.cancel_interval());
        assert!(!state.cancel_interval());
        assert_eq!(state.snapshot(), TrackerSnapshot::default());
    }
}
