// ============================================================================
// REACTIVITY - Sistema de notificaciones/subscribers
// ============================================================================

use std::cell::RefCell;

type Callback<T> = Box<dyn Fn(&T)>;

/// Lista de subscribers que reciben cada nuevo valor
pub struct Subscribers<T> {
    callbacks: RefCell<Vec<Callback<T>>>,
}

impl<T> Subscribers<T> {
    pub fn new() -> Self {
        Self {
            callbacks: RefCell::new(Vec::new()),
        }
    }

    /// Suscribirse a cambios
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&T) + 'static,
    {
        self.callbacks.borrow_mut().push(Box::new(callback));
    }

    /// Notificar a todos los subscribers
    pub fn notify(&self, value: &T) {
        for callback in self.callbacks.borrow().iter() {
            callback(value);
        }
    }

    /// Eliminar todos los subscribers; devuelve cuántos había
    pub fn clear(&self) -> usize {
        let mut callbacks = self.callbacks.borrow_mut();
        let removed = callbacks.len();
        callbacks.clear();
        removed
    }
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn notifies_every_subscriber_until_cleared() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let subscribers = Subscribers::<u32>::new();
        for tag in 0..2 {
            let seen = seen.clone();
            subscribers.subscribe(move |v| seen.borrow_mut().push((tag, *v)));
        }

        subscribers.notify(&7);
        assert_eq!(*seen.borrow(), vec![(0, 7), (1, 7)]);

        assert_eq!(subscribers.clear(), 2);
        subscribers.notify(&8);
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(subscribers.clear(), 0);
    }
}
