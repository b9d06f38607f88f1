//! Pending colour: the last colour requested over HTTP, applied on the next write

use std::sync::{Arc, Mutex, PoisonError};

use playbulb_proto::Color;

/// Shared handle to the pending colour
///
/// The control endpoint is the only writer; the lamp state machine reads it
/// at the moment the colour characteristic is located, so concurrent requests
/// resolve last-writer-wins.
#[derive(Debug, Clone, Default)]
pub struct ColorStore {
    inner: Arc<Mutex<Color>>,
}

impl ColorStore {
    pub fn set(&self, color: Color) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = color;
    }

    pub fn get(&self) -> Color {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_off_and_clones_share_the_cell() {
        let store = ColorStore::default();
        assert_eq!(store.get(), Color::OFF);

        let other = store.clone();
        other.set(Color::DEFAULT);
        assert_eq!(store.get(), Color::DEFAULT);
    }
}
