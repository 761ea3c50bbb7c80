mod bus;
mod events;

pub use bus::EventBus;
pub use events::{SceneEvent, SurfaceEvent};

/// Observer of scene and surface events
pub trait EventHandler: Send {
    fn handle_event(&mut self, event: &SurfaceEvent);
}

// Closures make the common case of a one-off observer cheap to write
impl<F> EventHandler for F
where
    F: FnMut(&SurfaceEvent) + Send,
{
    fn handle_event(&mut self, event: &SurfaceEvent) {
        self(event)
    }
}
