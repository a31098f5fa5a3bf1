//! The loading-indicator seam.

/// A graphic loading indicator shown while a navigation is in flight.
pub trait Loader: Send + Sync {
    /// Reveal the indicator.
    fn show(&self);

    /// Conceal the indicator.
    fn hide(&self);
}

/// A [`Loader`] that displays nothing.
pub struct NoopLoader;

impl Loader for NoopLoader {
    fn show(&self) {}

    fn hide(&self) {}
}
