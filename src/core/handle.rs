// imgpipe/src/core/handle.rs
use image::{ColorType, DynamicImage, GenericImageView};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Counts {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

/// Counts handle acquisitions and releases for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct HandleTracker {
    counts: Arc<Counts>,
}

impl HandleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquired(&self) -> usize {
        self.counts.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.counts.released.load(Ordering::SeqCst)
    }

    /// Handles acquired but not yet released.
    pub fn live(&self) -> usize {
        self.acquired() - self.released()
    }

    pub fn is_balanced(&self) -> bool {
        self.live() == 0
    }
}

/// Decoded pixels plus metadata, owned by exactly one stage at a time.
///
/// There is no way to mutate the pixels through a handle: transforms build a
/// new handle with [`ImageHandle::derive`]. Dropping the handle releases it.
#[derive(Debug)]
pub struct ImageHandle {
    image: DynamicImage,
    tracker: HandleTracker,
}

impl ImageHandle {
    pub fn acquire(image: DynamicImage, tracker: &HandleTracker) -> Self {
        tracker.counts.acquired.fetch_add(1, Ordering::SeqCst);
        log::debug!(
            "Acquired handle {}x{} ({:?})",
            image.width(),
            image.height(),
            image.color()
        );
        Self {
            image,
            tracker: tracker.clone(),
        }
    }

    /// New handle tracked by the same run as `self`.
    pub fn derive(&self, image: DynamicImage) -> Self {
        Self::acquire(image, &self.tracker)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Bits per pixel.
    pub fn depth(&self) -> u16 {
        self.image.color().bits_per_pixel()
    }

    pub fn color(&self) -> ColorType {
        self.image.color()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

impl Drop for ImageHandle {
    fn drop(&mut self) {
        self.tracker.counts.released.fetch_add(1, Ordering::SeqCst);
    }
}
