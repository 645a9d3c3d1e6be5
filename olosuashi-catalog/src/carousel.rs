use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

/// Wrap-around position over `len` slides (gallery images, testimonials).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    index: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { len, index: 0 }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn next(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
        self.index
    }

    pub fn prev(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
        self.index
    }

    /// Jump to a thumbnail. Out-of-range indices are ignored.
    pub fn go_to(&mut self, index: usize) -> usize {
        if index < self.len {
            self.index = index;
        }
        self.index
    }
}

/// Timer-driven rotation. The timer lives as long as this handle; dropping
/// it (the component unmounting) stops the rotation.
pub struct AutoRotation {
    handle: Option<JoinHandle<()>>,
    current: watch::Receiver<usize>,
}

impl AutoRotation {
    /// Must be called inside a tokio runtime. Carousels with fewer than two
    /// slides never rotate.
    pub fn start(carousel: Carousel, period: Duration) -> Self {
        let (tx, rx) = watch::channel(carousel.index());

        if carousel.len() < 2 || period.is_zero() {
            return Self { handle: None, current: rx };
        }

        let handle = tokio::spawn(async move {
            let mut carousel = carousel;
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let index = carousel.next();
                if tx.send(index).is_err() {
                    debug!("Carousel receiver dropped, stopping rotation");
                    break;
                }
            }
        });

        Self { handle: Some(handle), current: rx }
    }

    pub fn current(&self) -> usize {
        *self.current.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.current.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    pub fn stop(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for AutoRotation {
    fn drop(&mut self) {
        self.abort();
    }
}
