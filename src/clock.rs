//! Frame timing
//!
//! [`FrameClock`] turns raw frame timestamps into the monotonic `now_ms` the
//! stage ticks with. [`AnimationFrameLoop`] drives a callback from the
//! browser's `requestAnimationFrame` until stopped.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Start/stop gate plus monotonic clamping for frame timestamps
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    running: bool,
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn last_ms(&self) -> Option<f64> {
        self.last_ms
    }

    /// Accept a frame timestamp. `None` while stopped or for non-finite
    /// input; a timestamp earlier than the previous one is clamped to it.
    pub fn tick(&mut self, now_ms: f64) -> Option<f64> {
        if !self.running {
            return None;
        }
        if !now_ms.is_finite() {
            log::warn!("ignoring non-finite frame time {}", now_ms);
            return None;
        }

        let now = match self.last_ms {
            Some(last) if now_ms < last => {
                log::warn!("frame time went backwards ({} < {}), clamping", now_ms, last);
                last
            }
            _ => now_ms,
        };
        self.last_ms = Some(now);
        Some(now)
    }
}

/// High resolution page time, if running in a browser
pub fn performance_now() -> Option<f64> {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Re-arming `requestAnimationFrame` loop.
///
/// `on_frame` receives the frame timestamp and returns false to end the loop.
pub struct AnimationFrameLoop {
    handle: Rc<Cell<Option<i32>>>,
    callback: FrameCallback,
}

impl AnimationFrameLoop {
    pub fn start<F>(mut on_frame: F) -> Result<Self, JsValue>
    where
        F: FnMut(f64) -> bool + 'static,
    {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;

        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let handle = Rc::new(Cell::new(None));

        let rearm = Rc::clone(&callback);
        let frame_handle = Rc::clone(&handle);
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
            if !on_frame(now) {
                frame_handle.set(None);
                return;
            }
            let next = web_sys::window().and_then(|w| {
                rearm
                    .borrow()
                    .as_ref()
                    .and_then(|c| w.request_animation_frame(c.as_ref().unchecked_ref()).ok())
            });
            frame_handle.set(next);
        }) as Box<dyn FnMut(f64)>));

        let first = match callback.borrow().as_ref() {
            Some(c) => Some(window.request_animation_frame(c.as_ref().unchecked_ref())?),
            None => None,
        };
        handle.set(first);

        Ok(Self { handle, callback })
    }

    pub fn is_running(&self) -> bool {
        self.handle.get().is_some()
    }

    /// Cancel the pending frame, if any
    pub fn stop(&self) {
        if let Some(id) = self.handle.take() {
            if let Some(window) = web_sys::window() {
                if let Err(e) = window.cancel_animation_frame(id) {
                    log::warn!("cancel_animation_frame failed: {:?}", e);
                }
            }
        }
    }
}

impl Drop for AnimationFrameLoop {
    fn drop(&mut self) {
        self.stop();
        // break the closure's reference to itself
        self.callback.borrow_mut().take();
    }
}
