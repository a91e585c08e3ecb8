//! Attaching the scale bar to a map.
//!
//! The control keeps the scale bar in sync with a host map. It subscribes
//! to the host’s viewport events and, for each of them, recalculates the
//! scales and renders a new frame into its overlay.
//!
//! Everything here is single-threaded and synchronous: an event results
//! in a complete redraw before the host’s notification returns.

use std::fmt;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use log::{debug, warn};
use crate::config::{InvalidOptions, Options, OptionsUpdate};
use crate::render::{Frame, Renderer};
use crate::scale::ScaleResult;
use crate::surface::Platform;
use crate::viewport::{Bounds, LonLat, Viewport};


//------------ MapEvent ------------------------------------------------------

/// The host events that change the viewport.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MapEvent {
    Zoom,
    Move,
    Resize,
}

impl MapEvent {
    /// All events the control subscribes to.
    pub const ALL: [MapEvent; 3] = [
        MapEvent::Zoom, MapEvent::Move, MapEvent::Resize
    ];
}

impl fmt::Display for MapEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            MapEvent::Zoom => "zoom",
            MapEvent::Move => "move",
            MapEvent::Resize => "resize",
        })
    }
}


//------------ Listener, Subscription ----------------------------------------

/// A callback registered with a host.
pub type Listener = Rc<dyn Fn(MapEvent)>;

/// A registered listener.
///
/// The value is handed out by the host upon subscribing and handed back
/// to it for unsubscribing.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Subscription {
    pub event: MapEvent,
    pub id: u64,
}


//------------ Host ----------------------------------------------------------

/// The map widget the scale bar is shown on.
pub trait Host {
    /// Returns the current center of the map.
    fn center(&self) -> LonLat;

    /// Returns the current zoom level.
    fn zoom(&self) -> f64;

    /// Returns the currently visible bounds.
    fn bounds(&self) -> Bounds;

    /// Returns the width and height of the map canvas in physical pixels.
    fn canvas_size(&self) -> (f64, f64);

    /// Registers a listener for an event.
    fn subscribe(&self, event: MapEvent, listener: Listener) -> Subscription;

    /// Removes a previously registered listener.
    fn unsubscribe(&self, subscription: Subscription);
}


//------------ Overlay -------------------------------------------------------

/// A handle to the overlay drawn by an attached control.
///
/// The handle is cheap to clone. It always refers to the latest frame.
/// Once the control is detached, the frame is released and the overlay
/// reports as detached.
#[derive(Clone, Debug, Default)]
pub struct Overlay {
    inner: Rc<RefCell<OverlayState>>,
}

#[derive(Debug, Default)]
struct OverlayState {
    frame: Option<Rc<Frame>>,
    attached: bool,
}

impl Overlay {
    fn new() -> Self {
        let res = Self::default();
        res.inner.borrow_mut().attached = true;
        res
    }

    /// Returns the latest frame, if any has been rendered yet.
    ///
    /// The frame stays valid after later redraws replace it.
    pub fn frame(&self) -> Option<Rc<Frame>> {
        self.inner.borrow().frame.clone()
    }

    pub fn is_attached(&self) -> bool {
        self.inner.borrow().attached
    }

    fn set_frame(&self, frame: Frame) {
        self.inner.borrow_mut().frame = Some(Rc::new(frame));
    }

    fn release(&self) {
        let mut state = self.inner.borrow_mut();
        state.frame = None;
        state.attached = false;
    }
}


//------------ ScaleControl --------------------------------------------------

/// A scale bar control.
pub struct ScaleControl {
    inner: Rc<RefCell<Inner>>,
}

struct Inner {
    options: Options,
    platform: Rc<dyn Platform>,
    attachment: Option<Attachment>,
}

struct Attachment {
    host: Rc<dyn Host>,
    subscriptions: Vec<Subscription>,
    overlay: Overlay,
}

impl ScaleControl {
    pub fn new(
        options: Options, platform: Rc<dyn Platform>
    ) -> Result<Self, InvalidOptions> {
        options.validate()?;
        Ok(ScaleControl {
            inner: Rc::new(RefCell::new(Inner {
                options,
                platform,
                attachment: None,
            }))
        })
    }

    /// Attaches the control to a host and draws the initial frame.
    ///
    /// If the control is already attached, it is detached first.
    pub fn attach(&self, host: Rc<dyn Host>) -> Overlay {
        self.detach();

        let subscriptions = MapEvent::ALL.iter().map(|&event| {
            let inner = Rc::downgrade(&self.inner);
            let listener: Listener = Rc::new(move |event: MapEvent| {
                Self::notify(&inner, event)
            });
            host.subscribe(event, listener)
        }).collect();

        let overlay = Overlay::new();
        let mut inner = self.inner.borrow_mut();
        inner.attachment = Some(Attachment {
            host, subscriptions, overlay: overlay.clone()
        });
        inner.update();
        overlay
    }

    /// Detaches the control from its host.
    ///
    /// Does nothing if the control isn’t attached.
    pub fn detach(&self) {
        let attachment = self.inner.borrow_mut().attachment.take();
        if let Some(attachment) = attachment {
            for subscription in attachment.subscriptions {
                attachment.host.unsubscribe(subscription);
            }
            attachment.overlay.release();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.inner.borrow().attachment.is_some()
    }

    /// Recalculates the scales and redraws the overlay.
    pub fn update(&self) {
        self.inner.borrow_mut().update()
    }

    /// Merges `update` into the options and redraws.
    ///
    /// If the merged options are invalid, the current options are kept.
    pub fn set_options(
        &self, update: OptionsUpdate
    ) -> Result<(), InvalidOptions> {
        let mut inner = self.inner.borrow_mut();
        inner.options = inner.options.merge(update)?;
        inner.update();
        Ok(())
    }

    /// Returns a copy of the current options.
    pub fn options(&self) -> Options {
        self.inner.borrow().options.clone()
    }

    fn notify(inner: &Weak<RefCell<Inner>>, event: MapEvent) {
        let inner = match inner.upgrade() {
            Some(inner) => inner,
            None => return,
        };
        let res = inner.try_borrow_mut();
        match res {
            Ok(mut inner) => inner.update(),
            Err(_) => debug!("ignoring {} event during update", event),
        }
    }
}

impl Drop for ScaleControl {
    fn drop(&mut self) {
        self.detach()
    }
}

impl Inner {
    fn update(&mut self) {
        let attachment = match self.attachment.as_ref() {
            Some(attachment) => attachment,
            None => return,
        };
        let viewport = snapshot(
            attachment.host.as_ref(), self.platform.pixel_ratio()
        );
        let result = match ScaleResult::calculate(&viewport, &self.options) {
            Some(result) => result,
            None => {
                debug!("skipping scale bar update for {:?}", viewport);
                return
            }
        };
        match Renderer::new(&self.options).render(
            &result, self.platform.as_ref()
        ) {
            Ok(frame) => attachment.overlay.set_frame(frame),
            Err(err) => warn!("failed to render scale bar: {}", err),
        }
    }
}


//------------ Helper Functions ----------------------------------------------

/// Takes a snapshot of the host’s viewport.
pub fn snapshot(host: &dyn Host, pixel_ratio: f64) -> Viewport {
    let (canvas_width, canvas_height) = host.canvas_size();
    Viewport {
        center: host.center(),
        zoom: host.zoom(),
        bounds: host.bounds(),
        canvas_width,
        canvas_height,
        pixel_ratio,
    }
}


//============ Tests =========================================================
