//! xshim - Xlib client API emulated on a host windowing toolkit
//!
//! X11 programs link against the calls in `display::Display` and never talk
//! to an X server. Windows become host windows or host views, GCs are
//! emulated by pushing only changed drawing state into host views, and host
//! input is translated into X events on the host's own thread.

pub mod atoms;
pub mod backend;
pub mod colors;
pub mod display;
pub mod fonts;
pub mod gc;
pub mod protocol;
pub mod queue;
pub mod region;
pub mod resources;

pub use backend::{Backend, BackendEvent};
pub use display::{Display, DisplayConfig, InputSink};
pub use protocol::{Atom, Drawable, Event, GContext, Pixmap, Window, X11Error, X11Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
