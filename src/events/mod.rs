//! # Events Module
//!
//! Progress reporting for any UI layer (CLI, GUI).
//!
//! The core emits events through a channel; presentation code subscribes
//! and renders them. Dropping the receiver makes every send a no-op.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Classify(ClassifyEvent::Progress(p)) = event {
//!             println!("{}/{}", p.completed, p.total);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
