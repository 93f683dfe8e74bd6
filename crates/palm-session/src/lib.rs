// palm-session/src/lib.rs
// ============================================================
// palm-session  –  Front-end state for PalmVision
// Holds the selected captures, their detection status and
// analysis, and tells subscribed views when any of it changes.
// ------------------------------------------------------------
// Public API
//   * Session::set_selection / focus / markers / subscribe
//   * analyze_pending(session, detector, workers) – async batch
//   * PipelineConfig::from_path(p)                – JSON config
// ============================================================

//! PalmVision – session layer
//!
//! A [`Session`] is an ordinary value owned by the front end and passed by
//! reference to whatever renders it. Each [`ImageAttachment`] carries a
//! [`DetectionStatus`] (`Loading`, `Finished`, `Failed`) and the latest
//! [`palm_analyze::Analysis`]; a new detection run replaces that analysis,
//! it never patches it.
//!
//! Detection is run by [`analyze_pending`] on a bounded pool of blocking
//! tasks. Workers own their inputs and only hand results back; the session
//! itself is mutated on the calling task.

mod attachment;
mod config;
mod runner;
mod session;

pub use attachment::{load_image, DetectionStatus, Finished, ImageAttachment, LoadError, LoadOutcome};
pub use config::PipelineConfig;
pub use runner::{analyze_pending, SharedDetector};
pub use session::{MapMarker, Session, SessionEvent, SubscriptionId};
