//! Monitor tester core.
//!
//! Samples the host's animation-frame cadence into per-window rates, keeps
//! rolling statistics over them, scores the session, estimates the rate
//! trend and renders a rate chart. Page rendering, menus and export
//! formats belong to the host; the core only talks to them through the
//! traits in [`display`] and [`chart`].

pub mod chart;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod pattern;
pub mod quality;
pub mod recommend;
pub mod sampler;
pub mod session;
pub mod settings;
pub mod stats;
pub mod trend;

pub use session::{SampleUpdate, Session, SessionClock};
