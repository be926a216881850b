//! WaveGrid Control - Audio-reactive engines
//!
//! This crate runs the WaveGrid state machines on tokio:
//! - **Grid**: feature-reactive grid driven by analyzer events, playback
//!   signals and frame ticks
//! - **Morph**: ambient color palette that retargets on a fixed interval
//! - **Emitter**: tick publish/subscribe with owner tags
//! - **Playback**: media handle with `play`/`pause`/`ended` signals
//! - **Analyzer**: the feature extractor interface plus a scriptable analyzer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wavegrid_control::{Emitter, FeatureReactiveGrid, MediaHandle, ScriptedAnalyzer};
//! use wavegrid_core::{GridConfig, MemorySurface};
//!
//! # async fn demo() -> wavegrid_control::Result<()> {
//! let emitter = Emitter::new();
//! let media = MediaHandle::new("track");
//! let analyzer = ScriptedAnalyzer::new(&media);
//! let mut grid = FeatureReactiveGrid::initialize(
//!     GridConfig::default(),
//!     Some(Box::new(MemorySurface::new())),
//!     media.clone(),
//!     Box::new(analyzer),
//!     &emitter,
//! )?;
//! media.play();
//! grid.dispose().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`grid`] - Feature-reactive grid engine
//! - [`morph`] - Ambient color morph engine
//! - [`emitter`] - Tick event bus and ticker
//! - [`playback`] - Media handle
//! - [`analyzer`] - Analyzer collaborator
//! - [`error`] - Error types

#![warn(missing_docs)]

/// Error types
pub mod error;

/// Analyzer collaborator
pub mod analyzer;
/// Tick event bus
pub mod emitter;
/// Media playback handle
pub mod playback;

/// Feature-reactive grid engine
pub mod grid;
/// Ambient color morph engine
pub mod morph;

// Re-exports
pub use analyzer::{AnalyzerEvent, AnalyzerListener, AnalyzerStats, AudioAnalyzer, ScriptedAnalyzer};
pub use emitter::{spawn_ticker, Emitter, OwnerTag, TICK_EVENT};
pub use error::{ControlError, Result};
pub use grid::FeatureReactiveGrid;
pub use morph::AmbientColorMorph;
pub use playback::{MediaHandle, PlaybackEvent};
