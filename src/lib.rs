//! Frame-stepped vocal typing pipeline.
//!
//! Keystrokes are buffered by [`input::InputQueue`], tokenized by the sheet
//! markup rules in [`sheet`], expanded to timed phonemes by
//! [`phoneme::Expander`], and queued in the rate-tracked
//! [`output::OutputQueue`]. [`pipeline::Pipeline::tick`] moves everything one
//! frame forward and pops a single event for the voice.
//!
//! ```
//! use sheetvox::pipeline::Pipeline;
//!
//! let mut pipeline = Pipeline::with_defaults().unwrap();
//! pipeline.feed_text("the SUN rises");
//! let state = pipeline.tick_default();
//! assert_eq!(state.last_phoneme.as_deref(), Some("dh"));
//! ```

pub mod config;
pub mod error;
#[doc(hidden)]
pub mod harness;
pub mod input;
#[doc(hidden)]
pub mod invariant_ppt;
pub mod output;
pub mod phoneme;
pub mod pipeline;
pub mod scoring;
pub mod sheet;
pub mod voice;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use input::{Keystroke, Modifiers};
pub use output::{BufferSnapshot, Zone};
pub use phoneme::PhonemeEvent;
pub use pipeline::{Pipeline, PipelineState};
pub use sheet::{Emphasis, Token};
