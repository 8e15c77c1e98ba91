//! rf-surround: Object-based surround bus for ReelForge
//!
//! ## Signal flow
//! - `send` - per-track stage: mute fade, send level, latency-aligned send/thru paths
//! - `surround_return` - multiplexes sends into 10 bed + 118 object slots,
//!   evaluates pan automation sample-accurately and drives the renderer
//! - `renderer` - boundary to the external 7.1.4 + binaural renderer
//!
//! ## Support
//! - `automation` - control kinds, breakpoint lists, automation state
//! - `pannable` - per-object pan parameter set
//! - `protocol` - binary renderer control messages
//! - `track` / `bus` - track list and per-block orchestration
//! - `events` - typed change notifications
//! - `rt` - process-thread detection

pub mod amp;
pub mod automation;
pub mod bus;
pub mod config;
pub mod events;
pub mod pannable;
pub mod protocol;
pub mod renderer;
pub mod rt;
pub mod send;
pub mod surround_return;
pub mod track;

mod error;

pub use automation::{AutoState, AutomationControl, AutomationList, ControlEvent, ControlKind, ControlState};
pub use bus::SurroundBus;
pub use config::{GainRamp, SurroundConfig};
pub use error::{SurroundError, SurroundResult};
pub use events::{ConnectionId, ControlChange, LatencyChange, Notifier, SendSignals};
pub use pannable::{BinauralRenderMode, Pannable, PannableState, PanValues, NUM_PAN_PARAMETERS};
pub use protocol::{ControlForge, ControlMessage, ProtocolError, ATOM_BUFFER_SIZE};
pub use renderer::{
    RendererRegistry, SurroundRenderer, DEFAULT_RENDERER_URI, MAX_OBJECT_ID, RENDER_OUTPUT_CHANNELS,
};
pub use send::{BlockState, MuteMaster, SendRole, SendState, SurroundSend};
pub use surround_return::{
    CycleReport, FlushHandle, ReturnState, SurroundReturn, FIRST_OBJECT_ID, NUM_BED_CHANNELS,
};
pub use track::{Track, TrackId, TrackList};
