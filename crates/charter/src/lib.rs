//! Charter: a live candlestick chart with indicator overlays.
//!
//! [`ChartState`] drives one chart surface. Input goes in through
//! [`InputEvent`]s and [`Command`]s, feed data through
//! [`FeedMessage`](charter_data::FeedMessage)s from a [`FeedSession`], and
//! every call to [`ChartState::frame`] may draw onto a
//! [`Surface`](charter_render::Surface).

pub mod events;
pub mod input;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod viewport;

pub use events::{Command, EventBus, Overlay};
pub use input::{InputAction, InputEvent, InputRouter, PointerKind, Section};
pub use scheduler::RedrawScheduler;
pub use session::FeedSession;
pub use state::{indicator_params, ChartState, ChartStatus, FeedStatus, StreamStatus};
pub use viewport::{AnimationTarget, DividerState, ViewportController, ViewportSettings};
