//! The chapter reading view.
//!
//! [`ReaderView`] is a synchronous state machine: [`ReaderView::reduce`]
//! applies a [`Message`], runs the render pass, and returns the [`Effect`]s a
//! driver must perform. [`ReaderRuntime`] is the tokio driver.

mod messages;
mod runtime;
mod state;
mod update;
mod view;

pub use messages::Message;
pub use runtime::ReaderRuntime;
pub use state::{ChapterPhase, ReaderView, Viewport};
pub use update::Effect;
pub use view::ReaderFrame;
