//! Incremental search-result loader.
//!
//! Client-side controller for a paginated, streaming search-results page:
//! a poll loop that repeatedly requests the next slice of results until the
//! server signals completion, a skeleton pool that pre-allocates placeholder
//! slots so content lands without reflow, and a scroll trigger whose guard
//! keeps overlapping load cycles from corrupting the pagination cursor.
//!
//! The results endpoint is an external collaborator consumed through
//! [`source::ResultSource`]; rendering is pluggable through
//! [`render::Renderer`].

pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod pool;
pub mod render;
pub mod session;
pub mod source;

pub use config::{load_settings, Config, Settings};
pub use error::FetchError;
pub use loader::{LoaderSnapshot, LoopSignal, SearchLoader, ViewportMetrics};
pub use models::{EngineTags, Query, ResponseBody, ResultDomain, ResultPage, SearchResult};
pub use pool::{SkeletonPool, Slot, SlotState};
pub use render::{ConsoleRenderer, HtmlRenderer, HtmlSlot, Renderer};
pub use session::{PollState, Session};
pub use source::{Addressing, HttpResultSource, ResultSource};
