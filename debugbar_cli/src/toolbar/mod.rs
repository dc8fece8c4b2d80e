//! Headless toolbar controllers
//!
//! Panel selection, the sticky panel, the live request feed and the small
//! widgets around them. Nothing here draws; front ends render the views
//! these controllers expose.

pub mod feed;
pub mod hover;
pub mod logger;
pub mod panels;
pub mod sortable;
pub mod sticky;

pub use feed::{
    render_html, EventHandler, EventSink, FeedStatus, FeedUpdate, PushChannel, PushEvent,
    PushMessage, RequestFeedController, RequestRow, Subscription,
};
pub use hover::{HoverFired, HoverIntent};
pub use panels::{CloseOutcome, PanelController, SwitchState};
pub use sortable::{Column, SortState};
pub use sticky::{RestoreOutcome, StickyPanelController};
