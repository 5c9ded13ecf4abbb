pub mod item;
pub mod state;

pub use item::{TabBadge, TabItem};
pub use state::TabBarState;
