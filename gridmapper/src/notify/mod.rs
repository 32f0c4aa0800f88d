//! Change notification boundary.

mod event;
mod notifier;

pub use event::MapEvent;
pub use notifier::{ChangeNotifier, ChannelNotifier, NoOpNotifier};
