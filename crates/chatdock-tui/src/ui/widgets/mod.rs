//! Reusable widgets for the chatdock TUI.

pub mod launcher;
pub mod message_list;
pub mod status_bar;
pub mod text_input;

pub use launcher::Launcher;
pub use message_list::{max_scroll_back, MessageList};
pub use status_bar::{KeyHint, StatusBar};
pub use text_input::{TextInput, TextInputState};
