pub mod reject_empty_message;
pub mod send_message_with_tip;
pub mod send_text_message;
pub mod verify_paged_lookup;
pub mod verify_thread;

pub use reject_empty_message::*;
pub use send_message_with_tip::*;
pub use send_text_message::*;
pub use verify_paged_lookup::*;
pub use verify_thread::*;
