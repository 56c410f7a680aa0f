pub mod search_users;
pub mod verify_directory;
pub mod verify_friend_list;

pub use search_users::*;
pub use verify_directory::*;
pub use verify_friend_list::*;
