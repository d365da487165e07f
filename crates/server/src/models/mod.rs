mod card;
mod chirp;
mod notification;
mod user;

pub use card::*;
pub use chirp::*;
pub use notification::*;
pub use user::*;
