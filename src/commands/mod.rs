mod login;
mod logout;

pub use login::{login, LoginOpt};
pub use logout::{logout, LogoutOpt};
