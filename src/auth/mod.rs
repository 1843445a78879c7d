pub mod session;

pub use session::{AuthClient, Session, User};
