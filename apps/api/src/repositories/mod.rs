//! Database repository layer for Museboxd
//!
//! Every SQL statement the API runs lives in one of these repositories.
//! Services and the auth extractor receive them by value (they are cheap
//! `PgPool` clones).

pub mod diary;
pub mod listening_history;
pub mod session;
pub mod user;
pub mod utils;

pub use diary::DiaryRepository;
pub use listening_history::ListeningHistoryRepository;
pub use session::{NewSession, SessionRepository};
pub use user::UserRepository;
