//! Session and role authority.
//!
//! A plain server-side session keyed by a random cookie value; no token
//! signing. Users come from a JSON directory plus optional env credentials.

mod session;
mod users;

pub use session::{
    clear_session_cookie, session_cookie, session_id_from_cookie_header, Session, SessionStore,
    SESSION_COOKIE,
};
pub use users::{EnvCredential, Identity, LoginError, UserDirectory, UserRecord};
