//! Domain services composed from ports.

mod session;

pub use session::{IssuedToken, ResolvedSession, Session, SessionResolver, SessionUser};
