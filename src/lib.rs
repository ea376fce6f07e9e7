// Partyline - mount applications side by side and let them talk
//
// A router dispatches requests to mounted applications by longest path
// prefix; a partyline bus lets those applications query each other in
// process once the invitation handshake has handed each one its operator.

// Re-export core functionality
pub use partyline_core::*;

// Re-export logging bootstrap
pub use partyline_log;

// Re-export optional crates
#[cfg(feature = "config")]
pub use partyline_config;

#[cfg(feature = "testing")]
pub use partyline_testing;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Application, BASE_URL_KEY, DEFAULT_PARTYLINE_KEY, Environ, Error, Handler, HandlerError,
        Invitee, Operator, Party, PartyConfig, Partyline, Request, Response, Router, Rsvp,
    };
    pub use serde_json::{Value, json};
}
