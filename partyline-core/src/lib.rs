//! Core of the partyline: in-process routing and a synchronous message bus
//! for applications mounted side by side in one process.
//!
//! - [`Router`] picks a mounted application by longest path prefix.
//! - [`Partyline`] maps service names to ordered handlers and fans queries
//!   out to them.
//! - [`Operator`] is a mounted application's handle on the partyline; its
//!   queries skip the handlers it registered itself.
//! - [`Party`] owns a router and a partyline and runs the invitation
//!   handshake that hands each application its operator.

pub mod application;
pub mod bus;
pub mod environ;
pub mod error;
pub mod handler;
pub mod http;
pub mod invitation;
pub mod operator;
pub mod party;
pub mod routing;

pub use application::{Application, NotFoundApp};
pub use bus::{Broadcast, Partyline, PartylineBuilder, PartylineConfig, Registration};
pub use environ::Environ;
pub use error::{Error, HandlerError, Result};
pub use handler::{Handler, HandlerFn, HandlerId};
pub use http::{Request, Response};
pub use invitation::{invitation_request, Invitee, Rsvp, BASE_URL_KEY, DEFAULT_PARTYLINE_KEY};
pub use operator::{Operator, OperatorId};
pub use party::{Party, PartyBuilder, PartyConfig};
pub use routing::{Mount, RouteMatch, Router, RouterBuilder};
