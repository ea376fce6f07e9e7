//! Testing utilities for partyline applications.
//!
//! - [`RecordingApp`] - answers a fixed response and remembers every request
//! - [`JoiningApp`] - accepts the invitation and registers scripted services
//! - Assertions over partyline answers, responses and RSVPs
//!
//! ```
//! use partyline_core::Party;
//! use partyline_testing::*;
//! use serde_json::json;
//!
//! let one = JoiningApp::new().service("ping", json!("pong from one"));
//! let two = JoiningApp::new().service("ping", json!("pong from two"));
//!
//! let party = Party::builder()
//!     .mount("/one", one.clone())
//!     .mount("/two", two.clone())
//!     .invites(["/one/__invite__", "/two/__invite__"])
//!     .build()
//!     .unwrap();
//! assert_all_accepted(party.rsvps());
//!
//! let answers = one.operator().unwrap().ask_around("ping", &json!(null)).unwrap();
//! assert_answers(&answers, &[json!("pong from two")]);
//! ```

pub mod assertions;
pub mod mock;

pub use assertions::*;
pub use mock::{JoiningApp, RecordedRequest, RecordingApp};
