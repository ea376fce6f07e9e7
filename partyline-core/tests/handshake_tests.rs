//! End-to-end tests of the invitation handshake and partyline queries.

use parking_lot::Mutex;
use partyline_core::*;
use serde_json::{Value, json};
use std::sync::Arc;

const INVITE: &str = "/__invite__";

/// Participant that offers `ping` and remembers what it was asked.
struct PingApp {
    invitee: Invitee,
    pings: Arc<Mutex<usize>>,
}

impl PingApp {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            invitee: Invitee::new(),
            pings: Arc::new(Mutex::new(0)),
        })
    }

    fn operator(&self) -> Arc<Operator> {
        self.invitee.operator().cloned().expect("joined")
    }
}

impl Application for PingApp {
    fn call(&self, request: Request) -> Result<Response, Error> {
        if request.path == INVITE {
            let operator = self.invitee.accept(&request, DEFAULT_PARTYLINE_KEY)?;
            let pings = self.pings.clone();
            operator.connect(
                "ping",
                Handler::new(move |_: &Value| {
                    *pings.lock() += 1;
                    Ok(json!("pong"))
                }),
            );
            return Ok(Response::text("ok"));
        }
        Err(Error::NotFound(request.full_path()))
    }
}

fn party_of(a: &Arc<PingApp>, b: &Arc<PingApp>) -> Party {
    Party::builder()
        .mount_arc("/a", a.clone())
        .mount_arc("/b", b.clone())
        .invites(["/a/__invite__", "/b/__invite__"])
        .build()
        .unwrap()
}

#[test]
fn ping_answers_from_everyone_but_the_caller() {
    let a = PingApp::new();
    let b = PingApp::new();
    let party = party_of(&a, &b);

    let everyone = party
        .partyline()
        .ask_around("ping", &Value::Null, None)
        .unwrap();
    assert_eq!(everyone, vec![json!("pong"), json!("pong")]);

    let from_a = a.operator().ask_around("ping", &Value::Null).unwrap();
    assert_eq!(from_a, vec![json!("pong")]);
    assert_eq!(*a.pings.lock(), 1);
    assert_eq!(*b.pings.lock(), 2);
}

#[test]
fn repeated_handshake_keeps_first_registration() {
    let a = PingApp::new();
    let b = PingApp::new();
    let party = party_of(&a, &b);
    let before: Vec<HandlerId> = party
        .partyline()
        .registrations("ping")
        .iter()
        .map(|r| r.handler.id())
        .collect();

    let rsvps = party.send_invitations(&["/a/__invite__", "/b/__invite__"]);

    assert!(rsvps.iter().all(|rsvp| !rsvp.is_accepted()));
    for rsvp in &rsvps {
        let error = rsvp.outcome.as_ref().unwrap_err();
        assert_eq!(error.status_code(), 404);
    }
    let after: Vec<HandlerId> = party
        .partyline()
        .registrations("ping")
        .iter()
        .map(|r| r.handler.id())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn invite_path_is_not_found_for_live_traffic_after_joining() {
    let a = PingApp::new();
    let b = PingApp::new();
    let party = party_of(&a, &b);

    let result = party.dispatch(Request::new("/a/__invite__"));
    assert!(matches!(result, Err(Error::DuplicateHandshake(_))));
    assert_eq!(party.partyline().handler_count("ping"), 2);
}

#[test]
fn registration_order_follows_invitation_order() {
    let a = PingApp::new();
    let b = PingApp::new();
    let party = Party::builder()
        .mount_arc("/a", a.clone())
        .mount_arc("/b", b.clone())
        .invites(["/b/__invite__", "/a/__invite__"])
        .build()
        .unwrap();

    let owners: Vec<Option<OperatorId>> = party
        .partyline()
        .registrations("ping")
        .iter()
        .map(|r| r.owner)
        .collect();
    assert_eq!(owners, vec![Some(b.operator().id()), Some(a.operator().id())]);
}

#[test]
fn strict_and_lenient_missing_services() {
    let strict = Party::builder().build().unwrap();
    assert!(matches!(
        strict.operator().ask_around("nobody", &Value::Null),
        Err(Error::NoSuchServiceName(_))
    ));

    let lenient = Party::builder().ignore_missing_services(true).build().unwrap();
    assert_eq!(
        lenient.operator().ask_around("nobody", &Value::Null).unwrap(),
        Vec::<Value>::new()
    );
}

#[test]
fn deferred_handshake_after_construction() {
    let a = PingApp::new();
    let party = Party::builder().mount_arc("/late", a.clone()).build().unwrap();
    assert!(party.rsvps().is_empty());
    assert!(!a.invitee.is_connected());

    let rsvps = party.send_invitations(&["/late/__invite__"]);
    assert!(rsvps[0].is_accepted());
    assert_eq!(party.partyline().handler_count("ping"), 1);
}
