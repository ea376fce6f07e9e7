//! Cross-application URL building over the partyline.
//!
//! Four sites share one process: a root site plus `/one` and `/two`, which
//! join the partyline, and `/three`, which does not. A participating site
//! builds links to pages it does not own by asking the others over the
//! `url` service; the first answer wins.
//!
//! Run with: `cargo run --example cross_app_urls`
//!
//! Set `PARTYLINE_LOG_LEVEL=debug` to watch the handshake.

use partyline::partyline_log::{LogConfig, info};
use partyline::prelude::*;
use std::collections::HashMap;
use std::sync::OnceLock;

const INVITE_PATH: &str = "/__invite__";

type Page = fn(&Site, &Request) -> Result<String, Error>;

/// A participating site: named pages plus a handshake endpoint
struct Site {
    name: &'static str,
    pages: HashMap<String, (String, Page)>,
    invitee: Invitee,
    /// Base URL plus mount point, learned on the handshake
    url_root: OnceLock<String>,
}

impl Site {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            pages: HashMap::new(),
            invitee: Invitee::new(),
            url_root: OnceLock::new(),
        }
    }

    fn page(mut self, endpoint: &str, path: &str, render: Page) -> Self {
        self.pages
            .insert(endpoint.to_string(), (path.to_string(), render));
        self
    }

    fn join_party(&self, request: &Request) -> Result<Response, Error> {
        let operator = self.invitee.accept(request, DEFAULT_PARTYLINE_KEY)?;

        let base_url = request
            .environ
            .get::<String>(BASE_URL_KEY)
            .cloned()
            .unwrap_or_default();
        let prefix = self
            .url_root
            .get_or_init(|| format!("{}{}", base_url, request.script_name));
        let endpoints: HashMap<String, String> = self
            .pages
            .iter()
            .map(|(endpoint, (path, _))| (endpoint.clone(), format!("{}{}", prefix, path)))
            .collect();

        operator.connect("ping", Handler::constant(json!("pong")));
        operator.connect(
            "url",
            Handler::new(move |payload: &Value| {
                payload
                    .as_str()
                    .and_then(|endpoint| endpoints.get(endpoint))
                    .map(|url| json!(url))
                    .ok_or(HandlerError::Declined)
            }),
        );
        Ok(Response::text("ok"))
    }

    /// URL of a page, asking the partyline when it is not ours
    fn url_for(&self, endpoint: &str, request: &Request) -> Result<Option<String>, Error> {
        if let Some((path, _)) = self.pages.get(endpoint) {
            let root = self.url_root.get().unwrap_or(&request.script_name);
            return Ok(Some(format!("{}{}", root, path)));
        }

        let Some(operator) = self.invitee.operator() else {
            return Ok(None);
        };
        let answers = operator.ask_around("url", &json!(endpoint))?;
        Ok(answers
            .into_iter()
            .find_map(|answer| answer.as_str().map(str::to_string)))
    }
}

impl Application for Site {
    fn call(&self, request: Request) -> Result<Response, Error> {
        if request.path == INVITE_PATH {
            return self.join_party(&request);
        }

        let path = if request.path.is_empty() {
            "/"
        } else {
            request.path.as_str()
        };
        let render = self
            .pages
            .values()
            .find(|(page_path, _)| page_path == path)
            .map(|(_, render)| *render)
            .ok_or_else(|| Error::NotFound(request.full_path()))?;

        Ok(Response::html(render(self, &request)?))
    }
}

fn link(site: &Site, request: &Request, endpoint: &str) -> Result<String, Error> {
    Ok(site
        .url_for(endpoint, request)?
        .unwrap_or_else(|| "#".to_string()))
}

fn root_index(site: &Site, request: &Request) -> Result<String, Error> {
    if !site.invitee.is_connected() {
        return Ok("I have no friends.".to_string());
    }
    let friends = site
        .invitee
        .operator()
        .map(|operator| operator.ask_around("ping", &Value::Null))
        .transpose()?
        .unwrap_or_default();
    if friends.is_empty() {
        return Ok("I have no friends.".to_string());
    }

    Ok(format!(
        "<p>You are in the {} application.</p>\n\
         <ul>\n  <li><a href=\"{}\">Go to application one</a></li>\n  \
         <li><a href=\"{}\">Go to application two</a></li>\n</ul>",
        site.name,
        link(site, request, "one:index")?,
        link(site, request, "two:index")?,
    ))
}

fn one_index(site: &Site, request: &Request) -> Result<String, Error> {
    Ok(format!(
        "This is app one. <a href=\"{}\">Go to two.</a>",
        link(site, request, "two:index")?
    ))
}

fn two_index(site: &Site, request: &Request) -> Result<String, Error> {
    Ok(format!(
        "This is app two. <a href=\"{}\">Go to one.</a>",
        link(site, request, "one:index")?
    ))
}

fn build_party(invite: bool) -> Result<Party, Error> {
    let root = Site::new("root").page("index", "/", root_index);
    let one = Site::new("one").page("one:index", "/", one_index);
    let two = Site::new("two").page("two:index", "/", two_index);
    let three = |request: Request| -> Result<Response, Error> {
        match request.path.as_str() {
            "" | "/" => Ok(Response::text("I do not participate in parties.")),
            _ => Err(Error::NotFound(request.full_path())),
        }
    };

    let mut builder = Party::builder()
        .root(root)
        .mount("/one", one)
        .mount("/two", two)
        .mount("/three", three)
        .ignore_missing_services(true);
    if invite {
        builder = builder.base_url("http://localhost:5000").invites([
            INVITE_PATH.to_string(),
            format!("/one{}", INVITE_PATH),
            format!("/two{}", INVITE_PATH),
        ]);
    }
    builder.build()
}

fn show(party: &Party, path: &str) {
    match party.dispatch(Request::new(path)) {
        Ok(response) => println!("GET {} -> {}\n{}\n", path, response.status, response.body_text()),
        Err(error) => println!("GET {} -> {} ({})\n", path, error.status_code(), error),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = LogConfig::from_env().init()?;

    let lonely = build_party(false)?;
    info!("Party without invitations");
    show(&lonely, "/");

    let party = build_party(true)?;
    info!(
        accepted = party.rsvps().iter().filter(|rsvp| rsvp.is_accepted()).count(),
        "Party started"
    );

    for path in ["/", "/one", "/two/", "/three", "/one/__invite__"] {
        show(&party, path);
    }

    let pongs = party.operator().ask_around("ping", &Value::Null)?;
    println!("Everyone answering ping: {:?}", pongs);

    Ok(())
}
