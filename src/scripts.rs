//! Remote script inlining.
//!
//! Every `<script src>` that points at `http://` or `https://` is fetched
//! and replaced by an inline `<script>` carrying the response body verbatim.
//! A failed fetch is logged and the original element stays in place.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::dom::{self, Document, Element, Node};
use crate::error::FetchError;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Source of remote script bodies.
pub trait Fetch {
    /// GET `url` and return its body as text. Non-2xx statuses are errors.
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Blocking HTTP fetcher backed by reqwest.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::build(None)
    }

    /// `None` keeps reqwest's default timeout.
    fn build(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let request_error = |source: reqwest::Error| FetchError::Request {
            url: url.to_owned(),
            source,
        };
        let response = self.client.get(url).send().map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        response.text().map_err(request_error)
    }
}

/// Outcome counts of one inlining pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InlineReport {
    pub inlined: usize,
    pub failed: usize,
    pub local: usize,
}

/// Check if a script source must be fetched over the network.
pub fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

fn has_src(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|el| el.is("script") && el.attributes.contains("src"))
}

/// Replace remote `<script src>` elements with inline scripts, in document
/// order. Each occurrence is fetched separately, duplicates included.
pub fn inline_remote_scripts(doc: &mut Document, fetcher: &dyn Fetch) -> InlineReport {
    let mut report = InlineReport::default();

    for path in dom::find_paths(&doc.children, &has_src) {
        let Some(node) = dom::node_at_mut(&mut doc.children, &path) else {
            continue;
        };
        let src = match node.as_element().and_then(|el| el.attributes.get("src")) {
            Some(Some(src)) => src.to_owned(),
            _ => continue,
        };

        if !is_remote(&src) {
            log::debug!("[scripts] keeping local src='{src}'");
            report.local += 1;
            continue;
        }

        match fetcher.fetch(&src) {
            Ok(body) => {
                log::debug!("[scripts] inlined url={src} bytes={}", body.len());
                *node = inline_script(body);
                report.inlined += 1;
            }
            Err(e) => {
                // Printed regardless of RUST_LOG; a kept remote script is
                // always worth seeing.
                eprintln!("[scripts] fetch failed url={src} reason='{e}'");
                report.failed += 1;
            }
        }
    }

    report
}

fn inline_script(body: String) -> Node {
    let mut script = Element::new("script");
    script.children.push(Node::Text(body));
    Node::Element(script)
}
