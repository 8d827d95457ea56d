//! The bundling pipeline: load, inline scripts, splice sections, write.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::load;
use crate::markdown;
use crate::scripts::{self, Fetch};
use crate::serialize;

/// Settings for one run, built from the command line.
#[derive(Debug, Clone, Copy)]
pub struct BundleOptions {
    /// Fetch and inline `<script src>` elements pointing at http(s) URLs.
    pub inline_remote_scripts: bool,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            inline_remote_scripts: true,
        }
    }
}

/// Directory that every relative reference resolves against.
pub fn entry_dir(entry: &Path) -> &Path {
    entry.parent().unwrap_or_else(|| Path::new(""))
}

/// Bundle `entry` into `single_html.html` beside it and return the output
/// path. `fetcher` is only consulted when remote inlining is enabled.
///
/// Nothing is written unless every fatal step succeeds.
pub fn bundle(entry: &Path, options: BundleOptions, fetcher: &dyn Fetch) -> Result<PathBuf> {
    let dir = entry_dir(entry);
    let mut doc = load::load_document(entry)?;
    log::info!("[bundle] loaded entry='{}'", entry.display());

    if options.inline_remote_scripts {
        let report = scripts::inline_remote_scripts(&mut doc, fetcher);
        log::info!(
            "[scripts] inlined={} failed={} local={}",
            report.inlined,
            report.failed,
            report.local
        );
    } else {
        log::info!("[scripts] remote inlining disabled");
    }

    let sections = markdown::splice_markdown_sections(&mut doc, dir)?;
    log::info!("[markdown] sections={sections}");

    let output = serialize::write_output(&doc, dir)?;
    log::info!("[write] output='{}'", output.display());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fs;

    use super::*;
    use crate::error::{BundleError, FetchError};
    use crate::serialize::OUTPUT_FILE_NAME;

    /// Serves the same body for every URL and counts calls.
    struct FixedFetcher {
        body: &'static str,
        calls: Cell<usize>,
    }

    impl Fetch for FixedFetcher {
        fn fetch(&self, _url: &str) -> std::result::Result<String, FetchError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.body.to_owned())
        }
    }

    fn fetcher() -> FixedFetcher {
        FixedFetcher {
            body: "console.log(1);",
            calls: Cell::new(0),
        }
    }

    fn write_deck(dir: &Path) -> PathBuf {
        let entry = dir.join("index.html");
        fs::write(
            &entry,
            "<!DOCTYPE html><html><head>\
             <script src=\"https://cdn.example/reveal.js\"></script>\
             <script src=\"plugin/notes.js\"></script>\
             </head><body><div class=\"slides\">\
             <section data-markdown=\"intro.md\"></section>\
             <section data-markdown=\"anim.md\"></section>\
             </div></body></html>",
        )
        .expect("entry");
        fs::write(dir.join("intro.md"), "# Intro").expect("intro");
        fs::write(
            dir.join("anim.md"),
            "<div data-load=\"pic.svg\"></div>\n<!-- .element: class=\"fragment\" -->",
        )
        .expect("anim");
        fs::write(dir.join("pic.svg"), "<svg><rect width=\"2\"></rect></svg>").expect("svg");
        entry
    }

    #[test]
    fn entry_dir_of_bare_file_name_is_empty() {
        assert_eq!(entry_dir(Path::new("index.html")), Path::new(""));
        assert_eq!(entry_dir(Path::new("deck/index.html")), Path::new("deck"));
    }

    #[test]
    fn bundles_full_deck() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entry = write_deck(dir.path());
        let fetcher = fetcher();

        let output = bundle(&entry, BundleOptions::default(), &fetcher).expect("bundle");

        assert_eq!(output, dir.path().join(OUTPUT_FILE_NAME));
        let html = fs::read_to_string(&output).expect("output");
        assert_eq!(fetcher.calls.get(), 1);
        assert!(html.contains("<script>console.log(1);</script>"), "{html}");
        assert!(html.contains("<script src=\"plugin/notes.js\"></script>"), "{html}");
        assert!(!html.contains("data-markdown"), "{html}");
        assert!(html.contains("# Intro"), "{html}");
        assert!(html.contains("<div data-animate>"), "{html}");
        assert!(html.contains("<!-- .element: class=\"fragment\" -->"), "{html}");
        assert!(html.contains("<rect width=\"2\"></rect>"), "{html}");
    }

    #[test]
    fn no_remote_option_skips_fetching() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entry = write_deck(dir.path());
        let fetcher = fetcher();
        let options = BundleOptions {
            inline_remote_scripts: false,
        };

        let output = bundle(&entry, options, &fetcher).expect("bundle");

        assert_eq!(fetcher.calls.get(), 0);
        let html = fs::read_to_string(output).expect("output");
        assert!(html.contains("src=\"https://cdn.example/reveal.js\""), "{html}");
    }

    #[test]
    fn repeated_runs_are_byte_identical() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entry = write_deck(dir.path());

        let first = bundle(&entry, BundleOptions::default(), &fetcher()).expect("first");
        let first = fs::read(first).expect("read first");
        let second = bundle(&entry, BundleOptions::default(), &fetcher()).expect("second");
        let second = fs::read(second).expect("read second");

        assert_eq!(first, second);
    }

    #[test]
    fn fatal_error_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entry = write_deck(dir.path());
        fs::remove_file(dir.path().join("pic.svg")).expect("remove svg");

        let err = bundle(&entry, BundleOptions::default(), &fetcher()).expect_err("must fail");

        assert!(matches!(err, BundleError::Read { .. }));
        assert!(!dir.path().join(OUTPUT_FILE_NAME).exists());
    }
}
