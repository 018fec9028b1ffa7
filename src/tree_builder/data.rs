// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Doctype checks: is the doctype conforming, and which quirks mode does
//! it select.

use tendril::StrTendril;

use crate::interface::{LimitedQuirks, NoQuirks, Quirks, QuirksMode};
use crate::tokenizer::Doctype;

// These should all be lowercase, for ASCII-case-insensitive matching.
static QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

static QUIRKY_PUBLIC_MATCHES: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

static QUIRKY_SYSTEM_MATCHES: &[&str] = &[
    "http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd",
];

static LIMITED_QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd xhtml 1.0 frameset//",
    "-//w3c//dtd xhtml 1.0 transitional//",
];

static HTML4_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

/// Returns whether the doctype deserves a parse error, and the quirks mode
/// it selects.
pub(crate) fn doctype_error_and_quirks(
    doctype: &Doctype,
    iframe_srcdoc: bool,
) -> (bool, QuirksMode) {
    fn opt_tendril_as_slice(x: &Option<StrTendril>) -> Option<&str> {
        x.as_ref().map(|t| &**t)
    }

    // Quirks-mode matches are case-insensitive.
    fn contains_pfx(haystack: &[&str], needle: &str) -> bool {
        haystack.iter().any(|&x| {
            needle.len() >= x.len() && needle.as_bytes()[..x.len()].eq_ignore_ascii_case(x.as_bytes())
        })
    }

    let name = opt_tendril_as_slice(&doctype.name);
    let public = opt_tendril_as_slice(&doctype.public_id);
    let system = opt_tendril_as_slice(&doctype.system_id);

    let err = match (name, public, system) {
        (Some("html"), None, None) |
        (Some("html"), None, Some("about:legacy-compat")) |
        (Some("html"), Some("-//W3C//DTD HTML 4.0//EN"), None) |
        (Some("html"), Some("-//W3C//DTD HTML 4.0//EN"), Some("http://www.w3.org/TR/REC-html40/strict.dtd")) |
        (Some("html"), Some("-//W3C//DTD HTML 4.01//EN"), None) |
        (Some("html"), Some("-//W3C//DTD HTML 4.01//EN"), Some("http://www.w3.org/TR/html4/strict.dtd")) |
        (Some("html"), Some("-//W3C//DTD XHTML 1.0 Strict//EN"), Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd")) |
        (Some("html"), Some("-//W3C//DTD XHTML 1.1//EN"), Some("http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd")) => false,

        _ => true,
    };

    let quirk = match (public, system) {
        _ if doctype.force_quirks => Quirks,
        _ if name != Some("html") => Quirks,

        _ if iframe_srcdoc => NoQuirks,

        (Some(p), _) if QUIRKY_PUBLIC_MATCHES.iter().any(|x| p.eq_ignore_ascii_case(x)) => Quirks,
        (_, Some(s)) if QUIRKY_SYSTEM_MATCHES.iter().any(|x| s.eq_ignore_ascii_case(x)) => Quirks,

        (Some(p), _) if contains_pfx(QUIRKY_PUBLIC_PREFIXES, p) => Quirks,
        (Some(p), _) if contains_pfx(LIMITED_QUIRKY_PUBLIC_PREFIXES, p) => LimitedQuirks,

        // HTML 4.01 Frameset and Transitional are almost-standards even
        // without a system identifier.
        (Some(p), _) if contains_pfx(HTML4_PUBLIC_PREFIXES, p) => LimitedQuirks,

        _ => NoQuirks,
    };

    (err, quirk)
}

#[cfg(test)]
mod test {
    use super::doctype_error_and_quirks;
    use crate::interface::{LimitedQuirks, NoQuirks, Quirks};
    use crate::tokenizer::Doctype;

    fn doctype(name: &str, public: Option<&str>, system: Option<&str>) -> Doctype {
        Doctype {
            name: Some(name.into()),
            public_id: public.map(Into::into),
            system_id: system.map(Into::into),
            force_quirks: false,
        }
    }

    #[test]
    fn html5_doctype_is_standards() {
        assert_eq!(doctype_error_and_quirks(&doctype("html", None, None), false), (false, NoQuirks));
    }

    #[test]
    fn legacy_compat_is_conforming() {
        let dt = doctype("html", None, Some("about:legacy-compat"));
        assert_eq!(doctype_error_and_quirks(&dt, false), (false, NoQuirks));
    }

    #[test]
    fn html401_transitional_without_system_id() {
        let dt = doctype("html", Some("-//W3C//DTD HTML 4.01 Transitional//EN"), None);
        assert_eq!(doctype_error_and_quirks(&dt, false), (true, LimitedQuirks));
    }

    #[test]
    fn xhtml_transitional_is_limited_quirks() {
        let dt = doctype(
            "html",
            Some("-//W3C//DTD XHTML 1.0 Transitional//EN"),
            Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd"),
        );
        assert_eq!(doctype_error_and_quirks(&dt, false).1, LimitedQuirks);
    }

    #[test]
    fn legacy_public_prefix_is_case_insensitive() {
        let dt = doctype("html", Some("-//IETF//DTD HTML 2.0//EN"), None);
        assert_eq!(doctype_error_and_quirks(&dt, false), (true, Quirks));
    }

    #[test]
    fn quirky_system_id() {
        let dt = doctype(
            "html",
            None,
            Some("http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd"),
        );
        assert_eq!(doctype_error_and_quirks(&dt, false).1, Quirks);
    }

    #[test]
    fn wrong_name_or_forced() {
        assert_eq!(doctype_error_and_quirks(&doctype("foo", None, None), false), (true, Quirks));
        let mut dt = doctype("html", None, None);
        dt.force_quirks = true;
        assert_eq!(doctype_error_and_quirks(&dt, false).1, Quirks);
    }

    #[test]
    fn iframe_srcdoc_is_never_quirky() {
        let dt = doctype("html", Some("-//W3O//DTD W3 HTML 3.0//EN"), None);
        assert_eq!(doctype_error_and_quirks(&dt, false).1, Quirks);
        assert_eq!(doctype_error_and_quirks(&dt, true).1, NoQuirks);
    }
}
