// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runs the html5lib tree-construction fixtures under
//! `data/test/tree-construction`, comparing the `| `-indented dump of
//! the parsed tree with each case's `#document` section.

extern crate rustc_test as test;
#[macro_use]
extern crate html5tree;

mod foreach_html5lib_test;
use foreach_html5lib_test::foreach_html5lib_test;

use std::ffi::OsStr;
use std::fmt::Write;
use std::io::Read;
use std::path::Path;
use std::env;
use test::{DynTestName, TestDesc, TestDescAndFn, TestFn};

use html5tree::arena_dom::{ArenaDom, NodeData, NodeId};
use html5tree::tendril::{StrTendril, TendrilSink};
use html5tree::{parse_document, parse_fragment, ParseOpts};
use html5tree::{LocalName, QualName};

/// One `#data` block of a `.dat` file.
#[derive(Default, Clone)]
struct Case {
    data: String,
    document: String,
    fragment: Option<String>,
    /// `None` when the case holds with scripting both on and off.
    scripting: Option<bool>,
}

fn read_cases(text: &str) -> Vec<Case> {
    let mut cases: Vec<Case> = vec![];
    let mut section = "";
    for line in text.lines() {
        if line == "#data" {
            cases.push(Case::default());
            section = "data";
            continue;
        }
        let Some(case) = cases.last_mut() else {
            continue;
        };
        if let Some(name) = line.strip_prefix('#') {
            section = name;
            match name {
                "script-on" => case.scripting = Some(true),
                "script-off" => case.scripting = Some(false),
                "document-fragment" => case.fragment = Some(String::new()),
                _ => (),
            }
            continue;
        }
        let field = match section {
            "data" => &mut case.data,
            "document" => &mut case.document,
            "document-fragment" => case.fragment.get_or_insert_with(String::new),
            _ => continue,
        };
        if section == "data" && !field.is_empty() {
            field.push('\n');
        }
        field.push_str(line);
        if section != "data" {
            field.push('\n');
        }
    }
    for case in &mut cases {
        let document = case.document.trim_end_matches('\n').len();
        case.document.truncate(document);
        if let Some(fragment) = case.fragment.as_mut() {
            let trimmed = fragment.trim().to_string();
            *fragment = trimmed;
        }
    }
    cases
}

fn line(out: &mut String, depth: usize) {
    out.push('|');
    out.push_str(&" ".repeat(1 + 2 * depth));
}

/// The html5lib dump of `node` and everything under it.
fn dump(out: &mut String, dom: &ArenaDom, node: NodeId, depth: usize) {
    line(out, depth);
    match dom.node(node).data {
        NodeData::Document => unreachable!("the document is never dumped"),
        NodeData::Doctype {
            ref name,
            ref public_id,
            ref system_id,
        } => {
            if public_id.is_empty() && system_id.is_empty() {
                let _ = writeln!(out, "<!DOCTYPE {name}>");
            } else {
                let _ = writeln!(out, "<!DOCTYPE {name} \"{public_id}\" \"{system_id}\">");
            }
        },
        NodeData::Text { ref contents } => {
            let _ = writeln!(out, "\"{contents}\"");
        },
        NodeData::Comment { ref contents } => {
            let _ = writeln!(out, "<!-- {contents} -->");
        },
        NodeData::Element {
            ref name,
            ref attrs,
            ..
        } => {
            let space = match name.ns {
                ns!(svg) => "svg ",
                ns!(mathml) => "math ",
                _ => "",
            };
            let _ = writeln!(out, "<{space}{}>", name.local);

            let mut attrs: Vec<_> = attrs.iter().collect();
            attrs.sort_by(|a, b| a.name.local.cmp(&b.name.local));
            for attr in attrs {
                line(out, depth + 1);
                let space = match attr.name.ns {
                    ns!(xlink) => "xlink ",
                    ns!(xml) => "xml ",
                    ns!(xmlns) => "xmlns ",
                    _ => "",
                };
                let _ = writeln!(out, "{space}{}=\"{}\"", attr.name.local, attr.value);
            }
        },
    }

    for &child in dom.children(node) {
        dump(out, dom, child, depth + 1);
    }

    if let NodeData::Element {
        template_contents: Some(contents),
        ..
    } = dom.node(node).data
    {
        line(out, depth + 1);
        out.push_str("content\n");
        for &child in dom.children(contents) {
            dump(out, dom, child, depth + 2);
        }
    }
}

fn context_name(context: &str) -> QualName {
    match context.split_once(' ') {
        Some(("svg", local)) => QualName::new(None, ns!(svg), LocalName::from(local)),
        Some(("math", local)) => QualName::new(None, ns!(mathml), LocalName::from(local)),
        _ => QualName::new(None, ns!(html), LocalName::from(context)),
    }
}

fn run_case(case: &Case, scripting_enabled: bool) {
    let mut opts = ParseOpts::default();
    opts.tree_builder.scripting_enabled = scripting_enabled;
    let input = StrTendril::from_slice(&case.data);

    let (dom, top) = match case.fragment {
        None => {
            let dom = parse_document(ArenaDom::default(), opts).one(input);
            let document = dom.document();
            (dom, document)
        },
        Some(ref context) => {
            let dom = parse_fragment(ArenaDom::default(), opts, context_name(context), vec![]).one(input);
            // Fragment nodes are dumped from below the `html` root.
            let root = dom.children(dom.document())[0];
            (dom, root)
        },
    };

    let mut got = String::new();
    for &child in dom.children(top) {
        dump(&mut got, &dom, child, 0);
    }
    got.pop();

    assert!(
        got == case.document,
        "\ninput: {}\ngot:\n{}\nexpected:\n{}\n",
        case.data,
        got,
        case.document
    );
}

fn tests(src_dir: &Path) -> Vec<TestDescAndFn> {
    let mut tests = vec![];

    foreach_html5lib_test(src_dir, "tree-construction", OsStr::new("dat"), |path, mut file| {
        let mut text = String::new();
        file.read_to_string(&mut text).expect("fixture is not UTF-8");
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("?")
            .to_string();

        for (i, case) in read_cases(&text).into_iter().enumerate() {
            let modes = match case.scripting {
                Some(on) => vec![on],
                None => vec![false, true],
            };
            for scripting_enabled in modes {
                let scripting = if scripting_enabled { "on" } else { "off" };
                let case = case.clone();
                tests.push(TestDescAndFn {
                    desc: TestDesc::new(DynTestName(format!(
                        "tb: {file_name}-{i} (scripting {scripting})"
                    ))),
                    testfn: TestFn::dyn_test_fn(move || run_case(&case, scripting_enabled)),
                });
            }
        }
    });

    tests
}

fn main() {
    let args: Vec<_> = env::args().collect();
    let src_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    test::test_main(&args, tests(src_dir));
}
