// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate html5tree;

use html5tree::arena_dom::{ArenaDom, NodeId};
use html5tree::serialize::{SerializeOpts, TraversalScope};
use html5tree::tendril::TendrilSink;
use html5tree::{parse, parse_fragment, serialize, ParseOpts, QualName};

fn write(dom: &ArenaDom, node: NodeId, opts: SerializeOpts) -> String {
    let mut out = vec![];
    serialize(&mut out, dom, node, opts).expect("writing to a Vec");
    String::from_utf8(out).expect("serializer wrote UTF-8")
}

/// Parse `input` as the content of a `<body>` and write it back.
fn body_round_trip(input: &str) -> String {
    let context = QualName::new(None, ns!(html), local_name!("body"));
    let dom = parse_fragment(ArenaDom::default(), ParseOpts::default(), context, vec![]).one(input);
    let root = dom.children(dom.document())[0];
    write(&dom, root, SerializeOpts::default())
}

fn document_to_string(dom: &ArenaDom) -> String {
    write(dom, dom.document(), SerializeOpts::default())
}

/// Each pair is an input and its expected output; `None` means the
/// input comes back unchanged.
fn check(cases: &[(&str, Option<&str>)]) {
    for &(input, expected) in cases {
        let expected = expected.unwrap_or(input);
        assert_eq!(body_round_trip(input), expected, "input: {input:?}");
    }
}

#[test]
fn plain_markup() {
    check(&[
        ("", None),
        ("<p><i>Hello</i>, World!</p>", None),
        ("<p><i>Hello!</p>, World!</i>", Some("<p><i>Hello!</i></p><i>, World!</i>")),
        ("<ul><li>a<li>b</ul>", Some("<ul><li>a</li><li>b</li></ul>")),
        ("<br/><img src=x>", Some(r#"<br><img src="x">"#)),
    ]);
}

#[test]
fn attribute_values() {
    check(&[
        (r#"<base foo="<'>">"#, None),
        (r#"<base foo="&amp;">"#, None),
        (r#"<base foo=&amp>"#, Some(r#"<base foo="&amp;">"#)),
        ("<base foo=x\u{a0}y>", Some(r#"<base foo="x&nbsp;y">"#)),
        (r#"<base foo='"'>"#, Some(r#"<base foo="&quot;">"#)),
        (
            r#"<span a=3 b='say "hi" &amp;quot;'>"#,
            Some(r#"<span a="3" b="say &quot;hi&quot; &amp;quot;"></span>"#),
        ),
    ]);
}

#[test]
fn text_escaping() {
    check(&[
        (r#"<p>"'"</p>"#, None),
        ("<p>&amp;</p>", None),
        ("<p>&amp</p>", Some("<p>&amp;</p>")),
        ("<p>x\u{a0}y</p>", Some("<p>x&nbsp;y</p>")),
        ("<p>&lt;</p>", None),
        ("<p>&gt;</p>", None),
        ("<p>></p>", Some("<p>&gt;</p>")),
    ]);
}

#[test]
fn raw_text_elements_are_not_escaped() {
    let body = r#"(x & 1) < 2; y > "a" + 'b'"#;
    for name in ["script", "style", "xmp", "iframe", "noembed", "noframes"] {
        let input = format!("<{name}>{body}</{name}>");
        assert_eq!(body_round_trip(&input), input);
    }
    check(&[("<noscript><b>(x & 1) < 2</b></noscript>", None)]);
}

#[test]
fn leading_newline_survives() {
    for name in ["pre", "textarea", "listing"] {
        let plain = format!("<{name}>foo bar</{name}>");
        let one = format!("<{name}>\nfoo bar</{name}>");
        let two = format!("<{name}>\n\nfoo bar</{name}>");
        assert_eq!(body_round_trip(&plain), plain);
        // The parser drops one newline, so a single one is lost.
        assert_eq!(body_round_trip(&one), plain);
        assert_eq!(body_round_trip(&two), two);
    }
}

#[test]
fn comments_keep_their_spacing() {
    check(&[
        ("<p>hi <!--world--></p>", None),
        ("<p>hi <!-- world--></p>", None),
        ("<p>hi <!--world --></p>", None),
        ("<p>hi <!-- world --></p>", None),
    ]);
}

#[test]
fn foreign_attribute_prefixes() {
    check(&[
        (r#"<svg xmlns="bleh"></svg>"#, None),
        (r#"<svg xmlns:foo="bleh"></svg>"#, None),
        (r#"<svg xmlns:xlink="bleh"></svg>"#, None),
        (r#"<svg xlink:href="bleh"></svg>"#, None),
        (r#"<math definitionurl="x"></math>"#, Some(r#"<math definitionURL="x"></math>"#)),
    ]);
}

#[test]
fn tree_fixups_show_in_output() {
    check(&[
        ("<template><p>x</p></template>", None),
        (
            "<table><tr><td>1</td></tr></table>",
            Some("<table><tbody><tr><td>1</td></tr></tbody></table>"),
        ),
        ("<table>A<tr><td>B</table>", Some("A<table><tbody><tr><td>B</td></tr></tbody></table>")),
    ]);
}

#[test]
fn doctype() {
    let (dom, _) = parse("<!doctype html>", ArenaDom::default(), true);
    assert_eq!(
        document_to_string(&dom),
        "<!DOCTYPE html><html><head></head><body></body></html>"
    );
}

#[test]
fn include_node_scope() {
    let (dom, _) = parse("<p class=a>x</p>", ArenaDom::default(), true);
    let html = dom.children(dom.document())[0];
    let body = dom.children(html)[1];
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    assert_eq!(write(&dom, body, opts), r#"<body><p class="a">x</p></body>"#);
}

#[test]
fn reparsing_serialized_output_is_stable() {
    let inputs = [
        "<p>1<b>2<i>3</p>4</b>5</i>6",
        "<table>A<tr><td>B</table>",
        "<ul><li>a<li>b</ul><dl><dt>x<dd>y</dl>",
        "<svg viewbox='0 0 1 1'><foreignObject><p>x</p></foreignObject></svg>",
        "<select><option>a<optgroup><option>b</select>",
    ];
    for input in inputs {
        let (first, _) = parse(input, ArenaDom::default(), true);
        let once = document_to_string(&first);
        let (second, _) = parse(&once, ArenaDom::default(), true);
        assert_eq!(once, document_to_string(&second), "input: {input}");
    }
}
