// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! High-level interface to the parser.

use std::borrow::Cow;

use log::debug;
use tendril::stream::TendrilSink;
use tendril::StrTendril;

use crate::interface::{create_element, Attribute, QualName, QuirksMode, TreeSink};
use crate::tokenizer::{EOFToken, Token, TokenSinkResult, Tokenizer, TokenizerOpts};
use crate::tree_builder::{TreeBuilder, TreeBuilderOpts};

/// All-encompassing options struct for the parser.
#[derive(Clone, Default)]
pub struct ParseOpts {
    /// Tokenizer options.
    pub tokenizer: TokenizerOpts,

    /// Tree builder options.
    pub tree_builder: TreeBuilderOpts,
}

/// Parse an HTML document
///
/// The returned value implements `tendril::TendrilSink`
/// so that Unicode input may be provided incrementally,
/// or all at once with the `one` method.
///
/// If your input is bytes, decode it to UTF-8 first.
pub fn parse_document<Sink>(sink: Sink, opts: ParseOpts) -> Parser<Sink>
where
    Sink: TreeSink,
{
    let tb = TreeBuilder::new(sink, opts.tree_builder);
    let tok = Tokenizer::new(opts.tokenizer);
    Parser {
        tokenizer: tok,
        tree_builder: tb,
    }
}

/// Parse an HTML fragment
///
/// The returned value implements `tendril::TendrilSink`
/// so that Unicode input may be provided incrementally,
/// or all at once with the `one` method.
///
/// The parsed nodes end up as children of an `html` element appended to
/// the sink's document.
pub fn parse_fragment<Sink>(
    mut sink: Sink,
    opts: ParseOpts,
    context_name: QualName,
    context_attrs: Vec<Attribute>,
) -> Parser<Sink>
where
    Sink: TreeSink,
{
    let context_elem = create_element(&mut sink, context_name, context_attrs);
    parse_fragment_for_element(sink, opts, context_elem, None)
}

/// Like `parse_fragment`, but with an existing context element
/// and optionally a form element.
pub fn parse_fragment_for_element<Sink>(
    sink: Sink,
    opts: ParseOpts,
    context_element: Sink::Handle,
    form_element: Option<Sink::Handle>,
) -> Parser<Sink>
where
    Sink: TreeSink,
{
    let context_name = sink.elem_name(&context_element).local.to_string();
    let tb =
        TreeBuilder::new_for_fragment(sink, context_element, form_element, opts.tree_builder);
    let tok_opts = TokenizerOpts {
        initial_state: Some(tb.context_content_model()),
        last_start_tag_name: Some(context_name),
        ..opts.tokenizer
    };
    let tok = Tokenizer::new(tok_opts);
    Parser {
        tokenizer: tok,
        tree_builder: tb,
    }
}

/// Parse a complete document held in a string.
///
/// Returns the sink's output together with the quirks mode the parser
/// decided on. With [`ArenaDom`](crate::arena_dom::ArenaDom) the output is
/// the DOM itself, and its [`document`](crate::arena_dom::ArenaDom::document)
/// is the root of the parsed tree.
pub fn parse<Sink>(input: &str, sink: Sink, scripting_enabled: bool) -> (Sink::Output, QuirksMode)
where
    Sink: TreeSink,
{
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut parser = parse_document(sink, opts);
    parser.process(StrTendril::from_slice(input));
    let tree_builder = parser.run_to_end();
    let quirks_mode = tree_builder.quirks_mode();
    (tree_builder.sink.finish(), quirks_mode)
}

/// Run the tokenizer alone over a complete input.
///
/// No tree builder is attached, so the content model only changes if
/// `opts.initial_state` asks for it. The last token is always `EOFToken`.
pub fn tokenize(input: &str, opts: TokenizerOpts) -> Vec<Token> {
    let mut tok = Tokenizer::new(opts);
    tok.feed(StrTendril::from_slice(input));
    tok.end();

    let mut tokens = vec![];
    while let Some(token) = tok.next_token() {
        let eof = token == EOFToken;
        tokens.push(token);
        if eof {
            break;
        }
    }
    tokens
}

/// An HTML parser,
/// ready to receive Unicode input through the `tendril::TendrilSink` trait’s methods.
pub struct Parser<Sink>
where
    Sink: TreeSink,
{
    pub tokenizer: Tokenizer,
    pub tree_builder: TreeBuilder<Sink::Handle, Sink>,
}

impl<Sink: TreeSink> Parser<Sink> {
    /// Feed one more chunk of input and run the parser as far as it goes.
    pub fn feed(&mut self, input: StrTendril) {
        self.tokenizer.feed(input);
        self.pump();
    }

    // Hand tokens to the tree builder until the tokenizer runs dry or
    // reports the end of the input.
    fn pump(&mut self) {
        while let Some(token) = self.tokenizer.next_token() {
            let eof = token == EOFToken;
            match self.tree_builder.process_token(token) {
                TokenSinkResult::Continue => (),
                TokenSinkResult::Script(_) => debug!("script element closed"),
                TokenSinkResult::SwitchTo(model) => self.tokenizer.set_content_model(model),
            }
            self.tokenizer.set_allow_cdata(self.tree_builder.cdata_allowed());
            if eof {
                break;
            }
        }
    }

    fn run_to_end(mut self) -> TreeBuilder<Sink::Handle, Sink> {
        self.tokenizer.end();
        self.pump();
        self.tree_builder.end();
        self.tree_builder
    }
}

impl<Sink: TreeSink> TendrilSink<tendril::fmt::UTF8> for Parser<Sink> {
    fn process(&mut self, t: StrTendril) {
        self.feed(t)
    }

    // FIXME: Is it too noisy to report every character decoding error?
    fn error(&mut self, desc: Cow<'static, str>) {
        self.tree_builder.sink.parse_error(desc)
    }

    type Output = Sink::Output;

    fn finish(self) -> Self::Output {
        self.run_to_end().sink.finish()
    }
}

#[cfg(test)]
mod test {
    use super::{parse, parse_document, parse_fragment, tokenize, ParseOpts};
    use crate::arena_dom::{ArenaDom, NodeData};
    use crate::interface::{NoQuirks, QualName, Quirks};
    use crate::tokenizer::{CharacterTokens, EOFToken, TagToken, TokenizerOpts};
    use crate::serialize::{serialize, SerializeOpts};
    use tendril::stream::TendrilSink;
    use tendril::StrTendril;

    fn to_html(dom: &ArenaDom) -> String {
        let mut out = vec![];
        serialize(&mut out, dom, dom.document(), SerializeOpts::default()).expect("writing to a Vec");
        String::from_utf8(out).expect("serializer wrote UTF-8")
    }

    #[test]
    fn parse_reports_quirks_mode() {
        let (_, mode) = parse("<p>hi", ArenaDom::default(), true);
        assert_eq!(mode, Quirks);
        let (dom, mode) = parse("<!DOCTYPE html><p>hi", ArenaDom::default(), true);
        assert_eq!(mode, NoQuirks);
        assert_eq!(dom.quirks_mode(), NoQuirks);
    }

    #[test]
    fn chunked_input_builds_the_same_tree() {
        let mut parser = parse_document(ArenaDom::default(), ParseOpts::default());
        for chunk in ["<ti", "tle>a &am", "p; b</ti", "tle><p>c"] {
            parser.process(StrTendril::from_slice(chunk));
        }
        let chunked = parser.finish();
        let (whole, _) = parse("<title>a &amp; b</title><p>c", ArenaDom::default(), true);
        assert_eq!(to_html(&chunked), to_html(&whole));
        assert_eq!(
            to_html(&whole),
            "<html><head><title>a &amp; b</title></head><body><p>c</p></body></html>"
        );
    }

    #[test]
    fn fragment_children_hang_off_the_root() {
        let ctx = QualName::new(None, ns!(html), local_name!("tr"));
        let dom = parse_fragment(ArenaDom::default(), ParseOpts::default(), ctx, vec![])
            .one("<td>cell</td>");
        let html = dom.children(dom.document())[0];
        let cells = dom.children(html);
        assert_eq!(cells.len(), 1);
        match dom.node(cells[0]).data {
            NodeData::Element { ref name, .. } => assert_eq!(name.local, local_name!("td")),
            _ => panic!("expected an element"),
        }
    }

    #[test]
    fn rcdata_fragment_ends_at_matching_end_tag() {
        let ctx = QualName::new(None, ns!(html), local_name!("title"));
        let dom = parse_fragment(ArenaDom::default(), ParseOpts::default(), ctx, vec![])
            .one("a<b>c</title>d");
        let html = dom.children(dom.document())[0];
        let text: Vec<_> = dom
            .children(html)
            .iter()
            .map(|&id| match dom.node(id).data {
                NodeData::Text { ref contents } => contents.to_string(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(text.concat(), "a<b>cd");
    }

    fn root_elements(dom: &ArenaDom) -> Vec<String> {
        dom.children(dom.document())
            .iter()
            .filter_map(|&id| match dom.node(id).data {
                NodeData::Element { ref name, .. } => Some(name.local.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn any_input_gives_a_single_html_root() {
        // xorshift32, so every run sees the same text.
        let mut state: u32 = 0x2545_f491;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        };
        const MARKUP: &[u8] = b"<>/!-=&;#'\" \n\0abpitrdsvgmath";
        let noise: String = (0..5000)
            .filter_map(|_| {
                let n = next();
                if n & 1 == 0 {
                    Some(MARKUP[(n >> 1) as usize % MARKUP.len()] as char)
                } else {
                    char::from_u32((n >> 1) % 0x11_0000)
                }
            })
            .collect();
        let nested = "<b><i><a><p>".repeat(3000);

        for input in [noise, nested] {
            let (dom, _) = parse(&input, ArenaDom::default(), true);
            assert_eq!(root_elements(&dom), vec!["html".to_string()]);
        }
    }

    #[test]
    fn tokenize_ends_with_eof() {
        let tokens = tokenize("<b>x", TokenizerOpts::default());
        assert_eq!(tokens.len(), 3);
        assert!(matches!(tokens[0], TagToken(_)));
        assert_eq!(tokens[1], CharacterTokens("x".into()));
        assert_eq!(tokens[2], EOFToken);
    }
}
