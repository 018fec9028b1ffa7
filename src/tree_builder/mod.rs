// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The HTML5 tree builder.
//!
//! Tokens come in one at a time through [`TreeBuilder::process_token`].
//! Each is handed to the current insertion mode (see `rules`), or to the
//! foreign content rules when the adjusted current node is SVG or MathML
//! (see `foreign`). A handler may ask for the token to be reprocessed in
//! another mode, so one token can pass through several handlers.

pub use crate::interface::{create_element, ElementFlags, TreeSink};
pub use crate::interface::{AppendNode, AppendText, Attribute, NodeOrText};
pub use crate::interface::{LimitedQuirks, NoQuirks, Quirks, QuirksMode};
pub use self::types::InsertionMode;

use self::formatting::ActiveFormatting;
use self::types::{Outcome, Split, Token};

use std::borrow::Cow::Borrowed;
use std::collections::VecDeque;
use std::{fmt, mem};

use log::{debug, log_enabled, Level};
use mac::format_if;
use tendril::StrTendril;

use crate::tokenizer;
use crate::tokenizer::{ContentModel, Doctype, StartTag, Tag, TokenSinkResult};
use crate::util::str::{is_html_whitespace, to_escaped_string};
use crate::ExpandedName;

#[macro_use]
mod tag_sets;

mod actions;
mod data;
mod foreign;
mod formatting;
mod rules;
mod types;

/// Tree builder options, with an impl for Default.
#[derive(Copy, Clone, Debug)]
pub struct TreeBuilderOpts {
    /// Report every parse error with a detailed message? Default: false
    pub exact_errors: bool,

    /// Is scripting enabled? Default: true
    ///
    /// With scripting the contents of `<noscript>` are a single text node,
    /// without it they are parsed as markup.
    pub scripting_enabled: bool,

    /// Is the document the `srcdoc` of an `<iframe>`? Such documents are
    /// never put in quirks mode by their doctype.
    pub iframe_srcdoc: bool,

    /// Leave the doctype out of the tree.
    pub drop_doctype: bool,

    /// The quirks mode to start in. Default: NoQuirks
    pub quirks_mode: QuirksMode,
}

impl Default for TreeBuilderOpts {
    fn default() -> TreeBuilderOpts {
        TreeBuilderOpts {
            exact_errors: false,
            scripting_enabled: true,
            iframe_srcdoc: false,
            drop_doctype: false,
            quirks_mode: NoQuirks,
        }
    }
}

/// The HTML tree builder.
pub struct TreeBuilder<Handle, Sink> {
    opts: TreeBuilderOpts,

    /// Receives every tree modification.
    pub sink: Sink,

    mode: InsertionMode,

    /// Where `Text` and `InTableText` go back to when they are done.
    return_mode: Option<InsertionMode>,

    /// One entry per open `<template>`.
    template_modes: Vec<InsertionMode>,

    /// Characters seen in `InTableText`, not yet inserted.
    table_text: Vec<(Split, StrTendril)>,

    quirks_mode: QuirksMode,

    document: Handle,

    /// The stack of open elements, current node last.
    open: Vec<Handle>,

    formatting: ActiveFormatting<Handle>,

    head: Option<Handle>,

    form: Option<Handle>,

    frameset_ok: bool,

    /// Drop a newline at the start of the next characters, as after
    /// `<pre>`, `<listing>` and `<textarea>`.
    skip_newline: bool,

    /// Set while table content is processed by the `InBody` rules.
    foster_parenting: bool,

    /// The context element of a fragment parse.
    context: Option<Handle>,

    /// Source of the script element being parsed, handed to the sink
    /// when the element is closed.
    script_text: StrTendril,
}

impl<Handle, Sink> TreeBuilder<Handle, Sink>
where
    Handle: Clone,
    Sink: TreeSink<Handle = Handle>,
{
    /// A tree builder for a whole document.
    pub fn new(sink: Sink, opts: TreeBuilderOpts) -> TreeBuilder<Handle, Sink> {
        let document = sink.get_document();
        TreeBuilder {
            opts,
            sink,
            mode: InsertionMode::Initial,
            return_mode: None,
            template_modes: vec![],
            table_text: vec![],
            quirks_mode: opts.quirks_mode,
            document,
            open: vec![],
            formatting: ActiveFormatting::new(),
            head: None,
            form: None,
            frameset_ok: true,
            skip_newline: false,
            foster_parenting: false,
            context: None,
            script_text: StrTendril::new(),
        }
    }

    /// A tree builder for a fragment parsed as if it were the content of
    /// `context`. The parsed nodes become children of a new `html`
    /// element appended to the sink's document.
    pub fn new_for_fragment(
        sink: Sink,
        context: Handle,
        form: Option<Handle>,
        opts: TreeBuilderOpts,
    ) -> TreeBuilder<Handle, Sink> {
        let in_template = sink.elem_name(&context) == expanded_name!(html "template");
        let mut tb = TreeBuilder::new(sink, opts);
        if in_template {
            tb.template_modes.push(InsertionMode::InTemplate);
        }
        tb.form = form;
        tb.context = Some(context);
        tb.create_root(vec![]);
        tb.mode = tb.reset_insertion_mode();
        tb
    }

    /// The content model the tokenizer starts in for a fragment, decided
    /// by the context element. `Data` for whole documents.
    pub fn context_content_model(&self) -> ContentModel {
        let Some(context) = self.context.as_ref() else {
            return ContentModel::Data;
        };
        let name = self.sink.elem_name(context);
        if *name.ns != ns!(html) {
            return ContentModel::Data;
        }
        match *name.local {
            local_name!("title") | local_name!("textarea") => ContentModel::Rcdata,
            local_name!("style")
            | local_name!("xmp")
            | local_name!("iframe")
            | local_name!("noembed")
            | local_name!("noframes") => ContentModel::Rawtext,
            local_name!("noscript") if self.opts.scripting_enabled => ContentModel::Rawtext,
            local_name!("script") => ContentModel::ScriptData,
            local_name!("plaintext") => ContentModel::Plaintext,
            _ => ContentModel::Data,
        }
    }

    /// The quirks mode decided so far.
    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    pub fn insertion_mode(&self) -> InsertionMode {
        self.mode
    }

    pub fn is_fragment(&self) -> bool {
        self.context.is_some()
    }

    /// Whether `<![CDATA[` opens a CDATA section here: the adjusted
    /// current node exists and is not an HTML element.
    pub fn cdata_allowed(&self) -> bool {
        !self.open.is_empty() && *self.sink.elem_name(self.adjusted_current()).ns != ns!(html)
    }

    /// Process one token from the tokenizer.
    ///
    /// The result tells the caller whether the tokenizer must change its
    /// content model before producing the next token.
    pub fn process_token(&mut self, token: tokenizer::Token) -> TokenSinkResult<Handle> {
        let skip_newline = mem::take(&mut self.skip_newline);
        let token = match token {
            tokenizer::ParseError(msg) => {
                // An error does not count as the token after `<pre>`.
                self.skip_newline = skip_newline;
                self.sink.parse_error(msg);
                return TokenSinkResult::Continue;
            },
            tokenizer::DoctypeToken(doctype) => {
                self.doctype(doctype);
                return TokenSinkResult::Continue;
            },
            tokenizer::CharacterTokens(mut text) => {
                if skip_newline && text.starts_with('\n') {
                    text.pop_front(1);
                }
                if text.is_empty() {
                    return TokenSinkResult::Continue;
                }
                Token::Chars(Split::Unknown, text)
            },
            tokenizer::TagToken(tag) => Token::Tag(tag),
            tokenizer::CommentToken(text) => Token::Comment(text),
            tokenizer::NullCharacterToken => Token::Null,
            tokenizer::EOFToken => Token::Eof,
        };
        self.run(token)
    }

    /// Finish parsing: every element left open is popped.
    pub fn end(&mut self) {
        for elem in mem::take(&mut self.open).into_iter().rev() {
            self.sink.pop(&elem);
        }
    }

    fn doctype(&mut self, doctype: Doctype) {
        if self.mode != InsertionMode::Initial {
            self.sink.parse_error(format_if!(
                self.opts.exact_errors,
                "DOCTYPE in body",
                "DOCTYPE in insertion mode {:?}",
                self.mode
            ));
            return;
        }

        let (bad, quirks) = data::doctype_error_and_quirks(&doctype, self.opts.iframe_srcdoc);
        if bad {
            self.sink.parse_error(format_if!(
                self.opts.exact_errors,
                "Bad DOCTYPE",
                "Bad DOCTYPE: {:?}",
                doctype
            ));
        }
        if !self.opts.drop_doctype {
            self.sink.append_doctype_to_document(
                doctype.name.unwrap_or_default(),
                doctype.public_id.unwrap_or_default(),
                doctype.system_id.unwrap_or_default(),
            );
        }
        self.set_quirks_mode(quirks);
        self.mode = InsertionMode::BeforeHtml;
    }

    /// Run a token, and whatever it turns into, through the insertion
    /// modes.
    fn run(&mut self, token: Token) -> TokenSinkResult<Handle> {
        let mut queue = VecDeque::from([token]);
        while let Some(token) = queue.pop_front() {
            let self_closing = matches!(
                token,
                Token::Tag(Tag {
                    kind: StartTag,
                    self_closing: true,
                    ..
                })
            );
            let outcome = if self.is_foreign(&token) {
                self.foreign(token)
            } else {
                self.step(self.mode, token)
            };
            match outcome {
                Outcome::Done => {
                    if self_closing {
                        self.error("Unacknowledged self-closing tag");
                    }
                },
                Outcome::DoneSelfClosing => (),
                Outcome::Reprocess(mode, token) => {
                    self.mode = mode;
                    queue.push_front(token);
                },
                Outcome::SplitSpace(mut text) => {
                    let Some((head, space)) = text.pop_front_char_run(is_html_whitespace) else {
                        continue;
                    };
                    if text.len32() > 0 {
                        queue.push_front(Token::Chars(Split::Unknown, text));
                    }
                    let split = if space { Split::Space } else { Split::NonSpace };
                    queue.push_front(Token::Chars(split, head));
                },
                Outcome::Script(node) => {
                    debug_assert!(queue.is_empty());
                    let source = mem::take(&mut self.script_text);
                    self.sink.script_ready(&node, source);
                    return TokenSinkResult::Script(node);
                },
                Outcome::SwitchTo(model) => {
                    debug_assert!(queue.is_empty());
                    return TokenSinkResult::SwitchTo(model);
                },
            }
        }
        TokenSinkResult::Continue
    }

    fn trace_step(&self, mode: InsertionMode, token: &Token) {
        if log_enabled!(Level::Debug) {
            debug!("processing {} in insertion mode {:?}", to_escaped_string(token), mode);
        }
    }

    fn error(&mut self, msg: &'static str) {
        self.sink.parse_error(Borrowed(msg));
    }

    /// Report a token the current mode has no use for. It is dropped
    /// unless the caller does something else with it.
    fn unexpected<T: fmt::Debug>(&mut self, thing: &T) -> Outcome<Handle> {
        self.sink.parse_error(format_if!(
            self.opts.exact_errors,
            "Unexpected token",
            "Unexpected token {} in insertion mode {:?}",
            to_escaped_string(thing),
            self.mode
        ));
        Outcome::Done
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
        self.sink.set_quirks_mode(mode);
    }

    fn name_of<'a>(&'a self, node: &'a Handle) -> ExpandedName<'a> {
        self.sink.elem_name(node)
    }
}

#[cfg(test)]
mod test {
    use super::formatting::Entry;
    use super::{TreeBuilder, TreeBuilderOpts};
    use crate::arena_dom::{ArenaDom, NodeData, NodeId};
    use crate::interface::{LimitedQuirks, NoQuirks, Quirks};
    use crate::tokenizer::{ContentModel, TokenSinkResult, Tokenizer, TokenizerOpts};
    use crate::QualName;

    fn run(input: &str) -> TreeBuilder<NodeId, ArenaDom> {
        let mut tok = Tokenizer::new(TokenizerOpts::default());
        let mut tb = TreeBuilder::new(ArenaDom::default(), TreeBuilderOpts::default());
        tok.feed(input.into());
        tok.end();
        while let Some(token) = tok.next_token() {
            let eof = token == crate::tokenizer::EOFToken;
            if let TokenSinkResult::SwitchTo(model) = tb.process_token(token) {
                tok.set_content_model(model);
            }
            tok.set_allow_cdata(tb.cdata_allowed());
            if eof {
                break;
            }
        }
        tb
    }

    /// The element nodes on the path that keeps taking the first child,
    /// starting below `body`.
    fn first_child_chain(dom: &ArenaDom) -> Vec<NodeId> {
        let html = dom.children(dom.document())[0];
        let body = dom.children(html)[1];
        let mut chain = vec![];
        let mut node = body;
        while let Some(&child) = dom.children(node).first() {
            if dom.tag_name(child).is_none() {
                break;
            }
            chain.push(child);
            node = child;
        }
        chain
    }

    fn formatting_nodes(tb: &TreeBuilder<NodeId, ArenaDom>) -> Vec<NodeId> {
        tb.formatting
            .entries()
            .iter()
            .filter_map(|entry| match *entry {
                Entry::Element(node, _) => Some(node),
                Entry::Marker => None,
            })
            .collect()
    }

    #[test]
    fn missing_doctype_is_quirks() {
        assert_eq!(run("<p>x").quirks_mode(), Quirks);
    }

    #[test]
    fn doctypes_pick_quirks_mode() {
        assert_eq!(run("<!DOCTYPE html><p>x").quirks_mode(), NoQuirks);
        let html401 = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN"><p>x"#;
        assert_eq!(run(html401).quirks_mode(), LimitedQuirks);
    }

    #[test]
    fn open_elements_are_popped_at_end() {
        let mut tb = run("<div><span>");
        assert!(!tb.open.is_empty());
        tb.end();
        assert!(tb.open.is_empty());
    }

    #[test]
    fn fourth_identical_formatting_element_evicts_the_first() {
        let tb = run("<!DOCTYPE html><b><b><b><b>x");
        let chain = first_child_chain(&tb.sink);
        assert_eq!(chain.len(), 4);
        assert_eq!(formatting_nodes(&tb), &chain[1..]);
    }

    #[test]
    fn formatting_elements_with_other_attributes_survive() {
        let tb = run("<!DOCTYPE html><b><b class=x><b><b><b>x");
        let chain = first_child_chain(&tb.sink);
        assert_eq!(chain.len(), 5);
        // The first plain <b> goes; the one with a class stays.
        assert_eq!(formatting_nodes(&tb), &chain[1..]);
    }

    #[test]
    fn evicted_formatting_is_not_reopened() {
        let tb = run("<!DOCTYPE html><p><b><b><b><b>x<p>y");
        let dom = &tb.sink;
        let html = dom.children(dom.document())[0];
        let body = dom.children(html)[1];
        let paragraphs = dom.children(body);
        assert_eq!(paragraphs.len(), 2);

        // Three reopened <b> around "y", not four.
        let mut depth = 0;
        let mut node = paragraphs[1];
        while let Some(&child) = dom.children(node).first() {
            if dom.tag_name(child).is_none() {
                break;
            }
            assert_eq!(dom.tag_name(child), Some(&local_name!("b")));
            depth += 1;
            node = child;
        }
        assert_eq!(depth, 3);
    }

    #[test]
    fn fragment_context_picks_content_model() {
        let mut dom = ArenaDom::default();
        let name = QualName::new(None, ns!(html), local_name!("textarea"));
        let ctx = dom.create_element(name);
        let tb = TreeBuilder::new_for_fragment(dom, ctx, None, TreeBuilderOpts::default());
        assert_eq!(tb.context_content_model(), ContentModel::Rcdata);
        assert!(tb.is_fragment());
    }

    #[test]
    fn script_source_reaches_the_sink() {
        let tb = run("<script>var a = 1;</script>");
        let scripts = tb.sink.scripts();
        assert_eq!(scripts.len(), 1);
        assert_eq!(&*scripts[0].1, "var a = 1;");
        match tb.sink.node(scripts[0].0).data {
            NodeData::Element { ref name, .. } => assert_eq!(name.local, local_name!("script")),
            _ => panic!("script handle is not an element"),
        }
    }

    #[test]
    fn svg_script_is_reported() {
        let tb = run("<svg><script>go()</script></svg>");
        let scripts = tb.sink.scripts();
        assert_eq!(scripts.len(), 1);
        assert_eq!(&*scripts[0].1, "go()");
    }

    #[test]
    fn cdata_only_in_foreign_content() {
        let tb = run("<svg><![CDATA[a<b]]></svg><![CDATA[x]]>");
        let dom = &tb.sink;
        let html = dom.children(dom.document())[0];
        let body = dom.children(html)[1];
        let kids = dom.children(body);
        assert_eq!(kids.len(), 2);
        let svg = kids[0];
        match dom.node(dom.children(svg)[0]).data {
            NodeData::Text { ref contents } => assert_eq!(&**contents, "a<b"),
            _ => panic!("expected text inside svg"),
        }
        assert!(matches!(dom.node(kids[1]).data, NodeData::Comment { .. }));
    }
}
