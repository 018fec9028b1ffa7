// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The insertion modes, one method each.
//!
//! <https://html.spec.whatwg.org/multipage/parsing.html#tree-construction>

use crate::interface::{create_element, AppendNode, Quirks, TreeSink};
use crate::tokenizer::{ContentModel, EndTag, StartTag, Tag};
use crate::tree_builder::actions::{has_non_space, is_hidden_input};
use crate::tree_builder::tag_sets::*;
use crate::tree_builder::types::InsertionMode::*;
use crate::tree_builder::types::Outcome::{self, Done, DoneSelfClosing, Reprocess};
use crate::tree_builder::types::{InsertionMode, Split, Token};
use crate::tree_builder::TreeBuilder;
use crate::QualName;

/// Token pattern for a start tag, optionally binding the tag and
/// restricting its name.
macro_rules! start {
    () => {
        Token::Tag(Tag { kind: StartTag, .. })
    };
    ($tag:ident : $($name:tt)|+) => {
        Token::Tag($tag @ Tag { kind: StartTag, name: $(local_name!($name))|+, .. })
    };
    ($($name:tt)|+) => {
        Token::Tag(Tag { kind: StartTag, name: $(local_name!($name))|+, .. })
    };
}

/// Like `start!`, for end tags.
macro_rules! end {
    ($tag:ident) => {
        Token::Tag($tag @ Tag { kind: EndTag, .. })
    };
    ($tag:ident : $($name:tt)|+) => {
        Token::Tag($tag @ Tag { kind: EndTag, name: $(local_name!($name))|+, .. })
    };
    ($($name:tt)|+) => {
        Token::Tag(Tag { kind: EndTag, name: $(local_name!($name))|+, .. })
    };
}

/// End tags that the modes before the body treat as "anything else"
/// rather than ignore.
fn is_break_out_end_tag(tag: &Tag) -> bool {
    matches!(
        tag.name,
        local_name!("head") | local_name!("body") | local_name!("html") | local_name!("br")
    )
}

impl<Handle, Sink> TreeBuilder<Handle, Sink>
where
    Handle: Clone,
    Sink: TreeSink<Handle = Handle>,
{
    /// Process a token with the rules of `mode`. The current mode only
    /// changes when a rule says so.
    pub(crate) fn step(&mut self, mode: InsertionMode, token: Token) -> Outcome<Handle> {
        self.trace_step(mode, &token);
        match mode {
            Initial => self.initial(token),
            BeforeHtml => self.before_html(token),
            BeforeHead => self.before_head(token),
            InHead => self.in_head(token),
            InHeadNoscript => self.in_head_noscript(token),
            AfterHead => self.after_head(token),
            InBody => self.in_body(token),
            Text => self.in_text(token),
            InTable => self.in_table(token),
            InTableText => self.in_table_text(token),
            InCaption => self.in_caption(token),
            InColumnGroup => self.in_column_group(token),
            InTableBody => self.in_table_body(token),
            InRow => self.in_row(token),
            InCell => self.in_cell(token),
            InSelect => self.in_select(token),
            InSelectInTable => self.in_select_in_table(token),
            InTemplate => self.in_template(token),
            AfterBody => self.after_body(token),
            InFrameset => self.in_frameset(token),
            AfterFrameset => self.after_frameset(token),
            AfterAfterBody => self.after_after_body(token),
            AfterAfterFrameset => self.after_after_frameset(token),
        }
    }

    fn initial(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Chars(Split::Unknown, text) => Outcome::SplitSpace(text),
            Token::Chars(Split::Space, _) => Done,
            Token::Comment(text) => self.comment_in_document(text),
            token => {
                if !self.opts.iframe_srcdoc {
                    self.unexpected(&token);
                    self.set_quirks_mode(Quirks);
                }
                Reprocess(BeforeHtml, token)
            },
        }
    }

    fn before_html(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Chars(Split::Unknown, text) => Outcome::SplitSpace(text),
            Token::Chars(Split::Space, _) => Done,
            Token::Comment(text) => self.comment_in_document(text),
            start!(tag: "html") => {
                self.create_root(tag.attrs);
                self.mode = BeforeHead;
                Done
            },
            end!(tag) if !is_break_out_end_tag(&tag) => self.unexpected(&tag),
            token => {
                self.create_root(vec![]);
                Reprocess(BeforeHead, token)
            },
        }
    }

    fn before_head(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Chars(Split::Unknown, text) => Outcome::SplitSpace(text),
            Token::Chars(Split::Space, _) => Done,
            Token::Comment(text) => self.comment(text),
            start!("html") => self.step(InBody, token),
            start!(tag: "head") => {
                self.head = Some(self.insert_element(tag));
                self.mode = InHead;
                Done
            },
            end!(tag) if !is_break_out_end_tag(&tag) => self.unexpected(&tag),
            token => {
                self.head = Some(self.insert_implied(local_name!("head")));
                Reprocess(InHead, token)
            },
        }
    }

    fn in_head(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Chars(Split::Unknown, text) => Outcome::SplitSpace(text),
            Token::Chars(Split::Space, text) => self.text(text),
            Token::Comment(text) => self.comment(text),
            start!("html") => self.step(InBody, token),
            start!(tag: "base" | "basefont" | "bgsound" | "link" | "meta") => {
                self.insert_void(tag);
                DoneSelfClosing
            },
            start!(tag: "title") => self.raw_text(tag, ContentModel::Rcdata),
            start!(tag: "noscript") if !self.opts.scripting_enabled => {
                self.insert_element(tag);
                self.mode = InHeadNoscript;
                Done
            },
            start!(tag: "noframes" | "style" | "noscript") => self.raw_text(tag, ContentModel::Rawtext),
            start!(tag: "script") => {
                let name = QualName::new(None, ns!(html), local_name!("script"));
                let script = create_element(&mut self.sink, name, tag.attrs);
                if self.is_fragment() {
                    self.sink.mark_script_already_started(&script);
                }
                self.insert_node(AppendNode(script.clone()), None);
                self.push_open(script);
                self.text_mode(ContentModel::ScriptData)
            },
            end!("head") => {
                self.pop_open();
                self.mode = AfterHead;
                Done
            },
            start!(tag: "template") => {
                self.insert_element(tag);
                self.formatting.push_marker();
                self.frameset_ok = false;
                self.mode = InTemplate;
                self.template_modes.push(InTemplate);
                Done
            },
            end!(tag: "template") => {
                if !self.has_open(local_name!("template")) {
                    return self.unexpected(&tag);
                }
                self.implied_end_tags(thorough_implied_end);
                self.close_named(local_name!("template"));
                self.formatting.clear_to_marker();
                self.template_modes.pop();
                self.mode = self.reset_insertion_mode();
                Done
            },
            start!(tag: "head") => self.unexpected(&tag),
            end!(tag) if !is_break_out_end_tag(&tag) => self.unexpected(&tag),
            token => {
                self.pop_open();
                Reprocess(AfterHead, token)
            },
        }
    }

    fn in_head_noscript(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            start!("html") => self.step(InBody, token),
            end!("noscript") => {
                self.pop_open();
                self.mode = InHead;
                Done
            },
            Token::Chars(Split::Unknown, text) => Outcome::SplitSpace(text),
            Token::Chars(Split::Space, _)
            | Token::Comment(_)
            | start!("basefont" | "bgsound" | "link" | "meta" | "noframes" | "style") => {
                self.step(InHead, token)
            },
            start!(tag: "head" | "noscript") => self.unexpected(&tag),
            end!(tag) if tag.name != local_name!("br") => self.unexpected(&tag),
            token => {
                self.unexpected(&token);
                self.pop_open();
                Reprocess(InHead, token)
            },
        }
    }

    fn after_head(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Chars(Split::Unknown, text) => Outcome::SplitSpace(text),
            Token::Chars(Split::Space, text) => self.text(text),
            Token::Comment(text) => self.comment(text),
            start!("html") => self.step(InBody, token),
            start!(tag: "body") => {
                self.insert_element(tag);
                self.frameset_ok = false;
                self.mode = InBody;
                Done
            },
            start!(tag: "frameset") => {
                self.insert_element(tag);
                self.mode = InFrameset;
                Done
            },
            start!(
                "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script" | "style"
                    | "template" | "title"
            ) => {
                self.unexpected(&token);
                let head = self.head.clone().expect("past the head without a head element");
                self.push_open(head.clone());
                let outcome = self.step(InHead, token);
                self.remove_open(&head);
                outcome
            },
            end!("template") => self.step(InHead, token),
            start!(tag: "head") => self.unexpected(&tag),
            end!(tag) if !is_break_out_end_tag(&tag) => self.unexpected(&tag),
            token => {
                self.insert_implied(local_name!("body"));
                Reprocess(InBody, token)
            },
        }
    }

    fn in_body(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Null => self.unexpected(&token),
            Token::Chars(split, text) => {
                self.reconstruct_formatting();
                if split != Split::Space && has_non_space(&text) {
                    self.frameset_ok = false;
                }
                self.text(text)
            },
            Token::Comment(text) => self.comment(text),
            Token::Eof => {
                if !self.template_modes.is_empty() {
                    return self.step(InTemplate, token);
                }
                self.check_body_end();
                Done
            },
            Token::Tag(tag) if tag.kind == StartTag => self.in_body_start(tag),
            Token::Tag(tag) => self.in_body_end(tag),
        }
    }

    fn in_body_start(&mut self, tag: Tag) -> Outcome<Handle> {
        match tag.name {
            local_name!("html") => {
                self.unexpected(&tag);
                if !self.has_open(local_name!("template")) {
                    let root = self.html_root().clone();
                    self.sink.add_attrs_if_missing(&root, tag.attrs);
                }
                Done
            },

            local_name!("base")
            | local_name!("basefont")
            | local_name!("bgsound")
            | local_name!("link")
            | local_name!("meta")
            | local_name!("noframes")
            | local_name!("script")
            | local_name!("style")
            | local_name!("template")
            | local_name!("title") => self.step(InHead, Token::Tag(tag)),

            local_name!("body") => {
                self.unexpected(&tag);
                let body = self.body().cloned();
                if let Some(body) = body {
                    if !self.has_open(local_name!("template")) {
                        self.frameset_ok = false;
                        self.sink.add_attrs_if_missing(&body, tag.attrs);
                    }
                }
                Done
            },

            local_name!("frameset") => {
                self.unexpected(&tag);
                if let (true, Some(body)) = (self.frameset_ok, self.body().cloned()) {
                    self.sink.remove_from_parent(&body);
                    self.pop_from(1);
                    self.insert_element(tag);
                    self.mode = InFrameset;
                }
                Done
            },

            local_name!("address")
            | local_name!("article")
            | local_name!("aside")
            | local_name!("blockquote")
            | local_name!("center")
            | local_name!("details")
            | local_name!("dialog")
            | local_name!("dir")
            | local_name!("div")
            | local_name!("dl")
            | local_name!("fieldset")
            | local_name!("figcaption")
            | local_name!("figure")
            | local_name!("footer")
            | local_name!("header")
            | local_name!("hgroup")
            | local_name!("main")
            | local_name!("menu")
            | local_name!("nav")
            | local_name!("ol")
            | local_name!("p")
            | local_name!("search")
            | local_name!("section")
            | local_name!("summary")
            | local_name!("ul") => {
                self.close_p_in_button_scope();
                self.insert_element(tag);
                Done
            },

            local_name!("h1")
            | local_name!("h2")
            | local_name!("h3")
            | local_name!("h4")
            | local_name!("h5")
            | local_name!("h6") => {
                self.close_p_in_button_scope();
                if self.current_in(heading_tag) {
                    self.error("nested heading tags");
                    self.pop_open();
                }
                self.insert_element(tag);
                Done
            },

            local_name!("pre") | local_name!("listing") => {
                self.close_p_in_button_scope();
                self.insert_element(tag);
                self.skip_newline = true;
                self.frameset_ok = false;
                Done
            },

            local_name!("form") => {
                let in_template = self.has_open(local_name!("template"));
                if self.form.is_some() && !in_template {
                    self.error("nested forms");
                    return Done;
                }
                self.close_p_in_button_scope();
                let form = self.insert_element(tag);
                if !in_template {
                    self.form = Some(form);
                }
                Done
            },

            local_name!("li") | local_name!("dd") | local_name!("dt") => {
                self.frameset_ok = false;
                let list_item = tag.name == local_name!("li");
                let mut to_close = None;
                for node in self.open.iter().rev() {
                    let name = self.name_of(node);
                    let same_kind = match name {
                        expanded_name!(html "li") => list_item,
                        expanded_name!(html "dd") | expanded_name!(html "dt") => !list_item,
                        _ => false,
                    };
                    if same_kind {
                        to_close = Some(name.local.clone());
                        break;
                    }
                    let stops = special_tag(name)
                        && !matches!(
                            name,
                            expanded_name!(html "address") | expanded_name!(html "div") | expanded_name!(html "p")
                        );
                    if stops {
                        break;
                    }
                }
                if let Some(name) = to_close {
                    self.implied_end_tags_except(name.clone());
                    self.close_named(name);
                }
                self.close_p_in_button_scope();
                self.insert_element(tag);
                Done
            },

            local_name!("plaintext") => {
                self.close_p_in_button_scope();
                self.insert_element(tag);
                Outcome::SwitchTo(ContentModel::Plaintext)
            },

            local_name!("button") => {
                if self.named_in_scope(default_scope, local_name!("button")) {
                    self.unexpected(&tag);
                    self.implied_end_tags(cursory_implied_end);
                    self.pop_through_named(local_name!("button"));
                }
                self.reconstruct_formatting();
                self.insert_element(tag);
                self.frameset_ok = false;
                Done
            },

            local_name!("a") => {
                self.close_active_a(&tag);
                self.reconstruct_formatting();
                self.push_formatting(tag);
                Done
            },

            local_name!("b")
            | local_name!("big")
            | local_name!("code")
            | local_name!("em")
            | local_name!("font")
            | local_name!("i")
            | local_name!("s")
            | local_name!("small")
            | local_name!("strike")
            | local_name!("strong")
            | local_name!("tt")
            | local_name!("u") => {
                self.reconstruct_formatting();
                self.push_formatting(tag);
                Done
            },

            local_name!("nobr") => {
                self.reconstruct_formatting();
                if self.named_in_scope(default_scope, local_name!("nobr")) {
                    self.unexpected(&tag);
                    self.adoption_agency(local_name!("nobr"));
                    self.reconstruct_formatting();
                }
                self.push_formatting(tag);
                Done
            },

            local_name!("applet") | local_name!("marquee") | local_name!("object") => {
                self.reconstruct_formatting();
                self.insert_element(tag);
                self.formatting.push_marker();
                self.frameset_ok = false;
                Done
            },

            local_name!("table") => {
                if self.quirks_mode != Quirks {
                    self.close_p_in_button_scope();
                }
                self.insert_element(tag);
                self.frameset_ok = false;
                self.mode = InTable;
                Done
            },

            local_name!("area")
            | local_name!("br")
            | local_name!("embed")
            | local_name!("img")
            | local_name!("keygen")
            | local_name!("wbr")
            | local_name!("input") => {
                let hidden = tag.name == local_name!("input") && is_hidden_input(&tag);
                self.reconstruct_formatting();
                self.insert_void(tag);
                if !hidden {
                    self.frameset_ok = false;
                }
                DoneSelfClosing
            },

            local_name!("param") | local_name!("source") | local_name!("track") => {
                self.insert_void(tag);
                DoneSelfClosing
            },

            local_name!("hr") => {
                self.close_p_in_button_scope();
                self.insert_void(tag);
                self.frameset_ok = false;
                DoneSelfClosing
            },

            local_name!("image") => {
                self.unexpected(&tag);
                self.in_body_start(Tag {
                    name: local_name!("img"),
                    ..tag
                })
            },

            local_name!("textarea") => {
                self.skip_newline = true;
                self.frameset_ok = false;
                self.raw_text(tag, ContentModel::Rcdata)
            },

            local_name!("xmp") => {
                self.close_p_in_button_scope();
                self.reconstruct_formatting();
                self.frameset_ok = false;
                self.raw_text(tag, ContentModel::Rawtext)
            },

            local_name!("iframe") => {
                self.frameset_ok = false;
                self.raw_text(tag, ContentModel::Rawtext)
            },

            local_name!("noembed") => self.raw_text(tag, ContentModel::Rawtext),
            local_name!("noscript") if self.opts.scripting_enabled => {
                self.raw_text(tag, ContentModel::Rawtext)
            },

            local_name!("select") => {
                self.reconstruct_formatting();
                self.insert_element(tag);
                self.frameset_ok = false;
                self.mode = if self.mode.is_table_mode() {
                    InSelectInTable
                } else {
                    InSelect
                };
                Done
            },

            local_name!("optgroup") | local_name!("option") => {
                if self.current_is(local_name!("option")) {
                    self.pop_open();
                }
                self.reconstruct_formatting();
                self.insert_element(tag);
                Done
            },

            local_name!("rb") | local_name!("rtc") => {
                if self.named_in_scope(default_scope, local_name!("ruby")) {
                    self.implied_end_tags(cursory_implied_end);
                    if !self.current_is(local_name!("ruby")) {
                        self.unexpected(&tag);
                    }
                }
                self.insert_element(tag);
                Done
            },

            local_name!("rp") | local_name!("rt") => {
                if self.named_in_scope(default_scope, local_name!("ruby")) {
                    self.implied_end_tags_except(local_name!("rtc"));
                    if !self.current_is(local_name!("rtc")) && !self.current_is(local_name!("ruby")) {
                        self.unexpected(&tag);
                    }
                }
                self.insert_element(tag);
                Done
            },

            local_name!("math") => {
                self.reconstruct_formatting();
                self.enter_foreign(tag, ns!(mathml))
            },
            local_name!("svg") => {
                self.reconstruct_formatting();
                self.enter_foreign(tag, ns!(svg))
            },

            local_name!("caption")
            | local_name!("col")
            | local_name!("colgroup")
            | local_name!("frame")
            | local_name!("head")
            | local_name!("tbody")
            | local_name!("td")
            | local_name!("tfoot")
            | local_name!("th")
            | local_name!("thead")
            | local_name!("tr") => self.unexpected(&tag),

            _ => {
                self.reconstruct_formatting();
                self.insert_element(tag);
                Done
            },
        }
    }

    fn in_body_end(&mut self, tag: Tag) -> Outcome<Handle> {
        match tag.name {
            local_name!("template") => self.step(InHead, Token::Tag(tag)),

            local_name!("body") | local_name!("html") => {
                if !self.named_in_scope(default_scope, local_name!("body")) {
                    return self.unexpected(&tag);
                }
                self.check_body_end();
                if tag.name == local_name!("html") {
                    return Reprocess(AfterBody, Token::Tag(tag));
                }
                self.mode = AfterBody;
                Done
            },

            local_name!("address")
            | local_name!("article")
            | local_name!("aside")
            | local_name!("blockquote")
            | local_name!("button")
            | local_name!("center")
            | local_name!("details")
            | local_name!("dialog")
            | local_name!("dir")
            | local_name!("div")
            | local_name!("dl")
            | local_name!("fieldset")
            | local_name!("figcaption")
            | local_name!("figure")
            | local_name!("footer")
            | local_name!("header")
            | local_name!("hgroup")
            | local_name!("listing")
            | local_name!("main")
            | local_name!("menu")
            | local_name!("nav")
            | local_name!("ol")
            | local_name!("pre")
            | local_name!("search")
            | local_name!("section")
            | local_name!("summary")
            | local_name!("ul") => {
                if !self.named_in_scope(default_scope, tag.name.clone()) {
                    return self.unexpected(&tag);
                }
                self.implied_end_tags(cursory_implied_end);
                self.close_named(tag.name);
                Done
            },

            local_name!("form") => {
                self.close_form();
                Done
            },

            local_name!("p") => {
                if !self.named_in_scope(button_scope, local_name!("p")) {
                    self.unexpected(&tag);
                    self.insert_implied(local_name!("p"));
                }
                self.close_p();
                Done
            },

            local_name!("li") | local_name!("dd") | local_name!("dt") => {
                let in_scope = if tag.name == local_name!("li") {
                    self.named_in_scope(list_item_scope, tag.name.clone())
                } else {
                    self.named_in_scope(default_scope, tag.name.clone())
                };
                if !in_scope {
                    return self.unexpected(&tag);
                }
                self.implied_end_tags_except(tag.name.clone());
                self.close_named(tag.name);
                Done
            },

            local_name!("h1")
            | local_name!("h2")
            | local_name!("h3")
            | local_name!("h4")
            | local_name!("h5")
            | local_name!("h6") => {
                if !self.in_scope(default_scope, |node| heading_tag(self.name_of(node))) {
                    return self.unexpected(&tag);
                }
                self.implied_end_tags(cursory_implied_end);
                if !self.current_is(tag.name.clone()) {
                    self.unexpected(&tag);
                }
                self.pop_through(heading_tag);
                Done
            },

            local_name!("a")
            | local_name!("b")
            | local_name!("big")
            | local_name!("code")
            | local_name!("em")
            | local_name!("font")
            | local_name!("i")
            | local_name!("nobr")
            | local_name!("s")
            | local_name!("small")
            | local_name!("strike")
            | local_name!("strong")
            | local_name!("tt")
            | local_name!("u") => {
                self.adoption_agency(tag.name);
                Done
            },

            local_name!("applet") | local_name!("marquee") | local_name!("object") => {
                if !self.named_in_scope(default_scope, tag.name.clone()) {
                    return self.unexpected(&tag);
                }
                self.implied_end_tags(cursory_implied_end);
                self.close_named(tag.name);
                self.formatting.clear_to_marker();
                Done
            },

            local_name!("br") => {
                self.unexpected(&tag);
                self.in_body_start(Tag {
                    kind: StartTag,
                    attrs: vec![],
                    ..tag
                })
            },

            _ => {
                self.any_other_end_tag(tag);
                Done
            },
        }
    }

    fn close_form(&mut self) {
        if self.has_open(local_name!("template")) {
            if !self.named_in_scope(default_scope, local_name!("form")) {
                self.error("Form element not in scope on </form>");
                return;
            }
            self.implied_end_tags(cursory_implied_end);
            if !self.current_is(local_name!("form")) {
                self.error("Bad open element on </form>");
            }
            self.pop_through_named(local_name!("form"));
            return;
        }

        let Some(form) = self.form.take() else {
            self.error("Null form element pointer on </form>");
            return;
        };
        if !self.in_scope(default_scope, |node| self.sink.same_node(node, &form)) {
            self.error("Form element not in scope on </form>");
            return;
        }
        self.implied_end_tags(cursory_implied_end);
        let current = self.current().clone();
        self.remove_open(&form);
        if !self.sink.same_node(&current, &form) {
            self.error("Bad open element on </form>");
        }
    }

    fn in_text(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Chars(_, text) => {
                if self.current_is(local_name!("script")) {
                    self.script_text.push_tendril(&text);
                }
                self.text(text)
            },
            Token::Eof => {
                self.unexpected(&token);
                if self.current_is(local_name!("script")) {
                    let script = self.current().clone();
                    self.sink.mark_script_already_started(&script);
                }
                self.pop_open();
                let mode = self.return_mode.take().expect("text mode without a mode to return to");
                Reprocess(mode, token)
            },
            end!(_tag) => {
                let node = self.pop_open();
                self.mode = self.return_mode.take().expect("text mode without a mode to return to");
                if self.is_html(&node, local_name!("script")) {
                    Outcome::Script(node)
                } else {
                    Done
                }
            },
            token => self.unexpected(&token),
        }
    }

    fn in_table(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Null | Token::Chars(..) => self.chars_in_table(token),
            Token::Comment(text) => self.comment(text),
            start!(tag: "caption") => {
                self.pop_to(table_scope);
                self.formatting.push_marker();
                self.insert_element(tag);
                self.mode = InCaption;
                Done
            },
            start!(tag: "colgroup") => {
                self.pop_to(table_scope);
                self.insert_element(tag);
                self.mode = InColumnGroup;
                Done
            },
            start!("col") => {
                self.pop_to(table_scope);
                self.insert_implied(local_name!("colgroup"));
                Reprocess(InColumnGroup, token)
            },
            start!(tag: "tbody" | "tfoot" | "thead") => {
                self.pop_to(table_scope);
                self.insert_element(tag);
                self.mode = InTableBody;
                Done
            },
            start!("td" | "th" | "tr") => {
                self.pop_to(table_scope);
                self.insert_implied(local_name!("tbody"));
                Reprocess(InTableBody, token)
            },
            start!("table") => {
                self.unexpected(&token);
                if !self.named_in_scope(table_scope, local_name!("table")) {
                    return Done;
                }
                self.pop_through_named(local_name!("table"));
                Reprocess(self.reset_insertion_mode(), token)
            },
            end!(tag: "table") => {
                if !self.named_in_scope(table_scope, local_name!("table")) {
                    return self.unexpected(&tag);
                }
                self.pop_through_named(local_name!("table"));
                self.mode = self.reset_insertion_mode();
                Done
            },
            end!(
                tag: "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot"
                    | "th" | "thead" | "tr"
            ) => self.unexpected(&tag),
            start!("style" | "script" | "template") | end!("template") => self.step(InHead, token),
            start!(tag: "input") if is_hidden_input(&tag) => {
                self.unexpected(&tag);
                self.insert_void(tag);
                DoneSelfClosing
            },
            start!(tag: "form") => {
                self.unexpected(&tag);
                if !self.has_open(local_name!("template")) && self.form.is_none() {
                    self.form = Some(self.insert_void(tag));
                }
                Done
            },
            Token::Eof => self.step(InBody, token),
            token => {
                self.unexpected(&token);
                self.foster_in_body(token)
            },
        }
    }

    fn in_table_text(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Null => self.unexpected(&token),
            Token::Chars(split, text) => {
                self.table_text.push((split, text));
                Done
            },
            token => {
                self.flush_table_text();
                let mode = self.return_mode.take().expect("table text without a mode to return to");
                Reprocess(mode, token)
            },
        }
    }

    fn in_caption(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            start!("caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr")
            | end!("table" | "caption") => {
                if !self.named_in_scope(table_scope, local_name!("caption")) {
                    return self.unexpected(&token);
                }
                self.implied_end_tags(cursory_implied_end);
                self.close_named(local_name!("caption"));
                self.formatting.clear_to_marker();
                if matches!(token, end!("caption")) {
                    self.mode = InTable;
                    Done
                } else {
                    Reprocess(InTable, token)
                }
            },
            end!(
                tag: "body" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th" | "thead"
                    | "tr"
            ) => self.unexpected(&tag),
            token => self.step(InBody, token),
        }
    }

    fn in_column_group(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Chars(Split::Unknown, text) => Outcome::SplitSpace(text),
            Token::Chars(Split::Space, text) => self.text(text),
            Token::Comment(text) => self.comment(text),
            start!("html") => self.step(InBody, token),
            start!(tag: "col") => {
                self.insert_void(tag);
                DoneSelfClosing
            },
            end!(tag: "colgroup") => {
                if !self.current_is(local_name!("colgroup")) {
                    return self.unexpected(&tag);
                }
                self.pop_open();
                self.mode = InTable;
                Done
            },
            end!(tag: "col") => self.unexpected(&tag),
            start!("template") | end!("template") => self.step(InHead, token),
            Token::Eof => self.step(InBody, token),
            token => {
                if !self.current_is(local_name!("colgroup")) {
                    return self.unexpected(&token);
                }
                self.pop_open();
                Reprocess(InTable, token)
            },
        }
    }

    fn in_table_body(&mut self, token: Token) -> Outcome<Handle> {
        declare_tag_set!(table_section = "tbody" "tfoot" "thead");
        match token {
            start!(tag: "tr") => {
                self.pop_to(table_body_context);
                self.insert_element(tag);
                self.mode = InRow;
                Done
            },
            start!("th" | "td") => {
                self.unexpected(&token);
                self.pop_to(table_body_context);
                self.insert_implied(local_name!("tr"));
                Reprocess(InRow, token)
            },
            end!(tag: "tbody" | "tfoot" | "thead") => {
                if !self.named_in_scope(table_scope, tag.name.clone()) {
                    return self.unexpected(&tag);
                }
                self.pop_to(table_body_context);
                self.pop_open();
                self.mode = InTable;
                Done
            },
            start!("caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead") | end!("table") => {
                if !self.in_scope(table_scope, |node| table_section(self.name_of(node))) {
                    return self.unexpected(&token);
                }
                self.pop_to(table_body_context);
                self.pop_open();
                Reprocess(InTable, token)
            },
            end!(tag: "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr") => {
                self.unexpected(&tag)
            },
            token => self.step(InTable, token),
        }
    }

    fn in_row(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            start!(tag: "th" | "td") => {
                self.pop_to(table_row_context);
                self.insert_element(tag);
                self.mode = InCell;
                self.formatting.push_marker();
                Done
            },
            end!(tag: "tr") => {
                if !self.named_in_scope(table_scope, local_name!("tr")) {
                    return self.unexpected(&tag);
                }
                self.close_row();
                self.mode = InTableBody;
                Done
            },
            start!("caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr") | end!("table") => {
                if !self.named_in_scope(table_scope, local_name!("tr")) {
                    return self.unexpected(&token);
                }
                self.close_row();
                Reprocess(InTableBody, token)
            },
            end!(tag: "tbody" | "tfoot" | "thead") => {
                if !self.named_in_scope(table_scope, tag.name.clone()) {
                    return self.unexpected(&tag);
                }
                if !self.named_in_scope(table_scope, local_name!("tr")) {
                    return Done;
                }
                self.close_row();
                Reprocess(InTableBody, Token::Tag(tag))
            },
            end!(tag: "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th") => {
                self.unexpected(&tag)
            },
            token => self.step(InTable, token),
        }
    }

    fn in_cell(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            end!(tag: "td" | "th") => {
                if !self.named_in_scope(table_scope, tag.name.clone()) {
                    return self.unexpected(&tag);
                }
                self.implied_end_tags(cursory_implied_end);
                self.close_named(tag.name);
                self.formatting.clear_to_marker();
                self.mode = InRow;
                Done
            },
            start!("caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr") => {
                if !self.in_scope(table_scope, |node| td_th(self.name_of(node))) {
                    return self.unexpected(&token);
                }
                self.close_cell();
                Reprocess(InRow, token)
            },
            end!(tag: "body" | "caption" | "col" | "colgroup" | "html") => self.unexpected(&tag),
            end!(tag: "table" | "tbody" | "tfoot" | "thead" | "tr") => {
                if !self.named_in_scope(table_scope, tag.name.clone()) {
                    return self.unexpected(&tag);
                }
                self.close_cell();
                Reprocess(InRow, Token::Tag(tag))
            },
            token => self.step(InBody, token),
        }
    }

    /// Pop a current `option`, then a current `optgroup`.
    fn close_options(&mut self) {
        if self.current_is(local_name!("option")) {
            self.pop_open();
        }
        if self.current_is(local_name!("optgroup")) {
            self.pop_open();
        }
    }

    fn in_select(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Null => self.unexpected(&token),
            Token::Chars(_, text) => self.text(text),
            Token::Comment(text) => self.comment(text),
            start!("html") => self.step(InBody, token),
            start!(tag: "option") => {
                if self.current_is(local_name!("option")) {
                    self.pop_open();
                }
                self.insert_element(tag);
                Done
            },
            start!(tag: "optgroup") => {
                self.close_options();
                self.insert_element(tag);
                Done
            },
            start!(tag: "hr") => {
                self.close_options();
                self.insert_void(tag);
                DoneSelfClosing
            },
            end!(tag: "optgroup") => {
                let below = self.open.len().checked_sub(2).map(|i| &self.open[i]);
                let in_group = below.is_some_and(|node| self.is_html(node, local_name!("optgroup")));
                if in_group && self.current_is(local_name!("option")) {
                    self.pop_open();
                }
                if !self.current_is(local_name!("optgroup")) {
                    return self.unexpected(&tag);
                }
                self.pop_open();
                Done
            },
            end!(tag: "option") => {
                if !self.current_is(local_name!("option")) {
                    return self.unexpected(&tag);
                }
                self.pop_open();
                Done
            },
            start!(tag: "select") | end!(tag: "select") => {
                let in_scope = self.named_in_scope(select_scope, local_name!("select"));
                if !in_scope || tag.kind == StartTag {
                    self.unexpected(&tag);
                }
                if in_scope {
                    self.pop_through_named(local_name!("select"));
                    self.mode = self.reset_insertion_mode();
                }
                Done
            },
            start!("input" | "keygen" | "textarea") => {
                self.unexpected(&token);
                if !self.named_in_scope(select_scope, local_name!("select")) {
                    return Done;
                }
                self.pop_through_named(local_name!("select"));
                Reprocess(self.reset_insertion_mode(), token)
            },
            start!("script" | "template") | end!("template") => self.step(InHead, token),
            Token::Eof => self.step(InBody, token),
            token => self.unexpected(&token),
        }
    }

    fn in_select_in_table(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            start!("caption" | "table" | "tbody" | "tfoot" | "thead" | "tr" | "td" | "th") => {
                self.unexpected(&token);
                self.pop_through_named(local_name!("select"));
                Reprocess(self.reset_insertion_mode(), token)
            },
            end!(tag: "caption" | "table" | "tbody" | "tfoot" | "thead" | "tr" | "td" | "th") => {
                self.unexpected(&tag);
                if !self.named_in_scope(table_scope, tag.name.clone()) {
                    return Done;
                }
                self.pop_through_named(local_name!("select"));
                Reprocess(self.reset_insertion_mode(), Token::Tag(tag))
            },
            token => self.step(InSelect, token),
        }
    }

    fn in_template(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Chars(..) | Token::Null | Token::Comment(_) => self.step(InBody, token),
            start!(
                "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script" | "style"
                    | "template" | "title"
            )
            | end!("template") => self.step(InHead, token),
            start!("caption" | "colgroup" | "tbody" | "tfoot" | "thead") => {
                self.switch_template_mode(InTable, token)
            },
            start!("col") => self.switch_template_mode(InColumnGroup, token),
            start!("tr") => self.switch_template_mode(InTableBody, token),
            start!("td" | "th") => self.switch_template_mode(InRow, token),
            Token::Eof => {
                if !self.has_open(local_name!("template")) {
                    return Done;
                }
                self.unexpected(&token);
                self.pop_through_named(local_name!("template"));
                self.formatting.clear_to_marker();
                self.template_modes.pop();
                Reprocess(self.reset_insertion_mode(), token)
            },
            start!() => self.switch_template_mode(InBody, token),
            token => self.unexpected(&token),
        }
    }

    fn after_body(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Chars(Split::Unknown, text) => Outcome::SplitSpace(text),
            Token::Chars(Split::Space, _) => self.step(InBody, token),
            Token::Comment(text) => self.comment_in_root(text),
            start!("html") => self.step(InBody, token),
            end!(tag: "html") => {
                if self.is_fragment() {
                    return self.unexpected(&tag);
                }
                self.mode = AfterAfterBody;
                Done
            },
            Token::Eof => Done,
            token => {
                self.unexpected(&token);
                Reprocess(InBody, token)
            },
        }
    }

    fn in_frameset(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Chars(Split::Unknown, text) => Outcome::SplitSpace(text),
            Token::Chars(Split::Space, text) => self.text(text),
            Token::Comment(text) => self.comment(text),
            start!("html") => self.step(InBody, token),
            start!(tag: "frameset") => {
                self.insert_element(tag);
                Done
            },
            end!(tag: "frameset") => {
                if self.open.len() == 1 {
                    return self.unexpected(&tag);
                }
                self.pop_open();
                if !self.is_fragment() && !self.current_is(local_name!("frameset")) {
                    self.mode = AfterFrameset;
                }
                Done
            },
            start!(tag: "frame") => {
                self.insert_void(tag);
                DoneSelfClosing
            },
            start!("noframes") => self.step(InHead, token),
            Token::Eof => {
                if self.open.len() != 1 {
                    self.unexpected(&token);
                }
                Done
            },
            token => self.unexpected(&token),
        }
    }

    fn after_frameset(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Chars(Split::Unknown, text) => Outcome::SplitSpace(text),
            Token::Chars(Split::Space, text) => self.text(text),
            Token::Comment(text) => self.comment(text),
            start!("html") => self.step(InBody, token),
            end!("html") => {
                self.mode = AfterAfterFrameset;
                Done
            },
            start!("noframes") => self.step(InHead, token),
            Token::Eof => Done,
            token => self.unexpected(&token),
        }
    }

    fn after_after_body(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Chars(Split::Unknown, text) => Outcome::SplitSpace(text),
            Token::Chars(Split::Space, _) | start!("html") => self.step(InBody, token),
            Token::Comment(text) => self.comment_in_document(text),
            Token::Eof => Done,
            token => {
                self.unexpected(&token);
                Reprocess(InBody, token)
            },
        }
    }

    fn after_after_frameset(&mut self, token: Token) -> Outcome<Handle> {
        match token {
            Token::Chars(Split::Unknown, text) => Outcome::SplitSpace(text),
            Token::Chars(Split::Space, _) | start!("html") => self.step(InBody, token),
            Token::Comment(text) => self.comment_in_document(text),
            start!("noframes") => self.step(InHead, token),
            Token::Eof => Done,
            token => self.unexpected(&token),
        }
    }
}
