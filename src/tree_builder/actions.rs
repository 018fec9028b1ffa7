// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The operations the insertion modes are written in terms of: the stack
//! of open elements and its scopes, node insertion and foster parenting,
//! the active formatting elements and the adoption agency.

use mac::format_if;
use tendril::StrTendril;

use crate::interface::{create_element, AppendNode, AppendText, Attribute, NodeOrText, TreeSink};
use crate::tokenizer::{ContentModel, EndTag, Tag};
use crate::tree_builder::formatting::Entry;
use crate::tree_builder::tag_sets::*;
use crate::tree_builder::types::{InsertionMode, Outcome, Place, Split, Token};
use crate::tree_builder::TreeBuilder;
use crate::util::str::{is_html_whitespace, to_escaped_string};
use crate::{ExpandedName, LocalName, Namespace, QualName};

/// Where the adoption agency puts the recreated formatting element's
/// entry.
enum Bookmark<Handle> {
    /// In place of this entry.
    Replace(Handle),
    /// Right after this entry, dropping the old one.
    After(Handle),
}

pub(crate) fn has_non_space(text: &str) -> bool {
    text.chars().any(|c| !is_html_whitespace(c))
}

impl<Handle, Sink> TreeBuilder<Handle, Sink>
where
    Handle: Clone,
    Sink: TreeSink<Handle = Handle>,
{
    // Stack of open elements.

    pub(crate) fn current(&self) -> &Handle {
        self.open.last().expect("no current node")
    }

    /// The current node, except that a fragment's context element stands
    /// in for the lone `html` root.
    pub(crate) fn adjusted_current(&self) -> &Handle {
        match (self.open.len(), self.context.as_ref()) {
            (1, Some(context)) => context,
            _ => self.current(),
        }
    }

    pub(crate) fn html_root(&self) -> &Handle {
        &self.open[0]
    }

    /// The second open element, when it is `body`.
    pub(crate) fn body(&self) -> Option<&Handle> {
        self.open
            .get(1)
            .filter(|node| self.is_html(node, local_name!("body")))
    }

    pub(crate) fn is_html(&self, node: &Handle, local: LocalName) -> bool {
        let name = self.name_of(node);
        *name.ns == ns!(html) && *name.local == local
    }

    pub(crate) fn current_is(&self, local: LocalName) -> bool {
        self.is_html(self.current(), local)
    }

    pub(crate) fn current_in<S>(&self, set: S) -> bool
    where
        S: Fn(ExpandedName) -> bool,
    {
        set(self.name_of(self.current()))
    }

    /// Is there an open HTML element with this name, anywhere on the stack?
    pub(crate) fn has_open(&self, local: LocalName) -> bool {
        self.open.iter().any(|node| self.is_html(node, local.clone()))
    }

    fn is_open(&self, node: &Handle) -> bool {
        self.open.iter().rev().any(|open| self.sink.same_node(open, node))
    }

    /// Walk down from the current node: true if `pred` matches before an
    /// element of `scope` is reached.
    pub(crate) fn in_scope<S, P>(&self, scope: S, pred: P) -> bool
    where
        S: Fn(ExpandedName) -> bool,
        P: Fn(&Handle) -> bool,
    {
        for node in self.open.iter().rev() {
            if pred(node) {
                return true;
            }
            if scope(self.name_of(node)) {
                return false;
            }
        }
        false
    }

    pub(crate) fn named_in_scope<S>(&self, scope: S, local: LocalName) -> bool
    where
        S: Fn(ExpandedName) -> bool,
    {
        self.in_scope(scope, |node| self.is_html(node, local.clone()))
    }

    pub(crate) fn push_open(&mut self, node: Handle) {
        self.open.push(node);
    }

    pub(crate) fn pop_open(&mut self) -> Handle {
        let node = self.open.pop().expect("no current node");
        self.sink.pop(&node);
        node
    }

    /// Pop everything from `index` up.
    pub(crate) fn pop_from(&mut self, index: usize) {
        for node in self.open.drain(index..).rev() {
            self.sink.pop(&node);
        }
    }

    /// Take `node` out of the stack, wherever it is.
    pub(crate) fn remove_open(&mut self, node: &Handle) {
        if let Some(i) = self.open.iter().rposition(|open| self.sink.same_node(open, node)) {
            self.open.remove(i);
            self.sink.pop(node);
        }
    }

    /// Pop until an element in `set` has been popped. Returns how many
    /// elements went.
    pub(crate) fn pop_through<S>(&mut self, set: S) -> usize
    where
        S: Fn(ExpandedName) -> bool,
    {
        let mut popped = 0;
        while let Some(node) = self.open.pop() {
            popped += 1;
            self.sink.pop(&node);
            if set(self.name_of(&node)) {
                break;
            }
        }
        popped
    }

    pub(crate) fn pop_through_named(&mut self, local: LocalName) -> usize {
        self.pop_through(|name| *name.ns == ns!(html) && *name.local == local)
    }

    /// Pop until the current node is in `set`.
    pub(crate) fn pop_to<S>(&mut self, set: S)
    where
        S: Fn(ExpandedName) -> bool,
    {
        while !self.current_in(&set) {
            self.pop_open();
        }
    }

    /// Pop through the element named `local`, complaining if anything
    /// else had to go first.
    pub(crate) fn close_named(&mut self, local: LocalName) {
        if self.pop_through_named(local.clone()) != 1 {
            self.sink.parse_error(format_if!(
                self.opts.exact_errors,
                "Unexpected open element",
                "Unexpected open element while closing {:?}",
                local
            ));
        }
    }

    pub(crate) fn implied_end_tags<S>(&mut self, set: S)
    where
        S: Fn(ExpandedName) -> bool,
    {
        while self.open.last().is_some_and(|node| set(self.name_of(node))) {
            self.pop_open();
        }
    }

    pub(crate) fn implied_end_tags_except(&mut self, except: LocalName) {
        self.implied_end_tags(|name| {
            cursory_implied_end(name) && !(*name.ns == ns!(html) && *name.local == except)
        });
    }

    pub(crate) fn close_p(&mut self) {
        self.implied_end_tags_except(local_name!("p"));
        self.close_named(local_name!("p"));
    }

    pub(crate) fn close_p_in_button_scope(&mut self) {
        if self.named_in_scope(button_scope, local_name!("p")) {
            self.close_p();
        }
    }

    pub(crate) fn close_cell(&mut self) {
        self.implied_end_tags(cursory_implied_end);
        if self.pop_through(td_th) != 1 {
            self.error("expected to close <td> or <th> with cell");
        }
        self.formatting.clear_to_marker();
    }

    /// Pop the open `tr` and whatever table content sits above it.
    pub(crate) fn close_row(&mut self) {
        self.pop_to(table_row_context);
        let row = self.pop_open();
        debug_assert!(self.is_html(&row, local_name!("tr")));
    }

    // Inserting nodes.

    /// The appropriate place for inserting a node, relative to `target` or
    /// the current node.
    fn place_for(&self, target: Option<Handle>) -> Place<Handle> {
        declare_tag_set!(foster_target = "table" "tbody" "tfoot" "thead" "tr");
        let target = target.unwrap_or_else(|| self.current().clone());
        if !self.foster_parenting || !foster_target(self.name_of(&target)) {
            return Place::Append(self.contents_of(target));
        }

        let mut below = self.open.iter().rev().peekable();
        while let Some(node) = below.next() {
            if self.is_html(node, local_name!("template")) {
                return Place::Append(self.sink.get_template_contents(node));
            }
            if self.is_html(node, local_name!("table")) {
                let Some(&fallback) = below.peek() else {
                    break;
                };
                return Place::Foster {
                    table: node.clone(),
                    fallback: fallback.clone(),
                };
            }
        }
        Place::Append(self.html_root().clone())
    }

    /// Children of a `template` go into its contents fragment.
    fn contents_of(&self, node: Handle) -> Handle {
        if self.is_html(&node, local_name!("template")) {
            self.sink.get_template_contents(&node)
        } else {
            node
        }
    }

    fn insert_at(&mut self, place: Place<Handle>, child: NodeOrText<Handle>) {
        match place {
            Place::Append(parent) => self.sink.append(&parent, child),
            Place::Foster { table, fallback } => {
                self.sink.append_based_on_parent_node(&table, &fallback, child)
            },
        }
    }

    pub(crate) fn insert_node(&mut self, child: NodeOrText<Handle>, target: Option<Handle>) {
        let place = self.place_for(target);
        self.insert_at(place, child);
    }

    /// Create an element, insert it and, if `open`, push it.
    pub(crate) fn insert(
        &mut self,
        ns: Namespace,
        local: LocalName,
        attrs: Vec<Attribute>,
        open: bool,
    ) -> Handle {
        let place = self.place_for(None);
        let elem = create_element(&mut self.sink, QualName::new(None, ns, local), attrs);
        self.insert_at(place, AppendNode(elem.clone()));
        if open {
            self.push_open(elem.clone());
        }
        elem
    }

    /// Insert an HTML element for a start tag and push it.
    pub(crate) fn insert_element(&mut self, tag: Tag) -> Handle {
        self.insert(ns!(html), tag.name, tag.attrs, true)
    }

    /// Insert an HTML element for a start tag that is closed at once.
    pub(crate) fn insert_void(&mut self, tag: Tag) -> Handle {
        self.insert(ns!(html), tag.name, tag.attrs, false)
    }

    /// Insert an HTML element no tag asked for.
    pub(crate) fn insert_implied(&mut self, local: LocalName) -> Handle {
        self.insert(ns!(html), local, vec![], true)
    }

    pub(crate) fn create_root(&mut self, attrs: Vec<Attribute>) {
        let root = create_element(
            &mut self.sink,
            QualName::new(None, ns!(html), local_name!("html")),
            attrs,
        );
        self.push_open(root.clone());
        self.sink.append(&self.document, AppendNode(root));
    }

    pub(crate) fn text(&mut self, text: StrTendril) -> Outcome<Handle> {
        self.insert_node(AppendText(text), None);
        Outcome::Done
    }

    pub(crate) fn comment(&mut self, text: StrTendril) -> Outcome<Handle> {
        let comment = self.sink.create_comment(text);
        self.insert_node(AppendNode(comment), None);
        Outcome::Done
    }

    pub(crate) fn comment_in_document(&mut self, text: StrTendril) -> Outcome<Handle> {
        let comment = self.sink.create_comment(text);
        self.sink.append(&self.document, AppendNode(comment));
        Outcome::Done
    }

    pub(crate) fn comment_in_root(&mut self, text: StrTendril) -> Outcome<Handle> {
        let root = self.html_root().clone();
        let comment = self.sink.create_comment(text);
        self.sink.append(&root, AppendNode(comment));
        Outcome::Done
    }

    /// Insert the element for a raw text or RCDATA start tag and let the
    /// tokenizer read its content as text.
    pub(crate) fn raw_text(&mut self, tag: Tag, model: ContentModel) -> Outcome<Handle> {
        self.insert_element(tag);
        self.text_mode(model)
    }

    pub(crate) fn text_mode(&mut self, model: ContentModel) -> Outcome<Handle> {
        self.return_mode = Some(self.mode);
        self.mode = InsertionMode::Text;
        self.script_text.clear();
        Outcome::SwitchTo(model)
    }

    /// Process a token with the `InBody` rules, inserting into the table's
    /// foster parent.
    pub(crate) fn foster_in_body(&mut self, token: Token) -> Outcome<Handle> {
        self.foster_parenting = true;
        let outcome = self.step(InsertionMode::InBody, token);
        self.foster_parenting = false;
        outcome
    }

    pub(crate) fn chars_in_table(&mut self, token: Token) -> Outcome<Handle> {
        declare_tag_set!(text_holder = "table" "tbody" "template" "tfoot" "thead" "tr");
        if self.current_in(text_holder) {
            debug_assert!(self.table_text.is_empty());
            self.return_mode = Some(self.mode);
            return Outcome::Reprocess(InsertionMode::InTableText, token);
        }
        self.sink.parse_error(format_if!(
            self.opts.exact_errors,
            "Unexpected characters in table",
            "Unexpected characters {} in table",
            to_escaped_string(&token)
        ));
        self.foster_in_body(token)
    }

    /// Insert the characters collected in `InTableText`, foster parenting
    /// them unless they are all whitespace.
    pub(crate) fn flush_table_text(&mut self) {
        let pending = std::mem::take(&mut self.table_text);
        let foster = pending.iter().any(|(split, text)| match split {
            Split::Space => false,
            Split::NonSpace => true,
            Split::Unknown => has_non_space(text),
        });
        if !foster {
            for (_, text) in pending {
                self.text(text);
            }
            return;
        }
        self.error("Non-space table text");
        for (split, text) in pending {
            self.foster_in_body(Token::Chars(split, text));
        }
    }

    // Active formatting elements.

    fn formatting_index(&self, node: &Handle) -> Option<usize> {
        self.formatting.position(|entry| self.sink.same_node(entry, node))
    }

    /// Insert a formatting element for `tag` and add it to the list.
    pub(crate) fn push_formatting(&mut self, tag: Tag) -> Handle {
        let elem = self.insert(ns!(html), tag.name.clone(), tag.attrs.clone(), true);
        self.formatting.push(elem.clone(), tag);
        elem
    }

    /// Reopen the formatting elements that were closed implicitly since
    /// the last marker.
    pub(crate) fn reconstruct_formatting(&mut self) {
        let entries = self.formatting.entries();
        let mut start = entries.len();
        while start > 0 {
            match entries[start - 1] {
                Entry::Marker => break,
                Entry::Element(ref node, _) if self.is_open(node) => break,
                Entry::Element(..) => start -= 1,
            }
        }

        for i in start..self.formatting.len() {
            let tag = self
                .formatting
                .tag_at(i)
                .expect("marker after the first entry to reopen")
                .clone();
            let elem = self.insert(ns!(html), tag.name.clone(), tag.attrs.clone(), true);
            self.formatting.replace(i, elem, tag);
        }
    }

    /// `<a>` while another `a` is active: close it through the adoption
    /// agency, then forget it.
    pub(crate) fn close_active_a(&mut self, tag: &Tag) {
        let active = self
            .formatting
            .since_marker()
            .find(|(_, node, _)| self.is_html(node, local_name!("a")))
            .map(|(_, node, _)| node.clone());
        let Some(a) = active else {
            return;
        };

        self.unexpected(tag);
        self.adoption_agency(local_name!("a"));
        if let Some(i) = self.formatting_index(&a) {
            self.formatting.remove(i);
        }
        self.remove_open(&a);
    }

    /// The adoption agency algorithm, run for an end tag named `subject`.
    pub(crate) fn adoption_agency(&mut self, subject: LocalName) {
        if self.current_is(subject.clone()) && self.formatting_index(self.current()).is_none() {
            self.pop_open();
            return;
        }

        for _ in 0..8 {
            let found = self
                .formatting
                .since_marker()
                .find(|(_, _, tag)| tag.name == subject)
                .map(|(i, node, tag)| (i, node.clone(), tag.clone()));
            let Some((entry, target, target_tag)) = found else {
                self.any_other_end_tag(Tag {
                    kind: EndTag,
                    name: subject,
                    self_closing: false,
                    attrs: vec![],
                });
                return;
            };

            let Some(target_index) = self
                .open
                .iter()
                .rposition(|node| self.sink.same_node(node, &target))
            else {
                self.error("Formatting element not open");
                self.formatting.remove(entry);
                return;
            };
            if !self.in_scope(default_scope, |node| self.sink.same_node(node, &target)) {
                self.error("Formatting element not in scope");
                return;
            }
            if !self.sink.same_node(self.current(), &target) {
                self.error("Formatting element not current node");
            }

            let block = self.open[target_index + 1..]
                .iter()
                .position(|node| special_tag(self.name_of(node)))
                .map(|i| i + target_index + 1);
            let Some(block_index) = block else {
                self.pop_from(target_index);
                self.formatting.remove(entry);
                return;
            };
            let block = self.open[block_index].clone();
            let common_ancestor = self.open[target_index - 1].clone();

            let mut bookmark = Bookmark::Replace(target.clone());
            let mut last = block.clone();
            let mut index = block_index;
            let mut inner = 0;
            loop {
                inner += 1;
                index -= 1;
                let node = self.open[index].clone();
                if self.sink.same_node(&node, &target) {
                    break;
                }

                let mut node_entry = self.formatting_index(&node);
                if inner > 3 {
                    if let Some(i) = node_entry.take() {
                        self.formatting.remove(i);
                    }
                }
                let Some(node_entry) = node_entry else {
                    self.open.remove(index);
                    continue;
                };

                let tag = self
                    .formatting
                    .tag_at(node_entry)
                    .expect("formatting entry for an open node is a marker")
                    .clone();
                let copy = create_element(
                    &mut self.sink,
                    QualName::new(None, ns!(html), tag.name.clone()),
                    tag.attrs.clone(),
                );
                self.open[index] = copy.clone();
                self.formatting.replace(node_entry, copy.clone(), tag);

                if self.sink.same_node(&last, &block) {
                    bookmark = Bookmark::After(copy.clone());
                }
                self.sink.remove_from_parent(&last);
                self.sink.append(&copy, AppendNode(last));
                last = copy;
            }

            self.sink.remove_from_parent(&last);
            self.insert_node(AppendNode(last), Some(common_ancestor));

            let copy = create_element(
                &mut self.sink,
                QualName::new(None, ns!(html), target_tag.name.clone()),
                target_tag.attrs.clone(),
            );
            self.sink.reparent_children(&block, &copy);
            self.sink.append(&block, AppendNode(copy.clone()));

            match bookmark {
                Bookmark::Replace(old) => {
                    let i = self
                        .formatting_index(&old)
                        .expect("bookmarked entry left the list");
                    self.formatting.replace(i, copy.clone(), target_tag);
                },
                Bookmark::After(previous) => {
                    let i = self
                        .formatting_index(&previous)
                        .expect("bookmarked entry left the list");
                    self.formatting.insert(i + 1, copy.clone(), target_tag);
                    let old = self
                        .formatting_index(&target)
                        .expect("formatting element left the list");
                    self.formatting.remove(old);
                },
            }

            self.remove_open(&target);
            let block_index = self
                .open
                .iter()
                .position(|node| self.sink.same_node(node, &block))
                .expect("furthest block left the stack");
            self.open.insert(block_index + 1, copy);
        }
    }

    /// The `InBody` rule for end tags with no rule of their own.
    pub(crate) fn any_other_end_tag(&mut self, tag: Tag) {
        let mut found = None;
        for (i, node) in self.open.iter().enumerate().rev() {
            if self.is_html(node, tag.name.clone()) {
                found = Some(i);
                break;
            }
            if special_tag(self.name_of(node)) {
                self.error("Found special tag while closing generic tag");
                return;
            }
        }
        let Some(index) = found else {
            self.unexpected(&tag);
            return;
        };

        self.implied_end_tags_except(tag.name.clone());
        if index != self.open.len() - 1 {
            self.unexpected(&tag);
        }
        self.pop_from(index);
    }

    // Insertion modes.

    /// Pick the insertion mode from the stack of open elements, as after
    /// a table, select or template closes.
    pub(crate) fn reset_insertion_mode(&self) -> InsertionMode {
        for (i, node) in self.open.iter().enumerate().rev() {
            let last = i == 0;
            let node = match (last, self.context.as_ref()) {
                (true, Some(context)) => context,
                _ => node,
            };
            let name = self.name_of(node);
            if *name.ns != ns!(html) {
                continue;
            }
            let mode = match *name.local {
                local_name!("select") => {
                    let in_table = !last
                        && self.open[..i]
                            .iter()
                            .rev()
                            .take_while(|above| !self.is_html(above, local_name!("template")))
                            .any(|above| self.is_html(above, local_name!("table")));
                    if in_table {
                        InsertionMode::InSelectInTable
                    } else {
                        InsertionMode::InSelect
                    }
                },
                local_name!("td") | local_name!("th") if !last => InsertionMode::InCell,
                local_name!("tr") => InsertionMode::InRow,
                local_name!("tbody") | local_name!("thead") | local_name!("tfoot") => {
                    InsertionMode::InTableBody
                },
                local_name!("caption") => InsertionMode::InCaption,
                local_name!("colgroup") => InsertionMode::InColumnGroup,
                local_name!("table") => InsertionMode::InTable,
                local_name!("template") => *self
                    .template_modes
                    .last()
                    .expect("open template without a template insertion mode"),
                local_name!("head") if !last => InsertionMode::InHead,
                local_name!("body") => InsertionMode::InBody,
                local_name!("frameset") => InsertionMode::InFrameset,
                local_name!("html") if self.head.is_none() => InsertionMode::BeforeHead,
                local_name!("html") => InsertionMode::AfterHead,
                _ => continue,
            };
            return mode;
        }
        InsertionMode::InBody
    }

    /// Report the first open element that may not be left open at the end
    /// of the body.
    pub(crate) fn check_body_end(&mut self) {
        declare_tag_set!(may_stay_open =
            "dd" "dt" "li" "optgroup" "option" "p" "rb" "rp" "rt" "rtc" "tbody" "td" "tfoot"
            "th" "thead" "tr" "body" "html");

        let offender = self
            .open
            .iter()
            .map(|node| self.name_of(node))
            .find(|&name| !may_stay_open(name))
            .map(|name| format!("{name:?}"));
        if let Some(name) = offender {
            self.sink.parse_error(format_if!(
                self.opts.exact_errors,
                "Unexpected open tag at end of body",
                "Unexpected open tag {} at end of body",
                name
            ));
        }
    }

    pub(crate) fn switch_template_mode(&mut self, mode: InsertionMode, token: Token) -> Outcome<Handle> {
        self.template_modes.pop();
        self.template_modes.push(mode);
        Outcome::Reprocess(mode, token)
    }
}

/// `<input type=hidden>`, ignoring case.
pub(crate) fn is_hidden_input(tag: &Tag) -> bool {
    tag.attrs.iter().any(|attr| {
        attr.name.expanded() == expanded_name!("", "type") && attr.value.eq_ignore_ascii_case("hidden")
    })
}
