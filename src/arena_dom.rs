// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A simple arena-allocated DOM.
//!
//! Every node lives in one `Vec` owned by [`ArenaDom`] and is addressed by
//! its [`NodeId`]. Parent and child links are ids, so the tree never forms
//! ownership cycles and handles stay valid for the lifetime of the DOM.
//! Detached nodes are not reclaimed.
//!
//! ```text
//! div
//!  +- "text node"
//!  +- span
//! ```
//!
//! is stored as three nodes, the `div` holding the ids of the other two.

use std::borrow::Cow;
use std::collections::HashSet;

use log::debug;
use tendril::StrTendril;

use crate::interface::{
    AppendNode, AppendText, Attribute, ElementFlags, ExpandedName, NodeOrText, NoQuirks,
    QualName, QuirksMode, TreeSink,
};
use crate::{LocalName, Namespace};

/// Index of a node in an [`ArenaDom`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(usize);

/// The different kinds of nodes in the DOM.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// The `Document` itself, and the contents of each `<template>`.
    Document,

    /// A `DOCTYPE` with name, public id, and system id.
    Doctype {
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    },

    /// A text node.
    Text { contents: StrTendril },

    /// A comment.
    Comment { contents: StrTendril },

    /// An element with attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,

        /// For HTML \<template\> elements, the [template contents].
        ///
        /// [template contents]: https://html.spec.whatwg.org/multipage/#template-contents
        template_contents: Option<NodeId>,

        /// Whether the node is a [HTML integration point].
        ///
        /// [HTML integration point]: https://html.spec.whatwg.org/multipage/#html-integration-point
        mathml_annotation_xml_integration_point: bool,
    },
}

/// A DOM node.
#[derive(Debug, Clone)]
pub struct Node {
    /// Represents this node's data.
    pub data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Node {
        Node {
            data,
            parent: None,
            children: vec![],
        }
    }
}

/// The DOM itself; the result of parsing.
pub struct ArenaDom {
    nodes: Vec<Node>,
    errors: Vec<Cow<'static, str>>,
    quirks_mode: QuirksMode,
    scripts: Vec<(NodeId, StrTendril)>,
}

impl Default for ArenaDom {
    fn default() -> ArenaDom {
        ArenaDom {
            nodes: vec![Node::new(NodeData::Document)],
            errors: vec![],
            quirks_mode: NoQuirks,
            scripts: vec![],
        }
    }
}

impl ArenaDom {
    fn push_node(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node::new(data));
        NodeId(self.nodes.len() - 1)
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// The root `Document` node.
    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Errors reported while parsing, in order.
    pub fn errors(&self) -> &[Cow<'static, str>] {
        &self.errors
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    /// Every script element closed during parsing, with its source text.
    pub fn scripts(&self) -> &[(NodeId, StrTendril)] {
        &self.scripts
    }

    /// Create a detached element with no attributes. A `template` gets its
    /// contents fragment, as it would during parsing.
    pub fn create_element(&mut self, name: QualName) -> NodeId {
        crate::interface::create_element(self, name, vec![])
    }

    pub fn create_text(&mut self, text: StrTendril) -> NodeId {
        self.push_node(NodeData::Text { contents: text })
    }

    pub fn create_comment(&mut self, text: StrTendril) -> NodeId {
        self.push_node(NodeData::Comment { contents: text })
    }

    pub fn create_doctype(
        &mut self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) -> NodeId {
        self.push_node(NodeData::Doctype {
            name,
            public_id,
            system_id,
        })
    }

    /// Append `child` as the last child of `parent`, detaching it from
    /// its old parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Insert `child` into `parent` right before `reference`.
    ///
    /// Does nothing when `reference` is not a child of `parent`, or is
    /// `child` itself.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        if child == reference || self.parent(reference) != Some(parent) {
            return;
        }
        self.detach(child);
        let Some(index) = self.index_in_parent(parent, reference) else {
            return;
        };
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.insert(index, child);
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(index) = self.index_in_parent(parent, child) {
            self.node_mut(parent).children.remove(index);
            self.node_mut(child).parent = None;
        }
    }

    /// Set an attribute, replacing the value of one with the same name.
    /// Other nodes have no attributes, so this does nothing for them.
    pub fn set_attribute(&mut self, element: NodeId, name: QualName, value: StrTendril) {
        let NodeData::Element { ref mut attrs, .. } = self.node_mut(element).data else {
            return;
        };
        match attrs.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => attrs.push(Attribute { name, value }),
        }
    }

    /// The local name of an element, `None` for other nodes.
    pub fn tag_name(&self, id: NodeId) -> Option<&LocalName> {
        match self.node(id).data {
            NodeData::Element { ref name, .. } => Some(&name.local),
            _ => None,
        }
    }

    /// The namespace of an element, `None` for other nodes.
    pub fn namespace(&self, id: NodeId) -> Option<&Namespace> {
        match self.node(id).data {
            NodeData::Element { ref name, .. } => Some(&name.ns),
            _ => None,
        }
    }

    fn index_in_parent(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        }
    }

    /// Append text to `id` if it is a text node.
    fn append_to_existing_text(&mut self, id: NodeId, text: &str) -> bool {
        match self.node_mut(id).data {
            NodeData::Text { ref mut contents } => {
                contents.push_slice(text);
                true
            },
            _ => false,
        }
    }
}

impl TreeSink for ArenaDom {
    type Handle = NodeId;
    type Output = Self;

    fn finish(self) -> Self {
        self
    }

    fn parse_error(&mut self, msg: Cow<'static, str>) {
        debug!("parse error: {msg}");
        self.errors.push(msg);
    }

    fn get_document(&self) -> NodeId {
        self.document()
    }

    fn elem_name<'a>(&'a self, target: &'a NodeId) -> ExpandedName<'a> {
        match self.node(*target).data {
            NodeData::Element { ref name, .. } => name.expanded(),
            _ => panic!("not an element!"),
        }
    }

    fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>, flags: ElementFlags) -> NodeId {
        let template_contents = if flags.template {
            Some(self.push_node(NodeData::Document))
        } else {
            None
        };
        self.push_node(NodeData::Element {
            name,
            attrs,
            template_contents,
            mathml_annotation_xml_integration_point: flags.mathml_annotation_xml_integration_point,
        })
    }

    fn create_comment(&mut self, text: StrTendril) -> NodeId {
        ArenaDom::create_comment(self, text)
    }

    fn append(&mut self, parent: &NodeId, child: NodeOrText<NodeId>) {
        match child {
            AppendText(text) => {
                // Append to an existing Text node if we have one.
                if let Some(&last) = self.children(*parent).last() {
                    if self.append_to_existing_text(last, &text) {
                        return;
                    }
                }
                let node = self.create_text(text);
                self.append_child(*parent, node);
            },
            AppendNode(node) => self.append_child(*parent, node),
        }
    }

    fn append_before_sibling(&mut self, sibling: &NodeId, child: NodeOrText<NodeId>) {
        let parent = self
            .parent(*sibling)
            .expect("append_before_sibling called on node without parent");

        let node = match child {
            AppendText(text) => {
                // Look for a text node before the insertion point.
                let index = self
                    .index_in_parent(parent, *sibling)
                    .expect("sibling missing from its parent");
                if index > 0 {
                    let prev = self.children(parent)[index - 1];
                    if self.append_to_existing_text(prev, &text) {
                        return;
                    }
                }
                self.create_text(text)
            },
            AppendNode(node) => node,
        };

        self.insert_before(parent, node, *sibling);
    }

    fn append_doctype_to_document(
        &mut self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let doctype = self.create_doctype(name, public_id, system_id);
        self.append_child(self.document(), doctype);
    }

    fn get_template_contents(&self, target: &NodeId) -> NodeId {
        match self.node(*target).data {
            NodeData::Element {
                template_contents: Some(contents),
                ..
            } => contents,
            _ => panic!("not a template element!"),
        }
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
    }

    fn add_attrs_if_missing(&mut self, target: &NodeId, attrs: Vec<Attribute>) {
        let NodeData::Element {
            attrs: ref mut existing,
            ..
        } = self.node_mut(*target).data
        else {
            panic!("not an element");
        };

        let existing_names = existing
            .iter()
            .map(|e| e.name.clone())
            .collect::<HashSet<_>>();
        existing.extend(
            attrs
                .into_iter()
                .filter(|attr| !existing_names.contains(&attr.name)),
        );
    }

    fn remove_from_parent(&mut self, target: &NodeId) {
        self.detach(*target);
    }

    fn reparent_children(&mut self, node: &NodeId, new_parent: &NodeId) {
        let children = std::mem::take(&mut self.node_mut(*node).children);
        for &child in &children {
            self.node_mut(child).parent = Some(*new_parent);
        }
        self.node_mut(*new_parent).children.extend(children);
    }

    fn has_parent_node(&self, node: &NodeId) -> bool {
        self.parent(*node).is_some()
    }

    fn script_ready(&mut self, node: &NodeId, source: StrTendril) {
        self.scripts.push((*node, source));
    }

    fn is_mathml_annotation_xml_integration_point(&self, target: &NodeId) -> bool {
        match self.node(*target).data {
            NodeData::Element {
                mathml_annotation_xml_integration_point,
                ..
            } => mathml_annotation_xml_integration_point,
            _ => panic!("not an element!"),
        }
    }
}
