// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Serialization of an [`ArenaDom`] back to HTML text.
//!
//! <https://html.spec.whatwg.org/multipage/#serialising-html-fragments>

use std::io::{self, Write};

use log::warn;

use crate::arena_dom::{ArenaDom, NodeData, NodeId};
use crate::interface::{Attribute, QualName};

/// Which nodes [`serialize`] writes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TraversalScope {
    /// The node itself and everything below it.
    IncludeNode,
    /// Only what is below the node.
    ChildrenOnly,
}

#[derive(Copy, Clone, Debug)]
pub struct SerializeOpts {
    /// Is scripting enabled? Decides whether `<noscript>` text is escaped.
    pub scripting_enabled: bool,

    /// Default: `ChildrenOnly`
    pub traversal_scope: TraversalScope,
}

impl Default for SerializeOpts {
    fn default() -> SerializeOpts {
        SerializeOpts {
            scripting_enabled: true,
            traversal_scope: TraversalScope::ChildrenOnly,
        }
    }
}

/// Write `node` (or only its children) of `dom` as HTML.
///
/// The contents of `<template>` elements are written as the element's
/// children.
pub fn serialize<W: Write>(
    writer: &mut W,
    dom: &ArenaDom,
    node: NodeId,
    opts: SerializeOpts,
) -> io::Result<()> {
    let mut out = HtmlWriter { out: writer, dom, opts };
    match opts.traversal_scope {
        TraversalScope::IncludeNode => out.node(node, None, true),
        TraversalScope::ChildrenOnly => {
            let parent = match dom.node(node).data {
                NodeData::Element { ref name, .. } => Some(name),
                _ => None,
            };
            out.children(node, parent)
        },
    }
}

/// Elements written without content or end tag.
fn is_void(name: &QualName) -> bool {
    name.ns == ns!(html)
        && matches!(
            name.local,
            local_name!("area")
                | local_name!("base")
                | local_name!("basefont")
                | local_name!("bgsound")
                | local_name!("br")
                | local_name!("col")
                | local_name!("embed")
                | local_name!("frame")
                | local_name!("hr")
                | local_name!("img")
                | local_name!("input")
                | local_name!("keygen")
                | local_name!("link")
                | local_name!("meta")
                | local_name!("param")
                | local_name!("source")
                | local_name!("track")
                | local_name!("wbr")
        )
}

/// Parents whose text is written as is.
fn holds_raw_text(name: &QualName, scripting_enabled: bool) -> bool {
    if name.ns != ns!(html) {
        return false;
    }
    match name.local {
        local_name!("style")
        | local_name!("script")
        | local_name!("xmp")
        | local_name!("iframe")
        | local_name!("noembed")
        | local_name!("noframes")
        | local_name!("plaintext") => true,
        local_name!("noscript") => scripting_enabled,
        _ => false,
    }
}

/// Parents that drop a newline right after their start tag when parsed.
fn eats_leading_newline(name: &QualName) -> bool {
    name.ns == ns!(html)
        && matches!(
            name.local,
            local_name!("pre") | local_name!("textarea") | local_name!("listing")
        )
}

struct HtmlWriter<'a, W> {
    out: &'a mut W,
    dom: &'a ArenaDom,
    opts: SerializeOpts,
}

impl<W: Write> HtmlWriter<'_, W> {
    fn children(&mut self, node: NodeId, parent: Option<&QualName>) -> io::Result<()> {
        for (i, &child) in self.dom.children(node).iter().enumerate() {
            self.node(child, parent, i == 0)?;
        }
        Ok(())
    }

    fn node(&mut self, node: NodeId, parent: Option<&QualName>, first: bool) -> io::Result<()> {
        let dom = self.dom;
        match dom.node(node).data {
            NodeData::Document => self.children(node, None),
            NodeData::Doctype { ref name, .. } => write!(self.out, "<!DOCTYPE {name}>"),
            NodeData::Comment { ref contents } => write!(self.out, "<!--{contents}-->"),
            NodeData::Text { ref contents } => self.text(contents, parent, first),
            NodeData::Element {
                ref name,
                ref attrs,
                template_contents,
                ..
            } => {
                self.start_tag(name, attrs)?;
                if is_void(name) {
                    return Ok(());
                }
                self.children(template_contents.unwrap_or(node), Some(name))?;
                write!(self.out, "</{}>", tag_name(name))
            },
        }
    }

    fn start_tag(&mut self, name: &QualName, attrs: &[Attribute]) -> io::Result<()> {
        write!(self.out, "<{}", tag_name(name))?;
        for attr in attrs {
            let prefix = match attr.name.ns {
                ns!() => "",
                ns!(xml) => "xml:",
                ns!(xmlns) if attr.name.local == local_name!("xmlns") => "",
                ns!(xmlns) => "xmlns:",
                ns!(xlink) => "xlink:",
                ref ns => {
                    warn!("attribute {} in unexpected namespace {ns:?}", attr.name.local);
                    "unknown_namespace:"
                },
            };
            write!(self.out, " {prefix}{}=\"", attr.name.local)?;
            self.escaped(&attr.value, true)?;
            self.out.write_all(b"\"")?;
        }
        self.out.write_all(b">")
    }

    fn text(&mut self, text: &str, parent: Option<&QualName>, first: bool) -> io::Result<()> {
        let Some(parent) = parent else {
            return self.escaped(text, false);
        };
        if first && text.starts_with('\n') && eats_leading_newline(parent) {
            self.out.write_all(b"\n")?;
        }
        if holds_raw_text(parent, self.opts.scripting_enabled) {
            self.out.write_all(text.as_bytes())
        } else {
            self.escaped(text, false)
        }
    }

    fn escaped(&mut self, text: &str, in_attribute: bool) -> io::Result<()> {
        let mut rest = text;
        while let Some(at) = rest.find(|c: char| needs_escape(c, in_attribute)) {
            self.out.write_all(rest[..at].as_bytes())?;
            let c = rest[at..].chars().next().expect("found a character");
            let entity: &[u8] = match c {
                '&' => b"&amp;",
                '\u{a0}' => b"&nbsp;",
                '"' => b"&quot;",
                '<' => b"&lt;",
                _ => b"&gt;",
            };
            self.out.write_all(entity)?;
            rest = &rest[at + c.len_utf8()..];
        }
        self.out.write_all(rest.as_bytes())
    }
}

fn needs_escape(c: char, in_attribute: bool) -> bool {
    match c {
        '&' | '\u{a0}' => true,
        '"' => in_attribute,
        '<' | '>' => !in_attribute,
        _ => false,
    }
}

fn tag_name(name: &QualName) -> &str {
    if !matches!(name.ns, ns!(html) | ns!(mathml) | ns!(svg)) {
        warn!("element {} in unexpected namespace {:?}", name.local, name.ns);
    }
    &name.local
}
