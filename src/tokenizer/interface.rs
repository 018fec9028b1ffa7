// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::borrow::Cow;

use tendril::StrTendril;

use crate::interface::Attribute;
use crate::LocalName;

pub use self::TagKind::{EndTag, StartTag};
pub use self::Token::{CharacterTokens, CommentToken, DoctypeToken, TagToken};
pub use self::Token::{EOFToken, NullCharacterToken, ParseError};

/// A `<!DOCTYPE>`.
///
/// Quirks-mode detection tells a missing identifier (`None`) apart from an
/// empty one (`Some("")`).
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Doctype {
    pub name: Option<StrTendril>,
    pub public_id: Option<StrTendril>,
    pub system_id: Option<StrTendril>,
    pub force_quirks: bool,
}

#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum TagKind {
    StartTag,
    EndTag,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Tag {
    pub kind: TagKind,
    /// Lowercased.
    pub name: LocalName,
    pub self_closing: bool,
    /// In source order, without repeated names.
    pub attrs: Vec<Attribute>,
}

impl Tag {
    /// Same kind, same name and the same set of attributes, in any order.
    /// Used by the "Noah's Ark" clause of the active formatting list.
    pub fn same_as_ignoring_attr_order(&self, other: &Tag) -> bool {
        if self.kind != other.kind || self.name != other.name {
            return false;
        }
        if self.attrs.len() != other.attrs.len() {
            return false;
        }
        fn sorted(tag: &Tag) -> Vec<&Attribute> {
            let mut attrs: Vec<&Attribute> = tag.attrs.iter().collect();
            attrs.sort();
            attrs
        }
        sorted(self) == sorted(other)
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Token {
    DoctypeToken(Doctype),
    TagToken(Tag),
    CommentToken(StrTendril),
    /// Adjacent characters are handed out as one run.
    CharacterTokens(StrTendril),
    /// A U+0000 read in the data state. What it turns into depends on
    /// where the tree builder is.
    NullCharacterToken,
    EOFToken,
    ParseError(Cow<'static, str>),
}

/// Lexical contexts the tokenizer can be switched to between tokens,
/// either by the tree builder after a start tag or by the caller before
/// the first token.
#[derive(PartialEq, Eq, Copy, Clone, Hash, Debug)]
pub enum ContentModel {
    Data,
    /// `<title>`, `<textarea>`: text with character references.
    Rcdata,
    /// `<style>`, `<xmp>`, `<iframe>`, `<noembed>`, `<noframes>`.
    Rawtext,
    ScriptData,
    /// Everything up to the end of input is text.
    Plaintext,
}

/// What the tree builder asks of its driver after one token.
#[derive(Debug, PartialEq)]
#[must_use]
pub enum TokenSinkResult<Handle> {
    Continue,
    /// A script element was closed. The script could run here.
    Script(Handle),
    /// Switch the tokenizer before asking it for the next token.
    SwitchTo(ContentModel),
}
