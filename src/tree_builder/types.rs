// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Values passed between the insertion-mode handlers. Only
//! `InsertionMode` is visible outside the tree builder.

use tendril::StrTendril;

use crate::tokenizer::{ContentModel, Tag};

/// The insertion modes of tree construction, named as in the HTML
/// standard's "parsing main" sections.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum InsertionMode {
    Initial,
    BeforeHtml,
    BeforeHead,
    InHead,
    /// `<noscript>` inside `<head>` with scripting disabled.
    InHeadNoscript,
    AfterHead,
    InBody,
    /// The content of a raw text or RCDATA element.
    Text,
    InTable,
    /// Character tokens collected inside a table, before deciding whether
    /// they are foster parented.
    InTableText,
    InCaption,
    InColumnGroup,
    InTableBody,
    InRow,
    InCell,
    InSelect,
    InSelectInTable,
    InTemplate,
    AfterBody,
    InFrameset,
    AfterFrameset,
    AfterAfterBody,
    AfterAfterFrameset,
}

impl InsertionMode {
    /// Modes in which a `<select>` is parsed as `InSelectInTable`.
    pub(crate) fn is_table_mode(self) -> bool {
        matches!(
            self,
            InsertionMode::InTable
                | InsertionMode::InCaption
                | InsertionMode::InTableBody
                | InsertionMode::InRow
                | InsertionMode::InCell
        )
    }
}

/// What is known about the whitespace in a run of characters.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub(crate) enum Split {
    /// Not examined yet.
    Unknown,
    /// Only HTML whitespace.
    Space,
    /// No HTML whitespace.
    NonSpace,
}

/// A tokenizer token as the insertion modes see it. Doctypes and parse
/// errors never get this far.
#[derive(PartialEq, Eq, Clone, Debug)]
pub(crate) enum Token {
    Tag(Tag),
    Comment(StrTendril),
    Chars(Split, StrTendril),
    Null,
    Eof,
}

/// The result of handing one token to an insertion mode.
pub(crate) enum Outcome<Handle> {
    Done,
    /// Done, and the start tag's self-closing flag was acknowledged.
    DoneSelfClosing,
    /// Cut the leading whitespace off these characters and process the
    /// two parts separately.
    SplitSpace(StrTendril),
    /// Switch to this mode and hand it the token.
    Reprocess(InsertionMode, Token),
    /// A script element was closed.
    Script(Handle),
    /// The tokenizer must continue in another content model.
    SwitchTo(ContentModel),
}

/// Where a new node goes.
pub(crate) enum Place<Handle> {
    /// At the end of this node's children.
    Append(Handle),
    /// Before `table` if it has a parent, else at the end of `fallback`.
    Foster { table: Handle, fallback: Handle },
}
