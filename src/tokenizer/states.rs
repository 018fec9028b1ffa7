// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Where the tokenizer is in the markup. Callers never see these; they
//! pick a starting point through [`ContentModel`](super::ContentModel).

use super::interface::ContentModel;

/// Element content that is text rather than markup. Each kind has its own
/// less-than-sign and end-tag states, parameterised by this.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub(super) enum TextKind {
    /// Character references are decoded.
    Rcdata,
    Rawtext,
    Script,
    /// After `<!--` inside a script.
    ScriptEscaped,
    /// After `<!--<script` inside a script.
    ScriptDoubleEscaped,
}

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub(super) enum DoctypeId {
    Public,
    System,
}

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub(super) enum State {
    Data,
    Plaintext,
    Text(TextKind),
    TextLessThan(TextKind),
    TextEndTagOpen(TextKind),
    TextEndTagName(TextKind),
    ScriptEscapeStart,
    ScriptEscapeStartDash,
    /// Only ever `ScriptEscaped` or `ScriptDoubleEscaped`.
    ScriptEscapedDash(TextKind),
    ScriptEscapedDashDash(TextKind),
    ScriptDoubleEscapeStart,
    ScriptDoubleEscapeEnd,

    TagOpen,
    EndTagOpen,
    TagName,
    BeforeAttrName,
    AttrName,
    AfterAttrName,
    BeforeAttrValue,
    /// The quote character, or `None` for an unquoted value.
    AttrValue(Option<char>),
    AfterAttrValueQuoted,
    SelfClosingStartTag,

    MarkupDeclarationOpen,
    BogusComment,
    CommentStart,
    CommentStartDash,
    Comment,
    CommentLessThan,
    CommentLessThanBang,
    CommentLessThanBangDash,
    CommentLessThanBangDashDash,
    CommentEndDash,
    CommentEnd,
    CommentEndBang,

    Doctype,
    BeforeDoctypeName,
    DoctypeName,
    AfterDoctypeName,
    AfterDoctypeKeyword(DoctypeId),
    BeforeDoctypeId(DoctypeId),
    DoctypeIdQuoted(DoctypeId, char),
    AfterDoctypeId(DoctypeId),
    BetweenDoctypeIds,
    BogusDoctype,

    Cdata,
    CdataBracket,
    CdataEnd,
}

impl From<ContentModel> for State {
    fn from(model: ContentModel) -> State {
        match model {
            ContentModel::Data => State::Data,
            ContentModel::Rcdata => State::Text(TextKind::Rcdata),
            ContentModel::Rawtext => State::Text(TextKind::Rawtext),
            ContentModel::ScriptData => State::Text(TextKind::Script),
            ContentModel::Plaintext => State::Plaintext,
        }
    }
}
