// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The HTML5 tokenizer.
//!
//! The tokenizer owns its input. Callers [`feed`](Tokenizer::feed) text,
//! pull tokens with [`next_token`](Tokenizer::next_token) and call
//! [`end`](Tokenizer::end) once no more text will come. Between two tokens
//! the consumer may switch the lexical context with
//! [`set_content_model`](Tokenizer::set_content_model).
//!
//! Each `step` either consumes some input and moves the state machine
//! along, or reports that it needs more text. Ordinary text in the data,
//! text and quoted attribute value states is taken in runs rather than one
//! character at a time.

pub use self::interface::{CharacterTokens, EOFToken, NullCharacterToken, ParseError};
pub use self::interface::{CommentToken, DoctypeToken, TagToken, Token};
pub use self::interface::{ContentModel, TokenSinkResult};
pub use self::interface::{Doctype, EndTag, StartTag, Tag, TagKind};

use self::char_ref::{CharRef, CharRefInput, CharRefTokenizer, Status};
use self::states::{DoctypeId, State, TextKind};

use crate::util::input::{Input, Run};
use crate::util::smallcharset::SmallCharSet;
use crate::util::str::is_html_whitespace;

use log::{debug, trace};
use mac::format_if;
use std::borrow::Cow::{self, Borrowed};
use std::collections::VecDeque;
use std::mem;
use tendril::StrTendril;

use crate::interface::{Attribute, QualName};
use crate::LocalName;

pub mod char_ref;
mod interface;
mod states;

/// Tokenizer options, with an impl for `Default`.
#[derive(Clone, Debug)]
pub struct TokenizerOpts {
    /// Report every parse error with a detailed message, and check each
    /// input character for disallowed code points. Slower. Default: false
    pub exact_errors: bool,

    /// Drop a U+FEFF BYTE ORDER MARK at the very start of the input.
    /// Default: true
    pub discard_bom: bool,

    /// Start somewhere other than the data state. Fragment parsing and the
    /// tokenizer tests use this.
    pub initial_state: Option<ContentModel>,

    /// Pretend this start tag was the last one seen, so a matching end tag
    /// closes RCDATA, RAWTEXT or script content.
    pub last_start_tag_name: Option<String>,
}

impl Default for TokenizerOpts {
    fn default() -> TokenizerOpts {
        TokenizerOpts {
            exact_errors: false,
            discard_bom: true,
            initial_state: None,
            last_start_tag_name: None,
        }
    }
}

enum Step {
    Continue,
    NeedInput,
}

/// A tag under construction.
#[derive(Default)]
struct TagBuilder {
    end: bool,
    name: StrTendril,
    self_closing: bool,
    attrs: Vec<Attribute>,
    attr_name: StrTendril,
    attr_value: StrTendril,
}

impl TagBuilder {
    fn end_tag() -> TagBuilder {
        TagBuilder {
            end: true,
            ..TagBuilder::default()
        }
    }
}

/// The HTML tokenizer.
pub struct Tokenizer {
    opts: TokenizerOpts,

    input: Input,

    /// Tokens produced but not handed out yet.
    pending: VecDeque<Token>,

    /// Characters emitted since the last other token.
    text: StrTendril,

    state: State,

    /// The character to read again before touching `input`.
    reconsume: Option<char>,

    /// `end()` was called.
    input_ended: bool,

    /// Input is used up after `end()`; the current state is being wound
    /// down to the end-of-file token.
    draining: bool,

    eof_emitted: bool,

    /// Decoder for the character reference being read, if any.
    char_ref: Option<Box<CharRefTokenizer>>,

    /// Still at the start of the input, where a BOM may be dropped.
    at_start: bool,

    /// `<![CDATA[` opens a CDATA section rather than a bogus comment.
    allow_cdata: bool,

    tag: TagBuilder,

    comment: StrTendril,

    doctype: Doctype,

    /// Name of the last start tag emitted. Only a matching end tag can
    /// close text content.
    last_start_tag: Option<LocalName>,

    /// Scratch text: the letters of a possible end tag in text content, or
    /// the word after `<` in script escapes.
    temp: StrTendril,
}

impl Tokenizer {
    /// Create a new tokenizer with no input yet.
    pub fn new(mut opts: TokenizerOpts) -> Tokenizer {
        let last_start_tag = opts
            .last_start_tag_name
            .take()
            .map(|name| LocalName::from(&*name));
        let state = opts.initial_state.map_or(State::Data, State::from);
        let at_start = opts.discard_bom;
        Tokenizer {
            opts,
            input: Input::new(),
            pending: VecDeque::new(),
            text: StrTendril::new(),
            state,
            reconsume: None,
            input_ended: false,
            draining: false,
            eof_emitted: false,
            char_ref: None,
            at_start,
            allow_cdata: false,
            tag: TagBuilder::default(),
            comment: StrTendril::new(),
            doctype: Doctype::default(),
            last_start_tag,
            temp: StrTendril::new(),
        }
    }

    /// Append a chunk of text to the input.
    pub fn feed(&mut self, mut chunk: StrTendril) {
        if chunk.len32() == 0 {
            return;
        }
        if mem::replace(&mut self.at_start, false) && chunk.starts_with('\u{feff}') {
            chunk.pop_front('\u{feff}'.len_utf8() as u32);
        }
        self.input.push_back(chunk);
    }

    /// No more input will be fed.
    pub fn end(&mut self) {
        self.input_ended = true;
    }

    /// Switch the lexical context. The tree builder calls this right after
    /// a start tag whose content is text of some kind.
    pub fn set_content_model(&mut self, model: ContentModel) {
        trace!("content model is now {model:?}");
        self.state = model.into();
    }

    /// Whether the adjusted current node is a foreign element, where
    /// `<![CDATA[` starts a CDATA section.
    pub fn set_allow_cdata(&mut self, allow: bool) {
        self.allow_cdata = allow;
    }

    /// Get the next token.
    ///
    /// Returns `None` when more input is needed. After `end()` this never
    /// returns `None`. Once the input is used up, it returns `EOFToken`
    /// on every call.
    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            if self.eof_emitted {
                return Some(EOFToken);
            }

            let step = match self.char_ref.take() {
                Some(decoder) => self.run_char_ref(decoder),
                None if self.draining => {
                    self.at_end_of_input();
                    Step::Continue
                },
                None => self.step(),
            };

            if let Step::NeedInput = step {
                if !self.input_ended {
                    self.flush_text();
                    return self.pending.pop_front();
                }
                // A reference cut off by the end of input may hand
                // characters back, so it is finished before winding down.
                match self.char_ref.take() {
                    Some(mut decoder) => {
                        let char_ref = decoder.end_of_file(self);
                        self.finish_char_ref(char_ref);
                    },
                    None => self.draining = true,
                }
            }
        }
    }

    fn next_char(&mut self) -> Option<char> {
        if let Some(c) = self.reconsume.take() {
            return Some(c);
        }
        let c = self.input.advance()?;
        if self.opts.exact_errors && is_disallowed(c) {
            self.error(Cow::Owned(format!("Bad character {}", c.escape_default())));
        }
        Some(c)
    }

    fn reconsume_in(&mut self, c: char, state: State) {
        self.reconsume = Some(c);
        self.state = state;
    }

    /// Match `pat` against the upcoming input, consuming it on a match.
    /// Undecided is only possible before `end()`.
    fn lookahead(&mut self, pat: &str, ignore_case: bool) -> Option<bool> {
        if let Some(c) = self.reconsume.take() {
            self.input.push_front(StrTendril::from_char(c));
        }
        match self.input.starts_with(pat, ignore_case) {
            None if self.input_ended => Some(false),
            answer => answer,
        }
    }

    fn step(&mut self) -> Step {
        match self.state {
            State::Data | State::Plaintext | State::Text(_) | State::AttrValue(Some(_)) => {
                self.take_text()
            },
            State::MarkupDeclarationOpen => self.markup_declaration_open(),
            State::AfterDoctypeName => self.after_doctype_name(),
            _ => self.consume_next(),
        }
    }

    fn consume_next(&mut self) -> Step {
        match self.next_char() {
            Some(c) => {
                self.consume(c);
                Step::Continue
            },
            None => Step::NeedInput,
        }
    }

    /// Consume a run of characters that need no special handling in the
    /// current state, or the one character that ends the run.
    fn take_text(&mut self) -> Step {
        if self.reconsume.is_some() || self.opts.exact_errors {
            return self.consume_next();
        }

        match self.input.take_until(stop_chars(self.state)) {
            Some(Run::Text(text)) => {
                match self.state {
                    State::AttrValue(_) => self.tag.attr_value.push_tendril(&text),
                    _ => self.text.push_tendril(&text),
                }
                Step::Continue
            },
            Some(Run::Stop(c)) => {
                self.consume(c);
                Step::Continue
            },
            None => Step::NeedInput,
        }
    }

    fn markup_declaration_open(&mut self) -> Step {
        let Some(comment) = self.lookahead("--", false) else {
            return Step::NeedInput;
        };
        if comment {
            self.comment.clear();
            self.state = State::CommentStart;
            return Step::Continue;
        }

        let Some(doctype) = self.lookahead("doctype", true) else {
            return Step::NeedInput;
        };
        if doctype {
            self.state = State::Doctype;
            return Step::Continue;
        }

        if self.allow_cdata {
            let Some(cdata) = self.lookahead("[CDATA[", false) else {
                return Step::NeedInput;
            };
            if cdata {
                self.state = State::Cdata;
                return Step::Continue;
            }
        }

        self.error(Borrowed("Incorrectly opened comment"));
        self.comment.clear();
        self.state = State::BogusComment;
        Step::Continue
    }

    fn after_doctype_name(&mut self) -> Step {
        for (keyword, id) in [("public", DoctypeId::Public), ("system", DoctypeId::System)] {
            match self.lookahead(keyword, true) {
                None => return Step::NeedInput,
                Some(true) => {
                    self.state = State::AfterDoctypeKeyword(id);
                    return Step::Continue;
                },
                Some(false) => (),
            }
        }

        match self.next_char() {
            Some(c) if is_html_whitespace(c) => (),
            Some('>') => self.emit_doctype(),
            Some(c) => self.bogus_doctype(c, true),
            None => return Step::NeedInput,
        }
        Step::Continue
    }

    /// Run the state machine over one character.
    fn consume(&mut self, c: char) {
        trace!("{:?} in {:?}", c, self.state);
        match self.state {
            State::Data => match c {
                '&' => self.start_char_ref(),
                '<' => self.state = State::TagOpen,
                '\0' => {
                    self.unexpected(c);
                    self.emit_token(NullCharacterToken);
                },
                _ => self.text.push_char(c),
            },

            State::Plaintext => self.emit_text_char(c),

            State::Text(kind) => self.consume_text(kind, c),
            State::TextLessThan(kind) => self.text_less_than(kind, c),
            State::TextEndTagOpen(kind) => {
                if c.is_ascii_alphabetic() {
                    self.tag = TagBuilder::end_tag();
                    self.reconsume_in(c, State::TextEndTagName(kind));
                } else {
                    self.text.push_slice("</");
                    self.reconsume_in(c, State::Text(kind));
                }
            },
            State::TextEndTagName(kind) => self.text_end_tag_name(kind, c),

            State::ScriptEscapeStart | State::ScriptEscapeStartDash => {
                if c == '-' {
                    self.text.push_char('-');
                    self.state = match self.state {
                        State::ScriptEscapeStart => State::ScriptEscapeStartDash,
                        _ => State::ScriptEscapedDashDash(TextKind::ScriptEscaped),
                    };
                } else {
                    self.reconsume_in(c, State::Text(TextKind::Script));
                }
            },
            State::ScriptEscapedDash(kind) | State::ScriptEscapedDashDash(kind) => {
                let after_two_dashes = matches!(self.state, State::ScriptEscapedDashDash(_));
                match c {
                    '-' => {
                        self.text.push_char('-');
                        self.state = State::ScriptEscapedDashDash(kind);
                    },
                    '<' => {
                        if kind == TextKind::ScriptDoubleEscaped {
                            self.text.push_char('<');
                        }
                        self.state = State::TextLessThan(kind);
                    },
                    '>' if after_two_dashes => {
                        self.text.push_char('>');
                        self.state = State::Text(TextKind::Script);
                    },
                    _ => {
                        self.emit_text_char(c);
                        self.state = State::Text(kind);
                    },
                }
            },
            State::ScriptDoubleEscapeStart | State::ScriptDoubleEscapeEnd => {
                let (inside, outside) = if self.state == State::ScriptDoubleEscapeStart {
                    (TextKind::ScriptDoubleEscaped, TextKind::ScriptEscaped)
                } else {
                    (TextKind::ScriptEscaped, TextKind::ScriptDoubleEscaped)
                };
                if is_html_whitespace(c) || c == '/' || c == '>' {
                    let next = if &*self.temp == "script" { inside } else { outside };
                    self.text.push_char(c);
                    self.state = State::Text(next);
                } else if c.is_ascii_alphabetic() {
                    self.temp.push_char(c.to_ascii_lowercase());
                    self.text.push_char(c);
                } else {
                    self.reconsume_in(c, State::Text(outside));
                }
            },

            State::TagOpen => match c {
                '!' => self.state = State::MarkupDeclarationOpen,
                '/' => self.state = State::EndTagOpen,
                c if c.is_ascii_alphabetic() => {
                    self.tag = TagBuilder::default();
                    self.reconsume_in(c, State::TagName);
                },
                '?' => {
                    self.unexpected(c);
                    self.comment.clear();
                    self.reconsume_in(c, State::BogusComment);
                },
                _ => {
                    self.unexpected(c);
                    self.text.push_char('<');
                    self.reconsume_in(c, State::Data);
                },
            },
            State::EndTagOpen => match c {
                c if c.is_ascii_alphabetic() => {
                    self.tag = TagBuilder::end_tag();
                    self.reconsume_in(c, State::TagName);
                },
                '>' => {
                    self.error(Borrowed("Empty end tag"));
                    self.state = State::Data;
                },
                _ => {
                    self.unexpected(c);
                    self.comment.clear();
                    self.reconsume_in(c, State::BogusComment);
                },
            },
            State::TagName => match c {
                c if is_html_whitespace(c) => self.state = State::BeforeAttrName,
                '/' => self.state = State::SelfClosingStartTag,
                '>' => self.emit_tag(),
                '\0' => {
                    self.unexpected(c);
                    self.tag.name.push_char('\u{fffd}');
                },
                _ => self.tag.name.push_char(c.to_ascii_lowercase()),
            },

            State::BeforeAttrName
            | State::AttrName
            | State::AfterAttrName
            | State::BeforeAttrValue
            | State::AttrValue(_)
            | State::AfterAttrValueQuoted
            | State::SelfClosingStartTag => self.consume_in_tag(c),

            State::MarkupDeclarationOpen | State::AfterDoctypeName => {
                unreachable!("{:?} reads through lookahead", self.state)
            },

            State::BogusComment
            | State::CommentStart
            | State::CommentStartDash
            | State::Comment
            | State::CommentLessThan
            | State::CommentLessThanBang
            | State::CommentLessThanBangDash
            | State::CommentLessThanBangDashDash
            | State::CommentEndDash
            | State::CommentEnd
            | State::CommentEndBang => self.consume_in_comment(c),

            State::Doctype
            | State::BeforeDoctypeName
            | State::DoctypeName
            | State::AfterDoctypeKeyword(_)
            | State::BeforeDoctypeId(_)
            | State::DoctypeIdQuoted(..)
            | State::AfterDoctypeId(_)
            | State::BetweenDoctypeIds
            | State::BogusDoctype => self.consume_in_doctype(c),

            State::Cdata => match c {
                ']' => self.state = State::CdataBracket,
                _ => self.emit_text_char(c),
            },
            State::CdataBracket => match c {
                ']' => self.state = State::CdataEnd,
                _ => {
                    self.text.push_char(']');
                    self.reconsume_in(c, State::Cdata);
                },
            },
            State::CdataEnd => match c {
                ']' => self.text.push_char(']'),
                '>' => self.state = State::Data,
                _ => {
                    self.text.push_slice("]]");
                    self.reconsume_in(c, State::Cdata);
                },
            },
        }
    }

    fn consume_text(&mut self, kind: TextKind, c: char) {
        match (kind, c) {
            (TextKind::Rcdata, '&') => self.start_char_ref(),
            (TextKind::ScriptDoubleEscaped, '<') => {
                self.text.push_char('<');
                self.state = State::TextLessThan(kind);
            },
            (_, '<') => self.state = State::TextLessThan(kind),
            (TextKind::ScriptEscaped | TextKind::ScriptDoubleEscaped, '-') => {
                self.text.push_char('-');
                self.state = State::ScriptEscapedDash(kind);
            },
            _ => self.emit_text_char(c),
        }
    }

    fn text_less_than(&mut self, kind: TextKind, c: char) {
        match (kind, c) {
            (TextKind::ScriptDoubleEscaped, '/') => {
                self.temp.clear();
                self.text.push_char('/');
                self.state = State::ScriptDoubleEscapeEnd;
            },
            (TextKind::ScriptDoubleEscaped, _) => self.reconsume_in(c, State::Text(kind)),
            (_, '/') => {
                self.temp.clear();
                self.state = State::TextEndTagOpen(kind);
            },
            (TextKind::Script, '!') => {
                self.text.push_slice("<!");
                self.state = State::ScriptEscapeStart;
            },
            (TextKind::ScriptEscaped, c) if c.is_ascii_alphabetic() => {
                self.temp.clear();
                self.text.push_char('<');
                self.reconsume_in(c, State::ScriptDoubleEscapeStart);
            },
            _ => {
                self.text.push_char('<');
                self.reconsume_in(c, State::Text(kind));
            },
        }
    }

    fn text_end_tag_name(&mut self, kind: TextKind, c: char) {
        if self.is_appropriate_end_tag() {
            let next = match c {
                c if is_html_whitespace(c) => Some(State::BeforeAttrName),
                '/' => Some(State::SelfClosingStartTag),
                '>' => {
                    self.emit_tag();
                    return;
                },
                _ => None,
            };
            if let Some(next) = next {
                self.state = next;
                return;
            }
        }

        if c.is_ascii_alphabetic() {
            self.tag.name.push_char(c.to_ascii_lowercase());
            self.temp.push_char(c);
        } else {
            // Not an end tag after all. Everything read since `<` is text.
            self.tag = TagBuilder::default();
            self.text.push_slice("</");
            let temp = mem::take(&mut self.temp);
            self.text.push_tendril(&temp);
            self.reconsume_in(c, State::Text(kind));
        }
    }

    fn consume_in_tag(&mut self, c: char) {
        let whitespace = is_html_whitespace(c);
        match self.state {
            State::BeforeAttrName => match c {
                _ if whitespace => (),
                '/' | '>' => self.reconsume_in(c, State::AfterAttrName),
                '=' => {
                    self.unexpected(c);
                    self.start_attr();
                    self.tag.attr_name.push_char(c);
                    self.state = State::AttrName;
                },
                _ => {
                    self.start_attr();
                    self.reconsume_in(c, State::AttrName);
                },
            },
            State::AttrName => match c {
                '/' | '>' => self.reconsume_in(c, State::AfterAttrName),
                _ if whitespace => self.state = State::AfterAttrName,
                '=' => self.state = State::BeforeAttrValue,
                '\0' => {
                    self.unexpected(c);
                    self.tag.attr_name.push_char('\u{fffd}');
                },
                '"' | '\'' | '<' => {
                    self.unexpected(c);
                    self.tag.attr_name.push_char(c);
                },
                _ => self.tag.attr_name.push_char(c.to_ascii_lowercase()),
            },
            State::AfterAttrName => match c {
                _ if whitespace => (),
                '/' => self.state = State::SelfClosingStartTag,
                '=' => self.state = State::BeforeAttrValue,
                '>' => self.emit_tag(),
                _ => {
                    self.start_attr();
                    self.reconsume_in(c, State::AttrName);
                },
            },
            State::BeforeAttrValue => match c {
                _ if whitespace => (),
                '"' | '\'' => self.state = State::AttrValue(Some(c)),
                '>' => {
                    self.error(Borrowed("Missing attribute value"));
                    self.emit_tag();
                },
                _ => self.reconsume_in(c, State::AttrValue(None)),
            },
            State::AttrValue(Some(quote)) => match c {
                _ if c == quote => self.state = State::AfterAttrValueQuoted,
                '&' => self.start_char_ref(),
                '\0' => {
                    self.unexpected(c);
                    self.tag.attr_value.push_char('\u{fffd}');
                },
                _ => self.tag.attr_value.push_char(c),
            },
            State::AttrValue(None) => match c {
                _ if whitespace => self.state = State::BeforeAttrName,
                '&' => self.start_char_ref(),
                '>' => self.emit_tag(),
                '\0' => {
                    self.unexpected(c);
                    self.tag.attr_value.push_char('\u{fffd}');
                },
                '"' | '\'' | '<' | '=' | '`' => {
                    self.unexpected(c);
                    self.tag.attr_value.push_char(c);
                },
                _ => self.tag.attr_value.push_char(c),
            },
            State::AfterAttrValueQuoted => match c {
                _ if whitespace => self.state = State::BeforeAttrName,
                '/' => self.state = State::SelfClosingStartTag,
                '>' => self.emit_tag(),
                _ => {
                    self.error(Borrowed("Missing whitespace between attributes"));
                    self.reconsume_in(c, State::BeforeAttrName);
                },
            },
            State::SelfClosingStartTag => match c {
                '>' => {
                    self.tag.self_closing = true;
                    self.emit_tag();
                },
                _ => {
                    self.unexpected(c);
                    self.reconsume_in(c, State::BeforeAttrName);
                },
            },
            _ => unreachable!("{:?} is not a tag state", self.state),
        }
    }

    fn consume_in_comment(&mut self, c: char) {
        match self.state {
            State::BogusComment => match c {
                '>' => self.emit_comment(),
                '\0' => {
                    self.unexpected(c);
                    self.comment.push_char('\u{fffd}');
                },
                _ => self.comment.push_char(c),
            },
            State::CommentStart | State::CommentStartDash => {
                let dash = self.state == State::CommentStartDash;
                match c {
                    '-' if dash => self.state = State::CommentEnd,
                    '-' => self.state = State::CommentStartDash,
                    '>' => {
                        self.error(Borrowed("Abruptly closed empty comment"));
                        self.emit_comment();
                    },
                    _ => {
                        if dash {
                            self.comment.push_char('-');
                        }
                        self.reconsume_in(c, State::Comment);
                    },
                }
            },
            State::Comment => match c {
                '<' => {
                    self.comment.push_char(c);
                    self.state = State::CommentLessThan;
                },
                '-' => self.state = State::CommentEndDash,
                '\0' => {
                    self.unexpected(c);
                    self.comment.push_char('\u{fffd}');
                },
                _ => self.comment.push_char(c),
            },
            State::CommentLessThan => match c {
                '!' => {
                    self.comment.push_char(c);
                    self.state = State::CommentLessThanBang;
                },
                '<' => self.comment.push_char(c),
                _ => self.reconsume_in(c, State::Comment),
            },
            State::CommentLessThanBang => match c {
                '-' => self.state = State::CommentLessThanBangDash,
                _ => self.reconsume_in(c, State::Comment),
            },
            State::CommentLessThanBangDash => match c {
                '-' => self.state = State::CommentLessThanBangDashDash,
                _ => self.reconsume_in(c, State::CommentEndDash),
            },
            State::CommentLessThanBangDashDash => {
                if c != '>' {
                    self.error(Borrowed("Nested comment"));
                }
                self.reconsume_in(c, State::CommentEnd);
            },
            State::CommentEndDash => match c {
                '-' => self.state = State::CommentEnd,
                _ => {
                    self.comment.push_char('-');
                    self.reconsume_in(c, State::Comment);
                },
            },
            State::CommentEnd => match c {
                '>' => self.emit_comment(),
                '!' => self.state = State::CommentEndBang,
                '-' => self.comment.push_char('-'),
                _ => {
                    self.comment.push_slice("--");
                    self.reconsume_in(c, State::Comment);
                },
            },
            State::CommentEndBang => match c {
                '-' => {
                    self.comment.push_slice("--!");
                    self.state = State::CommentEndDash;
                },
                '>' => {
                    self.error(Borrowed("Comment closed by --!>"));
                    self.emit_comment();
                },
                _ => {
                    self.comment.push_slice("--!");
                    self.reconsume_in(c, State::Comment);
                },
            },
            _ => unreachable!("{:?} is not a comment state", self.state),
        }
    }

    fn consume_in_doctype(&mut self, c: char) {
        let whitespace = is_html_whitespace(c);
        match self.state {
            State::Doctype => {
                if whitespace {
                    self.state = State::BeforeDoctypeName;
                } else {
                    if c != '>' {
                        self.error(Borrowed("Missing whitespace before doctype name"));
                    }
                    self.reconsume_in(c, State::BeforeDoctypeName);
                }
            },
            State::BeforeDoctypeName => match c {
                _ if whitespace => (),
                '>' => {
                    self.unexpected(c);
                    self.doctype = Doctype {
                        force_quirks: true,
                        ..Doctype::default()
                    };
                    self.emit_doctype();
                },
                _ => {
                    self.doctype = Doctype {
                        name: Some(StrTendril::new()),
                        ..Doctype::default()
                    };
                    self.reconsume_in(c, State::DoctypeName);
                },
            },
            State::DoctypeName => match c {
                _ if whitespace => self.state = State::AfterDoctypeName,
                '>' => self.emit_doctype(),
                _ => {
                    let c = self.replace_null(c).to_ascii_lowercase();
                    self.doctype
                        .name
                        .get_or_insert_with(StrTendril::new)
                        .push_char(c);
                },
            },
            State::AfterDoctypeKeyword(id) | State::BeforeDoctypeId(id) => {
                let after_keyword = matches!(self.state, State::AfterDoctypeKeyword(_));
                match c {
                    _ if whitespace => self.state = State::BeforeDoctypeId(id),
                    '"' | '\'' => {
                        if after_keyword {
                            self.error(Borrowed("Missing whitespace after doctype keyword"));
                        }
                        *self.doctype_id(id) = Some(StrTendril::new());
                        self.state = State::DoctypeIdQuoted(id, c);
                    },
                    '>' => {
                        self.unexpected(c);
                        self.doctype.force_quirks = true;
                        self.emit_doctype();
                    },
                    _ => self.bogus_doctype(c, true),
                }
            },
            State::DoctypeIdQuoted(id, quote) => match c {
                _ if c == quote => self.state = State::AfterDoctypeId(id),
                '>' => {
                    self.error(Borrowed("Abrupt doctype identifier"));
                    self.doctype.force_quirks = true;
                    self.emit_doctype();
                },
                _ => {
                    let c = self.replace_null(c);
                    self.doctype_id(id)
                        .get_or_insert_with(StrTendril::new)
                        .push_char(c);
                },
            },
            State::AfterDoctypeId(DoctypeId::Public) | State::BetweenDoctypeIds => match c {
                _ if whitespace => self.state = State::BetweenDoctypeIds,
                '>' => self.emit_doctype(),
                '"' | '\'' => {
                    if self.state != State::BetweenDoctypeIds {
                        self.error(Borrowed("Missing whitespace between doctype identifiers"));
                    }
                    self.doctype.system_id = Some(StrTendril::new());
                    self.state = State::DoctypeIdQuoted(DoctypeId::System, c);
                },
                _ => self.bogus_doctype(c, true),
            },
            State::AfterDoctypeId(DoctypeId::System) => match c {
                _ if whitespace => (),
                '>' => self.emit_doctype(),
                _ => self.bogus_doctype(c, false),
            },
            State::BogusDoctype => match c {
                '>' => self.emit_doctype(),
                '\0' => self.unexpected(c),
                _ => (),
            },
            _ => unreachable!("{:?} is not a doctype state", self.state),
        }
    }

    fn bogus_doctype(&mut self, c: char, force_quirks: bool) {
        self.unexpected(c);
        if force_quirks {
            self.doctype.force_quirks = true;
        }
        self.reconsume_in(c, State::BogusDoctype);
    }

    /// The input ran out in the current state. Each call makes one
    /// transition; the last one emits `EOFToken`.
    fn at_end_of_input(&mut self) {
        debug!("end of input in {:?}", self.state);
        match self.state {
            State::Data
            | State::Plaintext
            | State::Text(TextKind::Rcdata | TextKind::Rawtext | TextKind::Script) => {
                self.emit_eof()
            },

            State::Text(_) | State::ScriptEscapedDash(_) | State::ScriptEscapedDashDash(_) => {
                self.eof_error();
                self.emit_eof();
            },

            State::TextLessThan(TextKind::ScriptDoubleEscaped) => {
                self.state = State::Text(TextKind::ScriptDoubleEscaped)
            },
            State::TextLessThan(kind) => {
                self.text.push_char('<');
                self.state = State::Text(kind);
            },
            State::TextEndTagOpen(kind) => {
                self.text.push_slice("</");
                self.state = State::Text(kind);
            },
            State::TextEndTagName(kind) => {
                self.text.push_slice("</");
                let temp = mem::take(&mut self.temp);
                self.text.push_tendril(&temp);
                self.state = State::Text(kind);
            },
            State::ScriptEscapeStart | State::ScriptEscapeStartDash => {
                self.state = State::Text(TextKind::Script)
            },
            State::ScriptDoubleEscapeStart => self.state = State::Text(TextKind::ScriptEscaped),
            State::ScriptDoubleEscapeEnd => {
                self.state = State::Text(TextKind::ScriptDoubleEscaped)
            },

            State::TagOpen => {
                self.eof_error();
                self.text.push_char('<');
                self.state = State::Data;
            },
            State::EndTagOpen => {
                self.eof_error();
                self.text.push_slice("</");
                self.state = State::Data;
            },
            State::TagName
            | State::BeforeAttrName
            | State::AttrName
            | State::AfterAttrName
            | State::BeforeAttrValue
            | State::AttrValue(_)
            | State::AfterAttrValueQuoted
            | State::SelfClosingStartTag => {
                // The unfinished tag is dropped.
                self.eof_error();
                self.tag = TagBuilder::default();
                self.emit_eof();
            },

            State::MarkupDeclarationOpen => {
                self.error(Borrowed("Incorrectly opened comment"));
                self.comment.clear();
                self.state = State::BogusComment;
            },
            State::BogusComment => {
                self.emit_comment();
                self.emit_eof();
            },
            State::CommentLessThan | State::CommentLessThanBang => self.state = State::Comment,
            State::CommentLessThanBangDash => self.state = State::CommentEndDash,
            State::CommentLessThanBangDashDash => self.state = State::CommentEnd,
            State::CommentStart
            | State::CommentStartDash
            | State::Comment
            | State::CommentEndDash
            | State::CommentEnd
            | State::CommentEndBang => {
                self.eof_error();
                self.emit_comment();
                self.emit_eof();
            },

            State::Doctype | State::BeforeDoctypeName => {
                self.eof_error();
                self.doctype = Doctype {
                    force_quirks: true,
                    ..Doctype::default()
                };
                self.emit_doctype();
                self.emit_eof();
            },
            State::DoctypeName
            | State::AfterDoctypeName
            | State::AfterDoctypeKeyword(_)
            | State::BeforeDoctypeId(_)
            | State::DoctypeIdQuoted(..)
            | State::AfterDoctypeId(_)
            | State::BetweenDoctypeIds => {
                self.eof_error();
                self.doctype.force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            },
            State::BogusDoctype => {
                self.emit_doctype();
                self.emit_eof();
            },

            State::Cdata => {
                self.eof_error();
                self.emit_eof();
            },
            State::CdataBracket => {
                self.text.push_char(']');
                self.state = State::Cdata;
            },
            State::CdataEnd => {
                self.text.push_slice("]]");
                self.state = State::Cdata;
            },
        }
    }

    fn start_char_ref(&mut self) {
        let in_attribute = matches!(self.state, State::AttrValue(_));
        self.char_ref = Some(Box::new(CharRefTokenizer::new(in_attribute)));
    }

    fn run_char_ref(&mut self, mut decoder: Box<CharRefTokenizer>) -> Step {
        match decoder.step(self) {
            Status::Done(char_ref) => {
                self.finish_char_ref(char_ref);
                Step::Continue
            },
            Status::Progress => {
                self.char_ref = Some(decoder);
                Step::Continue
            },
            Status::Stuck => {
                self.char_ref = Some(decoder);
                Step::NeedInput
            },
        }
    }

    /// Append what a reference decoded to, or the `&` itself when it was
    /// not a reference.
    fn finish_char_ref(&mut self, char_ref: CharRef) {
        let decoded: &[char] = match char_ref.as_slice() {
            [] => &['&'],
            chars => chars,
        };
        let target = match self.state {
            State::AttrValue(_) => &mut self.tag.attr_value,
            _ => &mut self.text,
        };
        for &c in decoded {
            target.push_char(c);
        }
    }

    fn start_attr(&mut self) {
        self.finish_attr();
        self.tag.attr_name.clear();
        self.tag.attr_value.clear();
    }

    fn finish_attr(&mut self) {
        if self.tag.attr_name.len32() == 0 {
            return;
        }
        let name = mem::take(&mut self.tag.attr_name);
        let value = mem::take(&mut self.tag.attr_value);
        if self.tag.attrs.iter().any(|attr| *attr.name.local == *name) {
            self.error(format_if!(
                self.opts.exact_errors,
                "Duplicate attribute",
                "Duplicate attribute {}",
                name
            ));
            return;
        }
        // Namespaced names are for the tree builder to sort out, in foreign
        // content only.
        self.tag.attrs.push(Attribute {
            name: QualName::new(None, ns!(), LocalName::from(&*name)),
            value,
        });
    }

    fn is_appropriate_end_tag(&self) -> bool {
        match self.last_start_tag {
            Some(ref last) => self.tag.end && *self.tag.name == **last,
            None => false,
        }
    }

    fn emit_tag(&mut self) {
        self.finish_attr();
        self.state = State::Data;
        let tag = mem::take(&mut self.tag);
        let name = LocalName::from(&*tag.name);
        let kind = if tag.end {
            if !tag.attrs.is_empty() {
                self.error(Borrowed("Attributes on an end tag"));
            }
            if tag.self_closing {
                self.error(Borrowed("Self-closing end tag"));
            }
            EndTag
        } else {
            self.last_start_tag = Some(name.clone());
            StartTag
        };
        self.emit_token(TagToken(Tag {
            kind,
            name,
            self_closing: tag.self_closing,
            attrs: tag.attrs,
        }));
    }

    fn emit_comment(&mut self) {
        self.state = State::Data;
        let comment = mem::take(&mut self.comment);
        self.emit_token(CommentToken(comment));
    }

    fn emit_doctype(&mut self) {
        self.state = State::Data;
        let doctype = mem::take(&mut self.doctype);
        self.emit_token(DoctypeToken(doctype));
    }

    fn doctype_id(&mut self, id: DoctypeId) -> &mut Option<StrTendril> {
        match id {
            DoctypeId::Public => &mut self.doctype.public_id,
            DoctypeId::System => &mut self.doctype.system_id,
        }
    }

    fn emit_eof(&mut self) {
        self.emit_token(EOFToken);
        self.eof_emitted = true;
    }

    /// Text outside the data state, where NUL is replaced.
    fn emit_text_char(&mut self, c: char) {
        let c = self.replace_null(c);
        self.text.push_char(c);
    }

    fn replace_null(&mut self, c: char) -> char {
        if c == '\0' {
            self.unexpected(c);
            '\u{fffd}'
        } else {
            c
        }
    }

    fn flush_text(&mut self) {
        if self.text.len32() > 0 {
            let text = mem::take(&mut self.text);
            self.pending.push_back(CharacterTokens(text));
        }
    }

    fn emit_token(&mut self, token: Token) {
        self.flush_text();
        self.pending.push_back(token);
    }

    // Errors don't end the current run of characters, so they may be handed
    // out ahead of characters that preceded them.
    fn error(&mut self, error: Cow<'static, str>) {
        self.pending.push_back(ParseError(error));
    }

    fn unexpected(&mut self, c: char) {
        let msg = format_if!(
            self.opts.exact_errors,
            "Unexpected character",
            "Unexpected character {:?} in state {:?}",
            c,
            self.state
        );
        self.error(msg);
    }

    fn eof_error(&mut self) {
        let msg = format_if!(
            self.opts.exact_errors,
            "Unexpected end of input",
            "Unexpected end of input in state {:?}",
            self.state
        );
        self.error(msg);
    }
}

impl CharRefInput for Tokenizer {
    fn peek(&mut self) -> Option<char> {
        self.reconsume.or_else(|| self.input.peek())
    }

    fn discard_char(&mut self) {
        if self.reconsume.take().is_none() {
            self.input.advance();
        }
    }

    fn unconsume(&mut self, buf: StrTendril) {
        self.input.push_front(buf);
    }

    fn emit_error(&mut self, error: Cow<'static, str>) {
        self.error(error)
    }

    fn exact_errors(&self) -> bool {
        self.opts.exact_errors
    }
}

/// Characters that end a run of plain text in a state read by
/// [`Tokenizer::take_text`].
fn stop_chars(state: State) -> SmallCharSet {
    match state {
        State::Data | State::Text(TextKind::Rcdata) => small_char_set!('\0' '&' '<'),
        State::Plaintext => small_char_set!('\0'),
        State::Text(TextKind::ScriptEscaped | TextKind::ScriptDoubleEscaped) => {
            small_char_set!('\0' '-' '<')
        },
        State::AttrValue(Some('\'')) => small_char_set!('\0' '&' '\''),
        State::AttrValue(_) => small_char_set!('\0' '&' '"'),
        _ => small_char_set!('\0' '<'),
    }
}

/// Controls, noncharacters and the like, which are parse errors in input.
fn is_disallowed(c: char) -> bool {
    match c as u32 {
        0x01..=0x08 | 0x0B | 0x0E..=0x1F | 0x7F..=0x9F | 0xFDD0..=0xFDEF => true,
        n => n & 0xFFFE == 0xFFFE,
    }
}
