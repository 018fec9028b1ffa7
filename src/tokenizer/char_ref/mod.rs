// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Character reference decoding: `&amp;`, `&#169;`, `&#x2122;`, ...
//!
//! The decoder is a small state machine of its own. The tokenizer runs it
//! after an `&` and feeds it characters as they arrive; it can get stuck
//! waiting for input at any point and resume later.

use std::borrow::Cow::{self, Borrowed};
use std::char::from_u32;
use std::mem;

use log::trace;
use mac::format_if;
use tendril::StrTendril;

use crate::util::input::Input;

pub(crate) use self::data::NAMED_ENTITIES;
use self::data::C1_REPLACEMENTS;

mod data;

/// Up to two characters produced by one reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharRef {
    /// The resulting character(s)
    pub chars: [char; 2],

    /// How many slots in `chars` are valid?
    pub num_chars: u8,
}

impl CharRef {
    const EMPTY: CharRef = CharRef {
        chars: ['\0', '\0'],
        num_chars: 0,
    };

    fn one(c: char) -> CharRef {
        CharRef {
            chars: [c, '\0'],
            num_chars: 1,
        }
    }

    /// The decoded characters, or an empty slice when the input was not a
    /// character reference after all.
    pub fn as_slice(&self) -> &[char] {
        &self.chars[..self.num_chars as usize]
    }
}

/// Where the decoder reads from and reports to.
///
/// The tokenizer implements this over its own input; [`decode_reference`]
/// implements it over a plain string.
pub(crate) trait CharRefInput {
    fn peek(&mut self) -> Option<char>;
    fn discard_char(&mut self);
    /// Push characters back onto the front of the input.
    fn unconsume(&mut self, buf: StrTendril);
    fn emit_error(&mut self, error: Cow<'static, str>);
    fn exact_errors(&self) -> bool;
}

pub(crate) enum Status {
    Stuck,
    Progress,
    Done(CharRef),
}

#[derive(Debug)]
enum State {
    Begin,
    Octothorpe,
    Numeric(u32), // base
    NumericSemicolon,
    Named,
    BogusName,
}

pub(crate) struct CharRefTokenizer {
    state: State,
    in_attribute: bool,

    num: u32,
    num_too_big: bool,
    seen_digit: bool,
    hex_marker: Option<char>,

    name_buf: StrTendril,
    /// Longest full match so far, and its length in `name_buf`.
    name_match: Option<((u32, u32), u32)>,
}

impl CharRefTokenizer {
    pub(crate) fn new(in_attribute: bool) -> CharRefTokenizer {
        CharRefTokenizer {
            state: State::Begin,
            in_attribute,
            num: 0,
            num_too_big: false,
            seen_digit: false,
            hex_marker: None,
            name_buf: StrTendril::new(),
            name_match: None,
        }
    }

    pub(crate) fn step<I: CharRefInput>(&mut self, input: &mut I) -> Status {
        trace!("char ref tokenizer stepping in state {:?}", self.state);
        match self.state {
            State::Begin => self.do_begin(input),
            State::Octothorpe => self.do_octothorpe(input),
            State::Numeric(base) => self.do_numeric(input, base),
            State::NumericSemicolon => self.do_numeric_semicolon(input),
            State::Named => self.do_named(input),
            State::BogusName => self.do_bogus_name(input),
        }
    }

    fn do_begin<I: CharRefInput>(&mut self, input: &mut I) -> Status {
        match input.peek() {
            Some(c) if c.is_ascii_alphanumeric() => {
                self.state = State::Named;
                Status::Progress
            },
            Some('#') => {
                input.discard_char();
                self.state = State::Octothorpe;
                Status::Progress
            },
            // Whitespace, '<', '&' and everything else: not a reference.
            Some(_) => Status::Done(CharRef::EMPTY),
            None => Status::Stuck,
        }
    }

    fn do_octothorpe<I: CharRefInput>(&mut self, input: &mut I) -> Status {
        match input.peek() {
            Some(c @ ('x' | 'X')) => {
                input.discard_char();
                self.hex_marker = Some(c);
                self.state = State::Numeric(16);
            },
            Some(_) => {
                self.hex_marker = None;
                self.state = State::Numeric(10);
            },
            None => return Status::Stuck,
        }
        Status::Progress
    }

    fn do_numeric<I: CharRefInput>(&mut self, input: &mut I, base: u32) -> Status {
        let Some(c) = input.peek() else {
            return Status::Stuck;
        };
        match c.to_digit(base) {
            Some(n) => {
                input.discard_char();
                self.num = self.num.wrapping_mul(base);
                if self.num > 0x10FFFF {
                    // Keep consuming digits, but the value is already invalid.
                    self.num_too_big = true;
                }
                self.num = self.num.wrapping_add(n);
                self.seen_digit = true;
                Status::Progress
            },

            None if !self.seen_digit => self.unconsume_numeric(input),

            None => {
                self.state = State::NumericSemicolon;
                Status::Progress
            },
        }
    }

    fn do_numeric_semicolon<I: CharRefInput>(&mut self, input: &mut I) -> Status {
        match input.peek() {
            Some(';') => input.discard_char(),
            Some(_) => input.emit_error(Borrowed(
                "Semicolon missing after numeric character reference",
            )),
            None => return Status::Stuck,
        };
        self.finish_numeric(input)
    }

    fn unconsume_numeric<I: CharRefInput>(&mut self, input: &mut I) -> Status {
        let mut unconsume = StrTendril::from_char('#');
        if let Some(c) = self.hex_marker {
            unconsume.push_char(c);
        }

        input.unconsume(unconsume);
        input.emit_error(Borrowed("Numeric character reference without digits"));
        Status::Done(CharRef::EMPTY)
    }

    fn finish_numeric<I: CharRefInput>(&mut self, input: &mut I) -> Status {
        fn conv(n: u32) -> char {
            from_u32(n).expect("invalid char missed by error handling cases")
        }

        let (c, error) = match self.num {
            n if (n > 0x10FFFF) || self.num_too_big => ('\u{fffd}', true),
            0x00 | 0xD800..=0xDFFF => ('\u{fffd}', true),

            0x80..=0x9F => match C1_REPLACEMENTS[(self.num - 0x80) as usize] {
                Some(c) => (c, true),
                None => (conv(self.num), true),
            },

            0x01..=0x08 | 0x0B | 0x0D..=0x1F | 0x7F | 0xFDD0..=0xFDEF => (conv(self.num), true),

            n if (n & 0xFFFE) == 0xFFFE => (conv(n), true),

            n => (conv(n), false),
        };

        if error {
            let msg = format_if!(
                input.exact_errors(),
                "Invalid numeric character reference",
                "Invalid numeric character reference value 0x{:06X}",
                self.num
            );
            input.emit_error(msg);
        }

        Status::Done(CharRef::one(c))
    }

    fn do_named<I: CharRefInput>(&mut self, input: &mut I) -> Status {
        let Some(c) = input.peek() else {
            return Status::Stuck;
        };
        if !(c.is_ascii_alphanumeric() || c == ';') {
            return self.finish_named(input, Some(c));
        }

        input.discard_char();
        self.name_buf.push_char(c);
        match NAMED_ENTITIES.get(&self.name_buf[..]) {
            // A full match, but there might be a longer one to come.
            Some(&(c1, c2)) if c1 != 0 => {
                self.name_match = Some(((c1, c2), self.name_buf.len32()));
                Status::Progress
            },
            // A prefix of some name.
            Some(_) => Status::Progress,
            // Can't continue the match. `c` is consumed and sits at the
            // end of `name_buf`.
            None => self.finish_named(input, None),
        }
    }

    fn emit_name_error<I: CharRefInput>(&self, input: &mut I, name: &str) {
        let msg = format_if!(
            input.exact_errors(),
            "Invalid character reference",
            "Invalid character reference &{}",
            name
        );
        input.emit_error(msg);
    }

    /// `next` is the character after `name_buf` when it was only peeked.
    fn finish_named<I: CharRefInput>(&mut self, input: &mut I, next: Option<char>) -> Status {
        let Some(((c1, c2), match_len)) = self.name_match else {
            if self.name_buf.ends_with(';') {
                self.emit_name_error(input, &self.name_buf);
                input.unconsume(mem::take(&mut self.name_buf));
                return Status::Done(CharRef::EMPTY);
            }
            // Keep looking for a semicolon, to determine whether
            // we emit a parse error.
            self.state = State::BogusName;
            return Status::Progress;
        };

        // We have a complete match, but we may have consumed additional
        // characters into `name_buf`, as in `&notit` (`&not` matches,
        // `&noti` is a prefix of `&notin;`, `&notit` is nothing).
        let matched = &self.name_buf[..match_len as usize];
        let last_matched = matched.chars().next_back();
        let next_after = self.name_buf[match_len as usize..].chars().next().or(next);

        let unconsume_all = match (self.in_attribute, last_matched, next_after) {
            (_, Some(';'), _) => false,
            (true, _, Some('=')) => {
                input.emit_error(Borrowed(
                    "Equals sign after character reference in attribute",
                ));
                true
            },
            (true, _, Some(c)) if c.is_ascii_alphanumeric() => true,
            _ => {
                input.emit_error(Borrowed(
                    "Character reference does not end with semicolon",
                ));
                false
            },
        };

        if unconsume_all {
            input.unconsume(mem::take(&mut self.name_buf));
            return Status::Done(CharRef::EMPTY);
        }

        let rest = self.name_buf.subtendril(match_len, self.name_buf.len32() - match_len);
        input.unconsume(rest);
        Status::Done(CharRef {
            chars: [conv_entity(c1), conv_entity(c2)],
            num_chars: if c2 == 0 { 1 } else { 2 },
        })
    }

    fn do_bogus_name<I: CharRefInput>(&mut self, input: &mut I) -> Status {
        let Some(c) = input.peek() else {
            return Status::Stuck;
        };
        if c.is_ascii_alphanumeric() {
            input.discard_char();
            self.name_buf.push_char(c);
            return Status::Progress;
        }
        if c == ';' {
            let mut name = self.name_buf.clone();
            name.push_char(';');
            self.emit_name_error(input, &name);
        }
        input.unconsume(mem::take(&mut self.name_buf));
        Status::Done(CharRef::EMPTY)
    }

    /// The input ended in the middle of a reference. Finish with whatever
    /// has been seen.
    pub(crate) fn end_of_file<I: CharRefInput>(&mut self, input: &mut I) -> CharRef {
        loop {
            let status = match self.state {
                State::Begin => Status::Done(CharRef::EMPTY),
                State::Numeric(_) if !self.seen_digit => self.unconsume_numeric(input),
                State::Numeric(_) | State::NumericSemicolon => {
                    input.emit_error(Borrowed("EOF in numeric character reference"));
                    self.finish_numeric(input)
                },
                State::Named => self.finish_named(input, None),
                State::Octothorpe => {
                    input.unconsume(StrTendril::from_slice("#"));
                    input.emit_error(Borrowed("EOF after '#' in character reference"));
                    Status::Done(CharRef::EMPTY)
                },
                State::BogusName => {
                    input.unconsume(mem::take(&mut self.name_buf));
                    Status::Done(CharRef::EMPTY)
                },
            };

            match status {
                Status::Done(char_ref) => return char_ref,
                Status::Stuck => return CharRef::EMPTY,
                Status::Progress => {},
            }
        }
    }
}

fn conv_entity(n: u32) -> char {
    from_u32(n).unwrap_or('\0')
}

/// A [`CharRefInput`] over a fixed string, with no more input to come.
struct StrInput {
    text: Input,
}

impl CharRefInput for StrInput {
    fn peek(&mut self) -> Option<char> {
        self.text.peek()
    }

    fn discard_char(&mut self) {
        self.text.advance();
    }

    fn unconsume(&mut self, buf: StrTendril) {
        self.text.push_front(buf);
    }

    fn emit_error(&mut self, error: Cow<'static, str>) {
        trace!("character reference error: {error}");
    }

    fn exact_errors(&self) -> bool {
        false
    }
}

/// Decode the character reference at the start of `input`, which is the
/// text right after an `&`.
///
/// Returns the decoded characters and the number of characters of `input`
/// consumed, or `None` if `input` does not start with a character
/// reference (in which case the `&` is literal text). `in_attribute`
/// selects the stricter rules for legacy names without `;` inside
/// attribute values.
pub fn decode_reference(input: &str, in_attribute: bool) -> Option<(StrTendril, usize)> {
    let total = input.chars().count();
    let mut source = StrInput { text: Input::new() };
    source.text.push_front(StrTendril::from_slice(input));

    let mut tok = CharRefTokenizer::new(in_attribute);
    let char_ref = loop {
        match tok.step(&mut source) {
            Status::Done(char_ref) => break char_ref,
            Status::Progress => {},
            Status::Stuck => break tok.end_of_file(&mut source),
        }
    };

    if char_ref.num_chars == 0 {
        return None;
    }

    let mut remaining = 0;
    while let Some(buf) = source.text.pop_chunk() {
        remaining += buf.chars().count();
    }
    let decoded: StrTendril = char_ref.as_slice().iter().collect::<String>().into();
    Some((decoded, total - remaining))
}

#[cfg(test)]
mod test {
    use super::decode_reference;

    fn decode(input: &str, in_attribute: bool) -> Option<(String, usize)> {
        decode_reference(input, in_attribute).map(|(s, n)| (String::from(&*s), n))
    }

    #[test]
    fn named_with_semicolon() {
        assert_eq!(decode("amp;rest", false), Some(("&".to_string(), 4)));
        assert_eq!(decode("NotEqualTilde;", false), Some(("\u{2242}\u{338}".to_string(), 14)));
    }

    #[test]
    fn longest_legacy_prefix() {
        // `&not` matches, `&noti` is a prefix of `&notin;`, `&notit` is not.
        assert_eq!(decode("notit;", false), Some(("\u{ac}".to_string(), 3)));
        assert_eq!(decode("notin;", false), Some(("\u{2209}".to_string(), 6)));
    }

    #[test]
    fn attribute_rules_for_missing_semicolon() {
        assert_eq!(decode("amp=1", true), None);
        assert_eq!(decode("ampx", true), None);
        assert_eq!(decode("amp ", true), Some(("&".to_string(), 3)));
        assert_eq!(decode("ampx", false), Some(("&".to_string(), 3)));
    }

    #[test]
    fn numeric() {
        assert_eq!(decode("#65;", false), Some(("A".to_string(), 4)));
        assert_eq!(decode("#x41", false), Some(("A".to_string(), 4)));
        assert_eq!(decode("#X2122;", false), Some(("\u{2122}".to_string(), 7)));
        assert_eq!(decode("#0;", false), Some(("\u{fffd}".to_string(), 3)));
        assert_eq!(decode("#xD800;", false), Some(("\u{fffd}".to_string(), 7)));
        assert_eq!(decode("#x110000;", false), Some(("\u{fffd}".to_string(), 9)));
    }

    #[test]
    fn windows_1252_remapping() {
        assert_eq!(decode("#128;", false), Some(("\u{20ac}".to_string(), 5)));
        assert_eq!(decode("#x81;", false), Some(("\u{81}".to_string(), 5)));
    }

    #[test]
    fn not_a_reference() {
        assert_eq!(decode(" x", false), None);
        assert_eq!(decode("<", false), None);
        assert_eq!(decode("", false), None);
        assert_eq!(decode("#;", false), None);
        assert_eq!(decode("#xg", false), None);
        assert_eq!(decode("bogus;", false), None);
    }
}
