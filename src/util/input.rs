// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The character source the tokenizer reads from.
//!
//! Text arrives in chunks of arbitrary size. [`Input`] keeps them in order
//! and exposes them one code point at a time through [`Input::peek`] and
//! [`Input::advance`], with a couple of multi-character helpers on top.
//! Newlines are normalised as chunks come in, so readers never see a CR.

use std::collections::VecDeque;

use tendril::StrTendril;

use crate::util::smallcharset::SmallCharSet;

/// What [`Input::take_until`] found at the front of the input.
#[derive(PartialEq, Eq, Debug)]
pub enum Run {
    /// One character from the stop set, now consumed.
    Stop(char),
    /// A non-empty stretch of text with no stop characters in it.
    Text(StrTendril),
}

/// A queue of text chunks read from the front.
///
/// No chunk in the queue is ever empty.
#[derive(Debug, Default)]
pub struct Input {
    chunks: VecDeque<StrTendril>,
    /// The last chunk fed ended in CR, so a LF starting the next one
    /// belongs to the same line break.
    after_cr: bool,
}

impl Input {
    pub fn new() -> Input {
        Input::default()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Append a chunk of source text. CR and CRLF become a single LF.
    pub fn push_back(&mut self, mut chunk: StrTendril) {
        if chunk.len32() == 0 {
            return;
        }
        if self.after_cr && chunk.starts_with('\n') {
            chunk.pop_front(1);
        }
        self.after_cr = chunk.ends_with('\r');
        if chunk.contains('\r') {
            let text = chunk.replace("\r\n", "\n").replace('\r', "\n");
            chunk = StrTendril::from(text);
        }
        if chunk.len32() > 0 {
            self.chunks.push_back(chunk);
        }
    }

    /// Put text back at the front, to be read again. It is not normalised
    /// a second time.
    pub fn push_front(&mut self, text: StrTendril) {
        if text.len32() > 0 {
            self.chunks.push_front(text);
        }
    }

    /// The next character, without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.chunks.front().and_then(|chunk| chunk.chars().next())
    }

    /// Consume and return the next character.
    pub fn advance(&mut self) -> Option<char> {
        let front = self.chunks.front_mut()?;
        let c = front.chars().next()?;
        front.pop_front(c.len_utf8() as u32);
        if front.len32() == 0 {
            self.chunks.pop_front();
        }
        Some(c)
    }

    /// Consume either the text up to the next character in `stops`, or
    /// that character itself when it comes first.
    ///
    /// Runs never cross chunk boundaries, so a long stretch of text may
    /// come back in several pieces.
    pub fn take_until(&mut self, stops: SmallCharSet) -> Option<Run> {
        let front = self.chunks.front_mut()?;
        let len = stops.nonmember_prefix_len(front);
        let run = if len == 0 {
            let c = front.chars().next()?;
            front.pop_front(c.len_utf8() as u32);
            Run::Stop(c)
        } else {
            let text = front.subtendril(0, len);
            front.pop_front(len);
            Run::Text(text)
        };
        if front.len32() == 0 {
            self.chunks.pop_front();
        }
        Some(run)
    }

    /// Does the input start with the ASCII string `pat`? On a match, `pat`
    /// is consumed. Nothing is consumed otherwise.
    ///
    /// Returns `None` when the buffered text is a proper prefix of `pat`
    /// and more input is needed to decide.
    pub fn starts_with(&mut self, pat: &str, ignore_case: bool) -> Option<bool> {
        let mut wanted = pat.bytes();
        let mut matched = 0;
        'chunks: for chunk in &self.chunks {
            for have in chunk.bytes() {
                let Some(want) = wanted.next() else {
                    break 'chunks;
                };
                let same = if ignore_case {
                    have.eq_ignore_ascii_case(&want)
                } else {
                    have == want
                };
                if !same {
                    return Some(false);
                }
                matched += 1;
            }
        }

        if matched < pat.len() {
            return None;
        }
        self.skip_bytes(matched);
        Some(true)
    }

    /// Remove and return the front chunk as it stands.
    pub fn pop_chunk(&mut self) -> Option<StrTendril> {
        self.chunks.pop_front()
    }

    // Only called for ASCII text that is known to be there.
    fn skip_bytes(&mut self, mut n: usize) {
        while n > 0 {
            let Some(front) = self.chunks.front_mut() else {
                return;
            };
            let len = front.len32() as usize;
            if len <= n {
                n -= len;
                self.chunks.pop_front();
            } else {
                front.pop_front(n as u32);
                n = 0;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Input, Run};
    use tendril::SliceExt;

    fn input_of(chunks: &[&str]) -> Input {
        let mut input = Input::new();
        for chunk in chunks {
            input.push_back(chunk.to_tendril());
        }
        input
    }

    fn drain(input: &mut Input) -> String {
        let mut out = String::new();
        while let Some(c) = input.advance() {
            out.push(c);
        }
        out
    }

    #[test]
    fn peek_does_not_consume() {
        let mut input = input_of(&["ab"]);
        assert_eq!(input.peek(), Some('a'));
        assert_eq!(input.peek(), Some('a'));
        assert_eq!(input.advance(), Some('a'));
        assert_eq!(input.advance(), Some('b'));
        assert_eq!(input.peek(), None);
        assert!(input.is_empty());
    }

    #[test]
    fn unread_text_comes_first() {
        let mut input = input_of(&["cd"]);
        input.push_front("ab".to_tendril());
        assert_eq!(drain(&mut input), "abcd");
    }

    #[test]
    fn line_breaks_become_lf() {
        let mut input = input_of(&["a\r\nb\rc\n"]);
        assert_eq!(drain(&mut input), "a\nb\nc\n");
    }

    #[test]
    fn crlf_split_over_chunks_is_one_line_break() {
        let mut input = input_of(&["a\r", "\nb", "\r", "", "\n", "\n"]);
        assert_eq!(drain(&mut input), "a\nb\n\n");
    }

    #[test]
    fn runs_stop_at_set_members() {
        let mut input = input_of(&["héllo<b", "&"]);
        let stops = small_char_set!('<' '&');
        assert_eq!(input.take_until(stops), Some(Run::Text("héllo".to_tendril())));
        assert_eq!(input.take_until(stops), Some(Run::Stop('<')));
        assert_eq!(input.take_until(stops), Some(Run::Text("b".to_tendril())));
        assert_eq!(input.take_until(stops), Some(Run::Stop('&')));
        assert_eq!(input.take_until(stops), None);
    }

    #[test]
    fn starts_with_across_chunks() {
        let mut input = input_of(&["DOC", "type html"]);
        assert_eq!(input.starts_with("doctype", false), Some(false));
        assert_eq!(input.starts_with("doctype", true), Some(true));
        assert_eq!(drain(&mut input), " html");
    }

    #[test]
    fn starts_with_waits_for_more_text() {
        let mut input = input_of(&["-"]);
        assert_eq!(input.starts_with("--", false), None);
        assert_eq!(input.peek(), Some('-'));
        input.push_back("-x".to_tendril());
        assert_eq!(input.starts_with("--", false), Some(true));
        assert_eq!(drain(&mut input), "x");
    }
}
