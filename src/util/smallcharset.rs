// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This module contains a single struct [`SmallCharSet`]. See its documentation for details.

/// Represents a set of "small characters", those with Unicode scalar
/// values less than 64.
///
/// The tokenizer uses these to find the next character that needs special
/// handling (`<`, `&`, NUL, CR, ...) and hand everything before it over as
/// one run.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub struct SmallCharSet {
    pub bits: u64,
}

impl SmallCharSet {
    /// Checks whether a character (u8 value below 64) is stored in the SmallCharSet.
    #[inline]
    fn contains(&self, n: u8) -> bool {
        0 != (self.bits & (1 << (n as usize)))
    }

    /// Count the number of bytes of characters at the beginning of `buf` which are not in the set.
    ///
    /// [`Input::take_until`] uses this to split off runs of ordinary text.
    ///
    /// [`Input::take_until`]: crate::Input::take_until
    pub fn nonmember_prefix_len(&self, buf: &str) -> u32 {
        let mut n = 0;
        for b in buf.bytes() {
            if b >= 64 || !self.contains(b) {
                n += 1;
            } else {
                break;
            }
        }
        n
    }
}

#[cfg(test)]
mod test {
    #[test]
    fn nonmember_prefix() {
        for &c in ['&', '\0'].iter() {
            for x in 0..48u32 {
                for y in 0..48u32 {
                    let mut s = "x".repeat(x as usize);
                    s.push(c);
                    s.push_str(&"x".repeat(y as usize));
                    let set = small_char_set!('&' '\0');

                    assert_eq!(x, set.nonmember_prefix_len(&s));
                }
            }
        }
    }

    #[test]
    fn non_ascii_is_never_a_member() {
        let set = small_char_set!('<' '\n');
        assert_eq!(set.nonmember_prefix_len("é日本<"), 8);
    }
}
