// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Static tables for character reference decoding.

/// Numeric references in the C1 control range (U+0080 through U+009F) are
/// remapped to these characters, taken from the Windows-1252 code page.
/// `None` entries keep the control character itself.
pub(crate) static C1_REPLACEMENTS: [Option<char>; 32] = [
    Some('\u{20ac}'),
    None,
    Some('\u{201a}'),
    Some('\u{0192}'),
    Some('\u{201e}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02c6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017d}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201c}'),
    Some('\u{201d}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02dc}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203a}'),
    Some('\u{0153}'),
    None,
    Some('\u{017e}'),
    Some('\u{0178}'),
];

// Generated by build.rs from data/entities.json.
include!(concat!(env!("OUT_DIR"), "/named_entities.rs"));

#[cfg(test)]
mod test {
    use super::{C1_REPLACEMENTS, NAMED_ENTITIES};

    #[test]
    fn full_names_and_prefixes() {
        assert_eq!(NAMED_ENTITIES.get("amp;"), Some(&(0x26, 0)));
        // Legacy name without a semicolon.
        assert_eq!(NAMED_ENTITIES.get("amp"), Some(&(0x26, 0)));
        // A proper prefix of "notin;" maps to nothing.
        assert_eq!(NAMED_ENTITIES.get("noti"), Some(&(0, 0)));
        assert_eq!(NAMED_ENTITIES.get("xyzzy"), None);
    }

    #[test]
    fn two_codepoint_entity() {
        assert_eq!(NAMED_ENTITIES.get("NotEqualTilde;"), Some(&(0x2242, 0x338)));
    }

    #[test]
    fn euro_sign_is_first_c1_replacement() {
        assert_eq!(C1_REPLACEMENTS[0], Some('\u{20ac}'));
        assert_eq!(C1_REPLACEMENTS[0x81 - 0x80], None);
    }
}
