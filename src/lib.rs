// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An HTML5 tokenizer and tree builder.
//!
//! The tokenizer is pull-based: the tree builder asks it for one token at a
//! time and may switch its content model in between. Nodes are created and
//! linked through the [`TreeSink`] trait; [`arena_dom::ArenaDom`] is a
//! ready-made sink that stores the document in an index-addressed arena.

#![crate_name = "html5tree"]
#![allow(clippy::new_without_default)]

pub extern crate tendril;

// Generated atoms and the `local_name!`, `namespace_prefix!`,
// `namespace_url!` and `ns!` macros. Must come before the modules below.
include!(concat!(env!("OUT_DIR"), "/generated.rs"));

#[macro_use]
mod macros;

mod util {
    pub mod input;
    pub mod smallcharset;
    pub mod str;
}

#[macro_use]
pub mod interface;

pub mod arena_dom;
pub mod driver;
pub mod serialize;
pub mod tokenizer;
pub mod tree_builder;

pub use crate::driver::{parse, parse_document, parse_fragment, tokenize, ParseOpts, Parser};
pub use crate::interface::{Attribute, ExpandedName, QualName, QuirksMode};
pub use crate::interface::{ElementFlags, NodeOrText, TreeSink};
pub use crate::serialize::serialize;
pub use crate::util::input::{Input, Run};
pub use crate::util::smallcharset::SmallCharSet;
