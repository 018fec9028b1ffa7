// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The list of active formatting elements.
//!
//! Each element entry keeps the tag that created it, so the element can be
//! recreated when formatting is reconstructed or adopted. Markers separate
//! the formatting of table cells, captions, templates and object-like
//! elements from what surrounds them.

use crate::tokenizer::Tag;

pub(crate) enum Entry<Handle> {
    Element(Handle, Tag),
    Marker,
}

pub(crate) struct ActiveFormatting<Handle> {
    entries: Vec<Entry<Handle>>,
}

impl<Handle> ActiveFormatting<Handle> {
    pub(crate) fn new() -> Self {
        ActiveFormatting { entries: vec![] }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entries(&self) -> &[Entry<Handle>] {
        &self.entries
    }

    pub(crate) fn push_marker(&mut self) {
        self.entries.push(Entry::Marker);
    }

    /// Add an element entry. When three entries after the last marker
    /// already have the same tag, the earliest of them is dropped first.
    pub(crate) fn push(&mut self, node: Handle, tag: Tag) {
        let mut same = 0;
        let mut earliest = None;
        for (i, _, old) in self.since_marker() {
            if old.same_as_ignoring_attr_order(&tag) {
                same += 1;
                earliest = Some(i);
            }
        }
        if same >= 3 {
            if let Some(i) = earliest {
                self.entries.remove(i);
            }
        }
        self.entries.push(Entry::Element(node, tag));
    }

    /// Remove entries up to and including the last marker.
    pub(crate) fn clear_to_marker(&mut self) {
        while let Some(Entry::Element(..)) = self.entries.pop() {}
    }

    /// Element entries after the last marker, newest first, with their
    /// indices.
    pub(crate) fn since_marker(&self) -> impl Iterator<Item = (usize, &Handle, &Tag)> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .map_while(|(i, entry)| match entry {
                Entry::Element(node, tag) => Some((i, node, tag)),
                Entry::Marker => None,
            })
    }

    /// Index of the first element entry whose node satisfies `pred`.
    pub(crate) fn position<P>(&self, pred: P) -> Option<usize>
    where
        P: Fn(&Handle) -> bool,
    {
        self.entries.iter().position(|entry| match entry {
            Entry::Element(node, _) => pred(node),
            Entry::Marker => false,
        })
    }

    /// The tag of the element entry at `index`; `None` for a marker.
    pub(crate) fn tag_at(&self, index: usize) -> Option<&Tag> {
        match self.entries[index] {
            Entry::Element(_, ref tag) => Some(tag),
            Entry::Marker => None,
        }
    }

    pub(crate) fn replace(&mut self, index: usize, node: Handle, tag: Tag) {
        self.entries[index] = Entry::Element(node, tag);
    }

    pub(crate) fn insert(&mut self, index: usize, node: Handle, tag: Tag) {
        self.entries.insert(index, Entry::Element(node, tag));
    }

    pub(crate) fn remove(&mut self, index: usize) {
        self.entries.remove(index);
    }
}

#[cfg(test)]
mod test {
    use super::{ActiveFormatting, Entry};
    use crate::interface::{Attribute, QualName};
    use crate::tokenizer::{StartTag, Tag};

    fn tag(name: &str, attrs: &[(&str, &str)]) -> Tag {
        Tag {
            kind: StartTag,
            name: name.into(),
            self_closing: false,
            attrs: attrs
                .iter()
                .map(|&(name, value)| Attribute {
                    name: QualName::new(None, ns!(), name.into()),
                    value: value.into(),
                })
                .collect(),
        }
    }

    fn nodes(list: &ActiveFormatting<u32>) -> Vec<Option<u32>> {
        list.entries()
            .iter()
            .map(|entry| match *entry {
                Entry::Element(node, _) => Some(node),
                Entry::Marker => None,
            })
            .collect()
    }

    #[test]
    fn fourth_copy_drops_the_earliest() {
        let mut list = ActiveFormatting::new();
        for node in 1..=4 {
            list.push(node, tag("b", &[]));
        }
        assert_eq!(nodes(&list), vec![Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn attributes_tell_entries_apart() {
        let mut list = ActiveFormatting::new();
        list.push(1, tag("b", &[]));
        list.push(2, tag("b", &[("class", "x")]));
        list.push(3, tag("b", &[]));
        list.push(4, tag("b", &[]));
        assert_eq!(list.len(), 4);

        list.push(5, tag("b", &[]));
        assert_eq!(nodes(&list), vec![Some(2), Some(3), Some(4), Some(5)]);
    }

    #[test]
    fn attribute_order_does_not_matter() {
        let mut list = ActiveFormatting::new();
        list.push(1, tag("font", &[("size", "2"), ("color", "red")]));
        list.push(2, tag("font", &[("color", "red"), ("size", "2")]));
        list.push(3, tag("font", &[("size", "2"), ("color", "red")]));
        list.push(4, tag("font", &[("color", "red"), ("size", "2")]));
        assert_eq!(nodes(&list), vec![Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn markers_hide_earlier_copies() {
        let mut list = ActiveFormatting::new();
        for node in 1..=3 {
            list.push(node, tag("i", &[]));
        }
        list.push_marker();
        list.push(4, tag("i", &[]));
        assert_eq!(nodes(&list), vec![Some(1), Some(2), Some(3), None, Some(4)]);

        list.clear_to_marker();
        assert_eq!(nodes(&list), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn since_marker_is_newest_first() {
        let mut list = ActiveFormatting::new();
        list.push(1, tag("a", &[]));
        list.push_marker();
        list.push(2, tag("b", &[]));
        list.push(3, tag("i", &[]));
        let seen: Vec<(usize, u32)> = list.since_marker().map(|(i, &n, _)| (i, n)).collect();
        assert_eq!(seen, vec![(3, 3), (2, 2)]);
        assert_eq!(list.position(|&n| n == 1), Some(0));
        assert_eq!(list.tag_at(1).map(|t| &*t.name), None);
    }
}
