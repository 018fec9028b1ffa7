// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! SVG and MathML content: when tokens bypass the insertion modes, and
//! the name fixes applied to foreign elements and attributes.

use tendril::StrTendril;

use crate::interface::TreeSink;
use crate::tokenizer::{StartTag, Tag};
use crate::tree_builder::actions::has_non_space;
use crate::tree_builder::tag_sets::{mathml_text_integration_point, svg_html_integration_point};
use crate::tree_builder::types::{Outcome, Token};
use crate::tree_builder::TreeBuilder;
use crate::{LocalName, Namespace, QualName};

/// SVG element names the tokenizer has lowercased.
static SVG_ELEMENTS: &[(&str, &str)] = &[
    ("altglyph", "altGlyph"),
    ("altglyphdef", "altGlyphDef"),
    ("altglyphitem", "altGlyphItem"),
    ("animatecolor", "animateColor"),
    ("animatemotion", "animateMotion"),
    ("animatetransform", "animateTransform"),
    ("clippath", "clipPath"),
    ("feblend", "feBlend"),
    ("fecolormatrix", "feColorMatrix"),
    ("fecomponenttransfer", "feComponentTransfer"),
    ("fecomposite", "feComposite"),
    ("feconvolvematrix", "feConvolveMatrix"),
    ("fediffuselighting", "feDiffuseLighting"),
    ("fedisplacementmap", "feDisplacementMap"),
    ("fedistantlight", "feDistantLight"),
    ("fedropshadow", "feDropShadow"),
    ("feflood", "feFlood"),
    ("fefunca", "feFuncA"),
    ("fefuncb", "feFuncB"),
    ("fefuncg", "feFuncG"),
    ("fefuncr", "feFuncR"),
    ("fegaussianblur", "feGaussianBlur"),
    ("feimage", "feImage"),
    ("femerge", "feMerge"),
    ("femergenode", "feMergeNode"),
    ("femorphology", "feMorphology"),
    ("feoffset", "feOffset"),
    ("fepointlight", "fePointLight"),
    ("fespecularlighting", "feSpecularLighting"),
    ("fespotlight", "feSpotLight"),
    ("fetile", "feTile"),
    ("feturbulence", "feTurbulence"),
    ("foreignobject", "foreignObject"),
    ("glyphref", "glyphRef"),
    ("lineargradient", "linearGradient"),
    ("radialgradient", "radialGradient"),
    ("textpath", "textPath"),
];

/// SVG attribute names the tokenizer has lowercased.
static SVG_ATTRIBUTES: &[(&str, &str)] = &[
    ("attributename", "attributeName"),
    ("attributetype", "attributeType"),
    ("basefrequency", "baseFrequency"),
    ("baseprofile", "baseProfile"),
    ("calcmode", "calcMode"),
    ("clippathunits", "clipPathUnits"),
    ("diffuseconstant", "diffuseConstant"),
    ("edgemode", "edgeMode"),
    ("filterunits", "filterUnits"),
    ("glyphref", "glyphRef"),
    ("gradienttransform", "gradientTransform"),
    ("gradientunits", "gradientUnits"),
    ("kernelmatrix", "kernelMatrix"),
    ("kernelunitlength", "kernelUnitLength"),
    ("keypoints", "keyPoints"),
    ("keysplines", "keySplines"),
    ("keytimes", "keyTimes"),
    ("lengthadjust", "lengthAdjust"),
    ("limitingconeangle", "limitingConeAngle"),
    ("markerheight", "markerHeight"),
    ("markerunits", "markerUnits"),
    ("markerwidth", "markerWidth"),
    ("maskcontentunits", "maskContentUnits"),
    ("maskunits", "maskUnits"),
    ("numoctaves", "numOctaves"),
    ("pathlength", "pathLength"),
    ("patterncontentunits", "patternContentUnits"),
    ("patterntransform", "patternTransform"),
    ("patternunits", "patternUnits"),
    ("pointsatx", "pointsAtX"),
    ("pointsaty", "pointsAtY"),
    ("pointsatz", "pointsAtZ"),
    ("preservealpha", "preserveAlpha"),
    ("preserveaspectratio", "preserveAspectRatio"),
    ("primitiveunits", "primitiveUnits"),
    ("refx", "refX"),
    ("refy", "refY"),
    ("repeatcount", "repeatCount"),
    ("repeatdur", "repeatDur"),
    ("requiredextensions", "requiredExtensions"),
    ("requiredfeatures", "requiredFeatures"),
    ("specularconstant", "specularConstant"),
    ("specularexponent", "specularExponent"),
    ("spreadmethod", "spreadMethod"),
    ("startoffset", "startOffset"),
    ("stddeviation", "stdDeviation"),
    ("stitchtiles", "stitchTiles"),
    ("surfacescale", "surfaceScale"),
    ("systemlanguage", "systemLanguage"),
    ("tablevalues", "tableValues"),
    ("targetx", "targetX"),
    ("targety", "targetY"),
    ("textlength", "textLength"),
    ("viewbox", "viewBox"),
    ("viewtarget", "viewTarget"),
    ("xchannelselector", "xChannelSelector"),
    ("ychannelselector", "yChannelSelector"),
    ("zoomandpan", "zoomAndPan"),
];

fn lookup(table: &[(&str, &'static str)], name: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|&&(lower, _)| lower == name)
        .map(|&(_, fixed)| fixed)
}

fn fix_svg_element_name(tag: &mut Tag) {
    if let Some(fixed) = lookup(SVG_ELEMENTS, &tag.name) {
        tag.name = LocalName::from(fixed);
    }
}

fn fix_svg_attributes(tag: &mut Tag) {
    for attr in &mut tag.attrs {
        if let Some(fixed) = lookup(SVG_ATTRIBUTES, &attr.name.local) {
            attr.name = QualName::new(None, ns!(), LocalName::from(fixed));
        }
    }
}

fn fix_mathml_attributes(tag: &mut Tag) {
    for attr in &mut tag.attrs {
        if attr.name.local == local_name!("definitionurl") {
            attr.name = QualName::new(None, ns!(), local_name!("definitionURL"));
        }
    }
}

/// `xlink:`, `xml:` and `xmlns` attributes get their namespace.
fn namespaced_attribute(written: &str) -> Option<QualName> {
    let (prefix, ns, local) = match written.split_once(':') {
        None if written == "xmlns" => (None, ns!(xmlns), written),
        Some(("xlink", local @ ("actuate" | "arcrole" | "href" | "role" | "show" | "title" | "type"))) => {
            (Some(namespace_prefix!("xlink")), ns!(xlink), local)
        },
        Some(("xml", local @ ("lang" | "space"))) => {
            (Some(namespace_prefix!("xml")), ns!(xml), local)
        },
        Some(("xmlns", local @ "xlink")) => (Some(namespace_prefix!("xmlns")), ns!(xmlns), local),
        _ => return None,
    };
    Some(QualName::new(prefix, ns, LocalName::from(local)))
}

fn fix_namespaced_attributes(tag: &mut Tag) {
    for attr in &mut tag.attrs {
        if attr.name.ns != ns!() {
            continue;
        }
        if let Some(name) = namespaced_attribute(&attr.name.local) {
            attr.name = name;
        }
    }
}

/// HTML start tags that end foreign content, and `</br>` and `</p>`.
fn leaves_foreign_content(tag: &Tag) -> bool {
    if tag.kind != StartTag {
        return matches!(tag.name, local_name!("br") | local_name!("p"));
    }
    match tag.name {
        local_name!("font") => tag.attrs.iter().any(|attr| {
            attr.name.ns == ns!()
                && matches!(
                    attr.name.local,
                    local_name!("color") | local_name!("face") | local_name!("size")
                )
        }),
        local_name!("b")
        | local_name!("big")
        | local_name!("blockquote")
        | local_name!("body")
        | local_name!("br")
        | local_name!("center")
        | local_name!("code")
        | local_name!("dd")
        | local_name!("div")
        | local_name!("dl")
        | local_name!("dt")
        | local_name!("em")
        | local_name!("embed")
        | local_name!("h1")
        | local_name!("h2")
        | local_name!("h3")
        | local_name!("h4")
        | local_name!("h5")
        | local_name!("h6")
        | local_name!("head")
        | local_name!("hr")
        | local_name!("i")
        | local_name!("img")
        | local_name!("li")
        | local_name!("listing")
        | local_name!("menu")
        | local_name!("meta")
        | local_name!("nobr")
        | local_name!("ol")
        | local_name!("p")
        | local_name!("pre")
        | local_name!("ruby")
        | local_name!("s")
        | local_name!("small")
        | local_name!("span")
        | local_name!("strong")
        | local_name!("strike")
        | local_name!("sub")
        | local_name!("sup")
        | local_name!("table")
        | local_name!("tt")
        | local_name!("u")
        | local_name!("ul")
        | local_name!("var") => true,
        _ => false,
    }
}

impl<Handle, Sink> TreeBuilder<Handle, Sink>
where
    Handle: Clone,
    Sink: TreeSink<Handle = Handle>,
{
    /// Does `token` go to the foreign content rules rather than the
    /// current insertion mode?
    pub(crate) fn is_foreign(&self, token: &Token) -> bool {
        if matches!(token, Token::Eof) || self.open.is_empty() {
            return false;
        }
        let node = self.adjusted_current();
        let name = self.name_of(node);
        if *name.ns == ns!(html) {
            return false;
        }

        let text = matches!(token, Token::Chars(..) | Token::Null);
        let start = match token {
            Token::Tag(tag) if tag.kind == StartTag => Some(&tag.name),
            _ => None,
        };

        if mathml_text_integration_point(name) {
            let html_start = start.is_some_and(|local| {
                !matches!(*local, local_name!("mglyph") | local_name!("malignmark"))
            });
            if text || html_start {
                return false;
            }
        }
        if name == expanded_name!(mathml "annotation-xml")
            && start.is_some_and(|local| *local == local_name!("svg"))
        {
            return false;
        }
        if svg_html_integration_point(name) || self.sink.is_mathml_annotation_xml_integration_point(node) {
            if text || start.is_some() {
                return false;
            }
        }
        true
    }

    /// The rules for tokens in foreign content.
    pub(crate) fn foreign(&mut self, token: Token) -> Outcome<Handle> {
        self.trace_step(self.mode, &token);
        match token {
            Token::Null => {
                self.unexpected(&token);
                self.text(StrTendril::from_char('\u{fffd}'))
            },
            Token::Chars(_, text) => {
                if has_non_space(&text) {
                    self.frameset_ok = false;
                }
                if self.current_is_svg_script() {
                    self.script_text.push_tendril(&text);
                }
                self.text(text)
            },
            Token::Comment(text) => self.comment(text),
            Token::Tag(tag) if leaves_foreign_content(&tag) => self.leave_foreign_content(tag),
            Token::Tag(tag) if tag.kind == StartTag => self.foreign_start_tag(tag),
            Token::Tag(tag) => self.foreign_end_tag(tag),
            Token::Eof => unreachable!("end of input is never foreign"),
        }
    }

    /// `<svg>` or `<math>` seen in HTML content.
    pub(crate) fn enter_foreign(&mut self, mut tag: Tag, ns: Namespace) -> Outcome<Handle> {
        if ns == ns!(mathml) {
            fix_mathml_attributes(&mut tag);
        } else {
            fix_svg_attributes(&mut tag);
        }
        fix_namespaced_attributes(&mut tag);

        let open = !tag.self_closing;
        self.insert(ns, tag.name, tag.attrs, open);
        if open {
            Outcome::Done
        } else {
            Outcome::DoneSelfClosing
        }
    }

    fn foreign_start_tag(&mut self, mut tag: Tag) -> Outcome<Handle> {
        let ns = self.name_of(self.adjusted_current()).ns.clone();
        if ns == ns!(mathml) {
            fix_mathml_attributes(&mut tag);
        } else if ns == ns!(svg) {
            fix_svg_element_name(&mut tag);
            fix_svg_attributes(&mut tag);
        }
        fix_namespaced_attributes(&mut tag);

        let svg_script = ns == ns!(svg) && tag.name == local_name!("script");
        if svg_script {
            self.script_text.clear();
        }
        match (tag.self_closing, svg_script) {
            (false, _) => {
                self.insert(ns, tag.name, tag.attrs, true);
                Outcome::Done
            },
            // `<script/>` in SVG is handled like `<script></script>`.
            (true, true) => {
                self.insert(ns, tag.name, tag.attrs, true);
                Outcome::Script(self.pop_open())
            },
            (true, false) => {
                self.insert(ns, tag.name, tag.attrs, false);
                Outcome::DoneSelfClosing
            },
        }
    }

    fn foreign_end_tag(&mut self, tag: Tag) -> Outcome<Handle> {
        if tag.name == local_name!("script") && self.current_is_svg_script() {
            let script = self.pop_open();
            return Outcome::Script(script);
        }

        let mut index = self.open.len() - 1;
        if !self.name_of(&self.open[index]).local.eq_ignore_ascii_case(&tag.name) {
            self.unexpected(&tag);
        }
        loop {
            if index == 0 {
                return Outcome::Done;
            }
            if self.name_of(&self.open[index]).local.eq_ignore_ascii_case(&tag.name) {
                self.pop_from(index);
                return Outcome::Done;
            }
            index -= 1;
            if *self.name_of(&self.open[index]).ns == ns!(html) {
                return self.step(self.mode, Token::Tag(tag));
            }
        }
    }

    /// An HTML tag inside SVG or MathML: pop back out to HTML content or
    /// an integration point, then process the tag there.
    fn leave_foreign_content(&mut self, tag: Tag) -> Outcome<Handle> {
        self.unexpected(&tag);
        loop {
            let node = self.current();
            let name = self.name_of(node);
            let stop = *name.ns == ns!(html)
                || mathml_text_integration_point(name)
                || svg_html_integration_point(name)
                || self.sink.is_mathml_annotation_xml_integration_point(node);
            if stop {
                break;
            }
            self.pop_open();
        }
        self.step(self.mode, Token::Tag(tag))
    }

    fn current_is_svg_script(&self) -> bool {
        self.name_of(self.current()) == expanded_name!(svg "script")
    }
}

#[cfg(test)]
mod test {
    use super::{fix_svg_element_name, leaves_foreign_content, namespaced_attribute};
    use crate::interface::{Attribute, QualName};
    use crate::tokenizer::{EndTag, StartTag, Tag, TagKind};

    fn tag(kind: TagKind, name: &str, attrs: &[&str]) -> Tag {
        Tag {
            kind,
            name: name.into(),
            self_closing: false,
            attrs: attrs
                .iter()
                .map(|&name| Attribute {
                    name: QualName::new(None, ns!(), name.into()),
                    value: "".into(),
                })
                .collect(),
        }
    }

    #[test]
    fn svg_names_get_their_case_back() {
        let mut t = tag(StartTag, "foreignobject", &[]);
        fix_svg_element_name(&mut t);
        assert_eq!(&*t.name, "foreignObject");

        let mut t = tag(StartTag, "rect", &[]);
        fix_svg_element_name(&mut t);
        assert_eq!(&*t.name, "rect");
    }

    #[test]
    fn namespaced_attributes() {
        let href = namespaced_attribute("xlink:href").expect("xlink:href");
        assert_eq!(href.ns, ns!(xlink));
        assert_eq!(href.prefix, Some(namespace_prefix!("xlink")));
        assert_eq!(&*href.local, "href");

        let xmlns = namespaced_attribute("xmlns").expect("xmlns");
        assert_eq!(xmlns.ns, ns!(xmlns));
        assert_eq!(xmlns.prefix, None);

        let xmlns_xlink = namespaced_attribute("xmlns:xlink").expect("xmlns:xlink");
        assert_eq!(xmlns_xlink.prefix, Some(namespace_prefix!("xmlns")));

        assert!(namespaced_attribute("xlink:foo").is_none());
        assert!(namespaced_attribute("xml:base").is_none());
        assert!(namespaced_attribute("href").is_none());
    }

    #[test]
    fn font_only_leaves_with_presentation_attributes() {
        assert!(!leaves_foreign_content(&tag(StartTag, "font", &["id"])));
        assert!(leaves_foreign_content(&tag(StartTag, "font", &["color"])));
        assert!(leaves_foreign_content(&tag(StartTag, "div", &[])));
        assert!(leaves_foreign_content(&tag(EndTag, "p", &[])));
        assert!(!leaves_foreign_content(&tag(EndTag, "div", &[])));
        assert!(!leaves_foreign_content(&tag(StartTag, "rect", &[])));
    }
}
