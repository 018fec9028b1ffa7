// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::Deserialize;

static NAMESPACES: &[(&str, &str)] = &[
    ("", ""),
    ("*", "*"),
    ("html", "http://www.w3.org/1999/xhtml"),
    ("xml", "http://www.w3.org/XML/1998/namespace"),
    ("xmlns", "http://www.w3.org/2000/xmlns/"),
    ("xlink", "http://www.w3.org/1999/xlink"),
    ("svg", "http://www.w3.org/2000/svg"),
    ("mathml", "http://www.w3.org/1998/Math/MathML"),
];

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let out_dir = env::var("OUT_DIR").unwrap();
    let data_dir = Path::new(&manifest_dir).join("data");

    println!("cargo:rerun-if-changed=data/local_names.txt");
    println!("cargo:rerun-if-changed=data/entities.json");

    write_atoms(&data_dir, Path::new(&out_dir));
    write_named_entities(&data_dir, Path::new(&out_dir));
}

fn write_atoms(data_dir: &Path, out_dir: &Path) {
    let generated = out_dir.join("generated.rs");
    let mut generated = BufWriter::new(File::create(generated).unwrap());

    let local_names = data_dir.join("local_names.txt");
    let mut local_names_atom = string_cache_codegen::AtomType::new("LocalName", "local_name!");
    for line in BufReader::new(File::open(local_names).unwrap()).lines() {
        let local_name = line.unwrap();
        if local_name.is_empty() {
            continue;
        }
        local_names_atom.atom(&local_name);
        local_names_atom.atom(&local_name.to_ascii_lowercase());
    }
    local_names_atom
        .with_macro_doc("Takes a local name as a string and returns its key in the string cache.")
        .write_to(&mut generated)
        .unwrap();

    string_cache_codegen::AtomType::new("Prefix", "namespace_prefix!")
        .with_macro_doc("Takes a namespace prefix string and returns its key in a string cache.")
        .atoms(NAMESPACES.iter().map(|&(prefix, _url)| prefix))
        .write_to(&mut generated)
        .unwrap();

    string_cache_codegen::AtomType::new("Namespace", "namespace_url!")
        .with_macro_doc("Takes a namespace url string and returns its key in a string cache.")
        .atoms(NAMESPACES.iter().map(|&(_prefix, url)| url))
        .write_to(&mut generated)
        .unwrap();

    // No `$crate::` path here: included macro_export macros can't be named
    // by path from within this crate.
    writeln!(
        generated,
        r#"
        /// Maps the input of [`namespace_prefix!`](macro.namespace_prefix.html) to
        /// the output of [`namespace_url!`](macro.namespace_url.html).
        ///
        #[macro_export] macro_rules! ns {{
        "#
    )
    .unwrap();
    for &(prefix, url) in NAMESPACES {
        writeln!(generated, "({prefix}) => {{ namespace_url!({url:?}) }};").unwrap();
    }
    writeln!(generated, "}}").unwrap();
}

// A struct matching the entries in entities.json.
#[derive(Deserialize)]
struct CharRef {
    codepoints: Vec<u32>,
    // `characters` is present in the file but we don't need it.
}

fn write_named_entities(data_dir: &Path, out_dir: &Path) {
    let json_file = File::open(data_dir.join("entities.json")).expect("can't open JSON file");
    let entities: BTreeMap<String, CharRef> =
        serde_json::from_reader(BufReader::new(json_file)).expect("can't parse JSON file");

    // Map every entity name to its characters.
    let mut map: HashMap<String, (u32, u32)> = HashMap::new();
    for (name, char_ref) in entities.into_iter() {
        let codepoints = char_ref.codepoints;
        assert!(!codepoints.is_empty() && codepoints.len() <= 2);
        let pair = (codepoints[0], codepoints.get(1).cloned().unwrap_or(0));

        // Slice off the initial '&'
        assert!(name.starts_with('&'));
        map.insert(name[1..].to_string(), pair);
    }

    // Add every missing prefix of those keys, mapping to NULL characters.
    map.insert(String::new(), (0, 0));
    let keys: Vec<String> = map.keys().cloned().collect();
    for key in keys.into_iter() {
        for n in 1..key.len() {
            let prefix = key[..n].to_string();
            map.entry(prefix).or_insert((0, 0));
        }
    }

    let mut phf_map = phf_codegen::Map::new();
    for (key, value) in map.iter() {
        phf_map.entry(&**key, &format!("{value:?}"));
    }

    let path = out_dir.join("named_entities.rs");
    let mut file = BufWriter::new(File::create(path).unwrap());
    writeln!(
        file,
        "/// A map of entity names to their codepoints. The second codepoint will\n\
         /// be 0 if the entity contains a single codepoint. Entities have their\n\
         /// preceding '&' removed. Every proper prefix of a name is also a key,\n\
         /// mapped to `(0, 0)`."
    )
    .unwrap();
    write!(
        file,
        "pub static NAMED_ENTITIES: phf::Map<&'static str, (u32, u32)> = {}",
        phf_map.build()
    )
    .unwrap();
    writeln!(file, ";").unwrap();
}
