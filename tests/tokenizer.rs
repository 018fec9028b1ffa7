// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runs the html5lib-format tokenizer fixtures under `data/test/tokenizer`.
//!
//! Every input is tokenized once per way of cutting it into at most three
//! chunks, with and without exact errors, and in each initial state the
//! case lists.

extern crate rustc_test as test;
#[macro_use]
extern crate html5tree;

mod foreach_html5lib_test;
use foreach_html5lib_test::foreach_html5lib_test;

use serde_json::Value;
use std::ffi::OsStr;
use std::path::Path;
use std::{char, env};
use test::{DynTestName, TestDesc, TestDescAndFn, TestFn};

use html5tree::tendril::{SliceExt, StrTendril};
use html5tree::tokenizer::{CharacterTokens, CommentToken, DoctypeToken, TagToken, Token};
use html5tree::tokenizer::{ContentModel, Doctype, EndTag, StartTag, Tag};
use html5tree::tokenizer::{EOFToken, NullCharacterToken, ParseError};
use html5tree::tokenizer::{Tokenizer, TokenizerOpts};
use html5tree::{Attribute, LocalName, QualName};

/// Every way to cut `s` into one, two or three pieces, empty pieces
/// included.
fn chunkings(s: &str) -> Vec<Vec<StrTendril>> {
    let mut cuts: Vec<usize> = s.char_indices().map(|(i, _)| i).collect();
    cuts.push(s.len());

    let mut out = vec![vec![s.to_tendril()]];
    for (n, &a) in cuts.iter().enumerate() {
        out.push(vec![s[..a].to_tendril(), s[a..].to_tendril()]);
        for &b in &cuts[n..] {
            out.push(vec![
                s[..a].to_tendril(),
                s[a..b].to_tendril(),
                s[b..].to_tendril(),
            ]);
        }
    }
    out
}

/// Bring a token stream into the shape the fixtures use: one run of
/// characters between other tokens, no errors or EOF, sorted attributes
/// on start tags and bare end tags.
fn normalize<I: IntoIterator<Item = Token>>(tokens: I) -> Vec<Token> {
    let mut out = vec![];
    let mut chars = StrTendril::new();
    for token in tokens {
        let token = match token {
            CharacterTokens(text) => {
                chars.push_tendril(&text);
                continue;
            },
            NullCharacterToken => {
                chars.push_char('\0');
                continue;
            },
            ParseError(_) | EOFToken => continue,
            TagToken(mut tag) => {
                if tag.kind == EndTag {
                    tag.self_closing = false;
                    tag.attrs.clear();
                } else {
                    tag.attrs.sort_by(|a, b| a.name.cmp(&b.name));
                }
                TagToken(tag)
            },
            other => other,
        };
        if chars.len32() > 0 {
            out.push(CharacterTokens(std::mem::take(&mut chars)));
        }
        out.push(token);
    }
    if chars.len32() > 0 {
        out.push(CharacterTokens(chars));
    }
    out
}

fn run(chunks: Vec<StrTendril>, opts: TokenizerOpts) -> Vec<Token> {
    let mut tok = Tokenizer::new(opts);
    let mut tokens = vec![];
    for chunk in chunks {
        tok.feed(chunk);
        tokens.extend(std::iter::from_fn(|| tok.next_token()));
    }
    tok.end();
    loop {
        match tok.next_token() {
            Some(EOFToken) => break,
            Some(token) => tokens.push(token),
            None => panic!("tokenizer asked for more input after end()"),
        }
    }
    normalize(tokens)
}

fn string(js: &Value) -> StrTendril {
    js.as_str()
        .unwrap_or_else(|| panic!("expected a string, got {js}"))
        .to_tendril()
}

fn nullable(js: &Value) -> Option<StrTendril> {
    if js.is_null() {
        None
    } else {
        Some(string(js))
    }
}

fn token_from_json(js: &Value) -> Option<Token> {
    if js.as_str() == Some("ParseError") {
        return None;
    }
    let parts = js.as_array().expect("a token is an array");
    let arg = |i: usize| &parts[i];
    let token = match parts[0].as_str() {
        Some("Character") => CharacterTokens(string(arg(1))),
        Some("Comment") => CommentToken(string(arg(1))),
        Some("StartTag") => TagToken(Tag {
            kind: StartTag,
            name: LocalName::from(&*string(arg(1))),
            attrs: arg(2)
                .as_object()
                .expect("attributes are an object")
                .iter()
                .map(|(name, value)| Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(&**name)),
                    value: string(value),
                })
                .collect(),
            self_closing: parts.get(3).and_then(Value::as_bool).unwrap_or(false),
        }),
        Some("EndTag") => TagToken(Tag {
            kind: EndTag,
            name: LocalName::from(&*string(arg(1))),
            attrs: vec![],
            self_closing: false,
        }),
        Some("DOCTYPE") => DoctypeToken(Doctype {
            name: nullable(arg(1)),
            public_id: nullable(arg(2)),
            system_id: nullable(arg(3)),
            // The fixtures record "correctness", the opposite of quirks.
            force_quirks: !arg(4).as_bool().expect("correctness flag"),
        }),
        _ => panic!("unknown token {js}"),
    };
    Some(token)
}

/// Undo the `\uXXXX` escaping of "doubleEscaped" cases. `None` if the
/// text holds a lone surrogate, which UTF-8 input cannot carry.
fn unescape(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(at) = rest.find("\\u") {
        out.push_str(&rest[..at]);
        let hex = rest.get(at + 2..at + 6).expect("four hex digits");
        let code = u32::from_str_radix(hex, 16).expect("hex escape");
        out.push(char::from_u32(code)?);
        rest = &rest[at + 6..];
    }
    out.push_str(rest);
    Some(out)
}

fn unescape_json(js: &Value) -> Value {
    match js {
        Value::String(s) => Value::String(unescape(s).expect("lone surrogate in output")),
        Value::Array(items) => Value::Array(items.iter().map(unescape_json).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), unescape_json(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn content_model(name: &str) -> ContentModel {
    match name {
        "Data state" => ContentModel::Data,
        "PLAINTEXT state" => ContentModel::Plaintext,
        "RAWTEXT state" => ContentModel::Rawtext,
        "RCDATA state" => ContentModel::Rcdata,
        "Script data state" => ContentModel::ScriptData,
        other => panic!("no content model for {other}"),
    }
}

fn add_cases(tests: &mut Vec<TestDescAndFn>, file: &str, case: &Value) {
    let description = case["description"].as_str().unwrap_or("(no description)");
    let mut input = case["input"].as_str().expect("input").to_string();
    let mut output = case["output"].clone();

    if case["doubleEscaped"].as_bool() == Some(true) {
        match unescape(&input) {
            Some(unescaped) => input = unescaped,
            None => return,
        }
        output = unescape_json(&output);
    }

    let last_start_tag = case["lastStartTag"].as_str().map(str::to_string);
    let models: Vec<Option<ContentModel>> = match case["initialStates"].as_array() {
        Some(names) => names
            .iter()
            .map(|name| Some(content_model(name.as_str().expect("state name"))))
            .collect(),
        None => vec![None],
    };

    for model in models {
        for exact_errors in [false, true] {
            let mut name = format!("tok: {file}: {description}");
            if let Some(model) = model {
                name.push_str(&format!(" ({model:?})"));
            }
            if exact_errors {
                name.push_str(" (exact errors)");
            }

            let opts = TokenizerOpts {
                exact_errors,
                initial_state: model,
                last_start_tag_name: last_start_tag.clone(),
                // The fixtures keep a leading BOM.
                discard_bom: false,
            };
            let input = input.clone();
            let output = output.clone();
            tests.push(TestDescAndFn {
                desc: TestDesc::new(DynTestName(name)),
                testfn: TestFn::dyn_test_fn(move || {
                    let expected = normalize(
                        output
                            .as_array()
                            .expect("output is an array")
                            .iter()
                            .filter_map(token_from_json),
                    );
                    for chunks in chunkings(&input) {
                        let got = run(chunks.clone(), opts.clone());
                        if got != expected {
                            panic!("\ninput: {chunks:?}\ngot: {got:?}\nexpected: {expected:?}");
                        }
                    }
                }),
            });
        }
    }
}

fn tests(src_dir: &Path) -> Vec<TestDescAndFn> {
    let mut tests = vec![];
    foreach_html5lib_test(src_dir, "tokenizer", OsStr::new("test"), |path, file| {
        let js: Value = serde_json::from_reader(file).expect("json parse error");
        let file_name = path.file_name().and_then(OsStr::to_str).unwrap_or("?");
        for case in js["tests"].as_array().into_iter().flatten() {
            add_cases(&mut tests, file_name, case);
        }
    });
    tests
}

fn main() {
    let args: Vec<_> = env::args().collect();
    test::test_main(&args, tests(Path::new(env!("CARGO_MANIFEST_DIR"))));
}
