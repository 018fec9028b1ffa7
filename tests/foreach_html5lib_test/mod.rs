// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Fixture files with extension `ext` in `data/test/<subdir>`, sorted so
/// test names are stable.
fn fixtures(src_dir: &Path, subdir: &str, ext: &OsStr) -> Vec<PathBuf> {
    let dir = src_dir.join("data").join("test").join(subdir);
    let entries = fs::read_dir(&dir).unwrap_or_else(|err| panic!("reading {}: {err}", dir.display()));
    let mut found: Vec<PathBuf> = entries
        .map(|entry| entry.expect("directory entry").path())
        .filter(|path| path.extension() == Some(ext))
        .collect();
    found.sort();
    found
}

/// Hand every fixture file to `visit`.
pub fn foreach_html5lib_test<F>(src_dir: &Path, subdir: &'static str, ext: &'static OsStr, mut visit: F)
where
    F: FnMut(&Path, File),
{
    for path in fixtures(src_dir, subdir, ext) {
        let file = File::open(&path).unwrap_or_else(|err| panic!("opening {}: {err}", path.display()));
        visit(&path, file);
    }
}
