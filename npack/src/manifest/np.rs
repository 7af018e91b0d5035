//! The legacy line-oriented package notation.
//!
//! A `.np` document is a flat list of `Key: value` lines describing one
//! package:
//!
//! ```text
//! Name:	nunit
//! Version:	2.5.5.10112
//! Master-Sites:	http://launchpad.net/nunitv2/2.5/2.5.5/+download/
//!
//! Library: nunit.framework.dll
//!     Binary: NUnit-2.5.5.10112.zip#bin/net-2.0/nunit.framework.dll
//! ```
//!
//! Hyphens are stripped from keys before matching (`Master-Sites` is the
//! same field as `MasterSites`). A `Library:` line opens a nested block;
//! lines indented deeper than it fill in that library's fields, and the
//! block closes when indentation falls back. Unknown keys and lines
//! without a colon are skipped.
//!
//! Field mapping is an explicit table per record type rather than any kind
//! of name-driven reflection, so the accepted vocabulary is visible in one
//! place.

use std::io::{self, BufRead};

use crate::package::{Library, Package};

type Setter<T> = fn(&mut T, &str);

const PACKAGE_FIELDS: &[(&str, Setter<Package>)] = &[
    ("Name", |package, value| package.name = value.to_string()),
    ("Version", |package, value| {
        package.version = value.to_string()
    }),
    ("Description", |package, value| {
        package.description = value.to_string()
    }),
    ("Author", |package, value| {
        package.author = value.to_string()
    }),
    ("Maintainer", |package, value| {
        package.maintainer = value.to_string()
    }),
    ("MasterSites", |package, value| {
        package.master_sites.push(value.to_string())
    }),
    ("Requires", |package, value| {
        package.requires.push(value.to_string())
    }),
];

const LIBRARY_FIELDS: &[(&str, Setter<Library>)] = &[("Binary", |library, value| {
    library.binary = value.to_string()
})];

/// A `Library:` block whose indented fields are still being collected.
struct OpenLibrary {
    filename: String,
    library: Library,
    nesting: usize,
}

/// Parse a line-oriented package document.
///
/// The parser is lenient by design: blank lines, unknown keys, and lines
/// without a `key: value` shape are ignored. Only I/O failures are errors.
pub(crate) fn parse_package<R: BufRead>(reader: R) -> io::Result<Package> {
    let mut package = Package::default();
    let mut open: Option<OpenLibrary> = None;

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some((raw_key, raw_value)) = trimmed.split_once(':') else {
            continue;
        };

        let nesting = indentation(&line);
        let key = raw_key.replace('-', "");
        let value = raw_value.trim();

        if let Some(block) = &open {
            if nesting < block.nesting {
                close_library(&mut package, &mut open);
            }
        }

        if let Some(block) = &mut open {
            apply_field(LIBRARY_FIELDS, &mut block.library, &key, value);
        } else if key.eq_ignore_ascii_case("Library") {
            open = Some(OpenLibrary {
                filename: value.to_string(),
                library: Library::default(),
                nesting: nesting + 1,
            });
        } else {
            apply_field(PACKAGE_FIELDS, &mut package, &key, value);
        }
    }

    close_library(&mut package, &mut open);
    Ok(package)
}

fn close_library(package: &mut Package, open: &mut Option<OpenLibrary>) {
    if let Some(block) = open.take() {
        package.libraries.insert(block.filename, block.library);
    }
}

fn apply_field<T>(table: &[(&str, Setter<T>)], target: &mut T, key: &str, value: &str) {
    if let Some((_, setter)) = table.iter().find(|(name, _)| name.eq_ignore_ascii_case(key)) {
        setter(target, value);
    }
}

fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}
