// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use tagshift::catalog::TagCatalog;
use tagshift::types::{Tag, TagEntry};

fuzz_target!(|data: &[u8]| {
    let Ok(entries) = serde_json::from_slice::<Vec<TagEntry>>(data) else {
        return;
    };
    let Ok(catalog) = TagCatalog::build(Some(entries.as_slice())) else {
        return;
    };

    let names = catalog.filtering_names();
    for tag in catalog.iter() {
        assert!(catalog.lookup(tag.name()).is_ok());
        if let Tag::Simple(simple) = tag {
            assert!(names.contains(&simple.name));
            assert!(simple.history_tags.iter().all(|h| names.contains(h)));
        }
    }
});
