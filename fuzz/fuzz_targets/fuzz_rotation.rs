// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell
#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::io;
use tagshift::prelude::*;
use tagshift::repository::MemoryRepository;
use tracing::Span;

struct NoHooks;

impl HookRunner for NoHooks {
    fn exec(&mut self, _command: &str) -> io::Result<Option<i32>> {
        Ok(Some(0))
    }
}

#[derive(Debug, Arbitrary)]
struct Input {
    depth: u8,
    versions: u8,
    moves: Vec<u8>,
}

// Any sequence of moves keeps every pointer on at most one version
fuzz_target!(|input: Input| {
    let depth = usize::from(input.depth % 6);
    let count = usize::from(input.versions % 8) + 1;
    let tag = SimpleTag::new("prod", depth);
    let mut repo = MemoryRepository::new(
        (0..count).map(|i| Version::new(&format!("v{i}"), &[])).collect(),
    );
    let filter = std::iter::once(tag.name.clone())
        .chain(tag.history_tags.iter().cloned())
        .collect();
    let mut rotator = TagRotator::new(&mut repo, NoHooks, filter, Span::none());

    for pick in input.moves.iter().take(64) {
        let id = format!("v{}", usize::from(*pick) % count);
        let target = rotator.repo().get(&id).cloned().unwrap();
        rotator.run(&tag, &target).unwrap();
    }
    drop(rotator);

    for name in std::iter::once(&tag.name).chain(&tag.history_tags) {
        assert!(repo.versions().iter().filter(|v| v.carries(name)).count() <= 1);
    }
});
