// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Rotation tests against an in-memory store
//!
//! These tests verify the tag rotation invariants:
//! 1. Moving a tag onto its current version writes nothing
//! 2. History chains keep exactly the last N positions, newest first
//! 3. Rollbacks move only the primary tag
//! 4. Group tags rotate members in order and stop at the first failure

use proptest::prelude::*;
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use tagshift::prelude::*;
use tagshift::repository::MemoryRepository;
use tagshift::types::TagRecord;
use tracing::Span;

// =============================================================================
// Test Helpers
// =============================================================================

/// Hook runner that records commands into a shared event log
struct RecordingHooks {
    events: Rc<RefCell<Vec<String>>>,
    failing: Option<String>,
}

impl RecordingHooks {
    fn new(events: Rc<RefCell<Vec<String>>>) -> Self {
        Self { events, failing: None }
    }
}

impl HookRunner for RecordingHooks {
    fn exec(&mut self, command: &str) -> io::Result<Option<i32>> {
        self.events.borrow_mut().push(format!("hook {command}"));
        let failed = self.failing.as_deref().is_some_and(|f| command.contains(f));
        Ok(Some(i32::from(failed)))
    }
}

fn record(name: &str) -> TagRecord {
    TagRecord { name: name.into(), ..TagRecord::default() }
}

fn simple(name: &str, history: usize) -> TagEntry {
    TagEntry::Record(TagRecord { history: Some(history), ..record(name) })
}

fn build(entries: &[TagEntry]) -> TagCatalog {
    TagCatalog::build(Some(entries)).unwrap()
}

fn fresh_versions(count: usize) -> MemoryRepository {
    MemoryRepository::new((0..count).map(|i| Version::new(&format!("v{i}"), &[])).collect())
}

fn rotate(
    catalog: &TagCatalog,
    repo: &mut MemoryRepository,
    hooks: RecordingHooks,
    tag: &str,
    version: &str,
) -> TagResult<Vec<RotationOutcome>> {
    let target = repo.get(version).cloned().unwrap();
    let tag = catalog.lookup(tag)?;
    let mut rotator = TagRotator::for_catalog(catalog, repo, hooks, Span::none());
    GroupExpander::new(catalog).rotate_tag(tag, &target, &mut rotator)
}

fn quiet_hooks() -> RecordingHooks {
    RecordingHooks::new(Rc::new(RefCell::new(Vec::new())))
}

fn writes(repo: &MemoryRepository) -> Vec<(&str, &str)> {
    repo.writes().iter().map(|(v, t)| (v.as_str(), t.as_str())).collect()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_scenarios_a_b_c() {
    let catalog = build(&["prod".into()]);
    let mut repo = MemoryRepository::new(vec![
        Version::new("V1", &["prod"]),
        Version::new("V2", &[]),
        Version::new("V3", &[]),
    ]);

    // A: first move seeds prod-1
    rotate(&catalog, &mut repo, quiet_hooks(), "prod", "V2").unwrap();
    assert_eq!(writes(&repo), vec![("V2", "prod"), ("V1", "prod-1")]);
    assert_eq!(repo.tags_of("V2"), vec!["prod"]);
    assert_eq!(repo.tags_of("V1"), vec!["prod-1"]);

    // B: second move cascades the chain
    repo.clear_log();
    rotate(&catalog, &mut repo, quiet_hooks(), "prod", "V3").unwrap();
    assert_eq!(writes(&repo), vec![("V3", "prod"), ("V2", "prod-1"), ("V1", "prod-2")]);
    assert_eq!(repo.tags_of("V3"), vec!["prod"]);
    assert_eq!(repo.tags_of("V2"), vec!["prod-1"]);
    assert_eq!(repo.tags_of("V1"), vec!["prod-2"]);

    // C: moving back into the history window is a rollback
    repo.clear_log();
    let outcomes = rotate(&catalog, &mut repo, quiet_hooks(), "prod", "V1").unwrap();
    assert_eq!(writes(&repo), vec![("V1", "prod")]);
    match &outcomes[0] {
        RotationOutcome::Moved(result) => assert!(result.is_rollback),
        RotationOutcome::SameVersion { .. } => panic!("expected a move"),
    }
}

#[test]
fn test_same_version_writes_nothing() {
    let catalog = build(&["prod".into()]);
    let mut repo = MemoryRepository::new(vec![Version::new("V1", &["prod", "$latest"])]);

    let outcomes = rotate(&catalog, &mut repo, quiet_hooks(), "prod", "V1").unwrap();

    assert!(!outcomes[0].moved());
    assert!(repo.writes().is_empty());
    assert_eq!(repo.list_count(), 1);
}

#[test]
fn test_repeat_rotation_is_idempotent() {
    let catalog = build(&["prod".into()]);
    let mut repo = MemoryRepository::new(vec![
        Version::new("V1", &["prod"]),
        Version::new("V2", &["$latest"]),
    ]);

    rotate(&catalog, &mut repo, quiet_hooks(), "prod", "V2").unwrap();
    let after_first: Vec<Vec<String>> = ["V1", "V2"].iter().map(|id| repo.tags_of(id)).collect();
    repo.clear_log();

    let outcomes = rotate(&catalog, &mut repo, quiet_hooks(), "prod", "V2").unwrap();
    let after_second: Vec<Vec<String>> = ["V1", "V2"].iter().map(|id| repo.tags_of(id)).collect();

    assert!(!outcomes[0].moved());
    assert!(repo.writes().is_empty());
    assert_eq!(after_first, after_second);
}

#[test]
fn test_pre_hook_skipped_for_untagged_target() {
    let entries = vec![TagEntry::Record(TagRecord {
        pre_move_command: Some("promote {newVersionTag}".into()),
        ..record("prod")
    })];
    let catalog = build(&entries);
    let mut repo = fresh_versions(2);
    let events = Rc::new(RefCell::new(Vec::new()));

    rotate(&catalog, &mut repo, RecordingHooks::new(events.clone()), "prod", "v0").unwrap();
    rotate(&catalog, &mut repo, RecordingHooks::new(events.clone()), "prod", "v1").unwrap();

    assert!(events.borrow().is_empty());
    assert_eq!(repo.tags_of("v1"), vec!["prod"]);
    assert_eq!(repo.tags_of("v0"), vec!["prod-1"]);
}

#[test]
fn test_pre_hook_uses_target_tag() {
    let entries = vec![
        TagEntry::Record(TagRecord {
            pre_move_command: Some("promote {oldVersionTag} {newVersionTag}".into()),
            ..record("prod")
        }),
        "stage".into(),
    ];
    let catalog = build(&entries);
    let mut repo = MemoryRepository::new(vec![
        Version::new("V1", &["prod"]),
        Version::new("V2", &["stage"]),
    ]);
    let events = Rc::new(RefCell::new(Vec::new()));

    rotate(&catalog, &mut repo, RecordingHooks::new(events.clone()), "prod", "V2").unwrap();

    assert_eq!(*events.borrow(), vec!["hook promote prod stage"]);
    assert_eq!(repo.tags_of("V2"), vec!["prod", "stage"]);
}

// =============================================================================
// Group Tags
// =============================================================================

fn group_catalog() -> TagCatalog {
    let entries = vec![
        TagEntry::Record(TagRecord {
            pre_move_command: Some("check {oldVersionTag}".into()),
            ..record("prod")
        }),
        TagEntry::Record(TagRecord {
            pre_move_command: Some("check {oldVersionTag}".into()),
            ..record("staging")
        }),
        TagEntry::Record(TagRecord {
            members: Some(vec!["prod".into(), "staging".into()]),
            ..record("release")
        }),
    ];
    build(&entries)
}

#[test]
fn test_group_rotates_members_in_order() {
    let catalog = group_catalog();
    let mut repo = MemoryRepository::new(vec![
        Version::new("V4", &["prod", "staging"]),
        Version::new("V5", &["$latest"]),
    ]);
    let events = Rc::new(RefCell::new(Vec::new()));

    let outcomes =
        rotate(&catalog, &mut repo, RecordingHooks::new(events.clone()), "release", "V5").unwrap();

    let tags: Vec<&str> = outcomes.iter().map(RotationOutcome::tag).collect();
    assert_eq!(tags, vec!["prod", "staging"]);
    assert_eq!(*events.borrow(), vec!["hook check prod", "hook check staging"]);
    assert_eq!(
        writes(&repo),
        vec![("V5", "prod"), ("V4", "prod-1"), ("V5", "staging"), ("V4", "staging-1")]
    );
    assert_eq!(repo.tags_of("V5"), vec!["$latest", "prod", "staging"]);
    assert_eq!(repo.tags_of("V4"), vec!["prod-1", "staging-1"]);
}

#[test]
fn test_group_stops_at_first_failure() {
    let catalog = group_catalog();
    let mut repo = MemoryRepository::new(vec![
        Version::new("V4", &["prod", "staging"]),
        Version::new("V5", &["$latest"]),
    ]);
    let events = Rc::new(RefCell::new(Vec::new()));
    let hooks = RecordingHooks { events: events.clone(), failing: Some("prod".into()) };

    let err = rotate(&catalog, &mut repo, hooks, "release", "V5").unwrap_err();

    assert!(matches!(err, TagError::HookFailure { status: Some(1), .. }));
    assert_eq!(*events.borrow(), vec!["hook check prod"]);
    assert!(repo.writes().is_empty());
    assert_eq!(repo.tags_of("V4"), vec!["prod", "staging"]);
}

#[test]
fn test_group_failure_keeps_completed_members() {
    let catalog = group_catalog();
    let mut repo = MemoryRepository::new(vec![
        Version::new("V4", &["prod", "staging"]),
        Version::new("V5", &["$latest"]),
    ]);
    let events = Rc::new(RefCell::new(Vec::new()));
    let hooks = RecordingHooks { events, failing: Some("staging".into()) };

    rotate(&catalog, &mut repo, hooks, "release", "V5").unwrap_err();

    // No compensation: prod stays moved
    assert_eq!(repo.tags_of("V5"), vec!["$latest", "prod"]);
    assert_eq!(repo.tags_of("V4"), vec!["prod-1", "staging"]);
}

#[test]
fn test_group_with_unknown_member_fails_before_writes() {
    let entries = vec![
        "prod".into(),
        TagEntry::Record(TagRecord {
            members: Some(vec!["prod".into(), "ghost".into()]),
            ..record("release")
        }),
    ];
    let catalog = build(&entries);
    let mut repo = MemoryRepository::new(vec![
        Version::new("V1", &["prod"]),
        Version::new("V2", &["$latest"]),
    ]);

    let err = rotate(&catalog, &mut repo, quiet_hooks(), "release", "V2").unwrap_err();

    assert!(matches!(err, TagError::NotFound(_)));
    assert!(repo.writes().is_empty());
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn history_chain_keeps_last_positions(depth in 0usize..5, moves in 1usize..9) {
        let catalog = build(&[simple("prod", depth)]);
        let mut repo = fresh_versions(moves);

        for i in 0..moves {
            rotate(&catalog, &mut repo, quiet_hooks(), "prod", &format!("v{i}")).unwrap();
        }

        let newest = moves - 1;
        for i in 0..moves {
            let back = newest - i;
            let expected: Vec<String> = match back {
                0 => vec!["prod".to_string()],
                k if k <= depth => vec![format!("prod-{k}")],
                _ => Vec::new(),
            };
            prop_assert_eq!(repo.tags_of(&format!("v{i}")), expected);
        }
    }

    #[test]
    fn rollback_moves_only_primary(depth in 1usize..5, moves in 2usize..9, pick in 1usize..5) {
        prop_assume!(pick <= depth && pick < moves);

        let catalog = build(&[simple("prod", depth)]);
        let mut repo = fresh_versions(moves);
        for i in 0..moves {
            rotate(&catalog, &mut repo, quiet_hooks(), "prod", &format!("v{i}")).unwrap();
        }
        repo.clear_log();

        let target = format!("v{}", moves - 1 - pick);
        let outcomes = rotate(&catalog, &mut repo, quiet_hooks(), "prod", &target).unwrap();

        prop_assert_eq!(writes(&repo), vec![(target.as_str(), "prod")]);
        let is_rollback = matches!(&outcomes[0], RotationOutcome::Moved(r) if r.is_rollback);
        prop_assert!(is_rollback);
    }
}
