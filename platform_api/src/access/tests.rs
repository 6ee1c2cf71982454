use super::*;
use anyhow::anyhow;
use pretty_assertions::assert_eq;
use std::cell::{Cell, RefCell};

fn names(registrations: &[RegistrationRecord]) -> Vec<&str> {
    registrations
        .iter()
        .map(|registration| registration.name.as_str())
        .collect()
}

#[test]
/// One hundred registrations sharing a single group set only need one permission check.
fn authorizes_once_per_shared_group_set() {
    let registrations: Vec<RegistrationRecord> = (0..100)
        .map(|i| {
            RegistrationRecord::new(
                &format!("app-{i}"),
                &["group-a", "group-b", "group-c"],
                &format!("git@github.com:org/app-{i}.git"),
            )
        })
        .collect();

    let calls = Cell::new(0);
    let authorizer = |_: &RegistrationRecord| -> anyhow::Result<bool> {
        calls.set(calls.get() + 1);
        Ok(true)
    };

    let (retained, report) = filter_with_report(registrations, None, &authorizer);

    assert_eq!(calls.get(), 1);
    assert_eq!(retained.len(), 100);
    assert_eq!(
        report,
        FilterReport {
            considered: 100,
            authorization_calls: 1,
            failed_checks: 0,
            retained: 100,
        }
    );
}

#[test]
/// Group order and duplicate ids do not create new cache entries.
fn group_sets_compare_independent_of_order() {
    let registrations = vec![
        RegistrationRecord::new("one", &["b", "a"], "git@host:one.git"),
        RegistrationRecord::new("two", &["a", "b"], "git@host:two.git"),
        RegistrationRecord::new("three", &["a", "b", "a"], "git@host:three.git"),
        RegistrationRecord::new("four", &["c"], "git@host:four.git"),
    ];

    let seen = RefCell::new(vec![]);
    let authorizer = |registration: &RegistrationRecord| -> anyhow::Result<bool> {
        seen.borrow_mut().push(registration.name.clone());
        Ok(registration.access_groups.contains(&"a".to_string()))
    };

    let retained = filter(registrations, None, &authorizer);

    assert_eq!(names(&retained), vec!["one", "two", "three"]);
    assert_eq!(*seen.borrow(), vec!["one".to_string(), "four".to_string()]);
}

#[test]
/// Registrations without any access groups share their own cache entry.
fn empty_group_set_is_its_own_key() {
    let registrations = vec![
        RegistrationRecord::new("open-1", &[], "git@host:open-1.git"),
        RegistrationRecord::new("closed", &["admins"], "git@host:closed.git"),
        RegistrationRecord::new("open-2", &[], "git@host:open-2.git"),
    ];

    let calls = Cell::new(0);
    let authorizer = |registration: &RegistrationRecord| -> anyhow::Result<bool> {
        calls.set(calls.get() + 1);
        Ok(registration.access_groups.is_empty())
    };

    let retained = filter(registrations, None, &authorizer);

    assert_eq!(calls.get(), 2);
    assert_eq!(names(&retained), vec!["open-1", "open-2"]);
}

#[test]
/// A failing permission check denies that group set but never fails the listing.
fn authorizer_errors_are_treated_as_denied() {
    let registrations = vec![
        RegistrationRecord::new("first", &["flaky"], "git@host:first.git"),
        RegistrationRecord::new("second", &["stable"], "git@host:second.git"),
        RegistrationRecord::new("third", &["flaky"], "git@host:third.git"),
    ];

    let calls = Cell::new(0);
    let authorizer = |registration: &RegistrationRecord| -> anyhow::Result<bool> {
        calls.set(calls.get() + 1);
        if registration.access_groups == vec!["flaky".to_string()] {
            return Err(anyhow!("permission service unavailable"));
        }
        Ok(true)
    };

    let (retained, report) = filter_with_report(registrations, None, &authorizer);

    assert_eq!(names(&retained), vec!["second"]);
    assert_eq!(calls.get(), 2);
    assert_eq!(report.failed_checks, 1);
    assert_eq!(report.retained, 1);
}

#[test]
/// The repository filter is applied before any permission check and ignores case.
fn repository_filter_runs_first() {
    let registrations = vec![
        RegistrationRecord::new("match", &["a"], "git@github.com:Org/Repo.git"),
        RegistrationRecord::new("other", &["b"], "git@github.com:org/other.git"),
        RegistrationRecord::new("prefix", &["c"], "git@github.com:org/repo.git.bak"),
    ];

    let calls = Cell::new(0);
    let authorizer = |_: &RegistrationRecord| -> anyhow::Result<bool> {
        calls.set(calls.get() + 1);
        Ok(true)
    };

    let (retained, report) = filter_with_report(
        registrations,
        Some("git@github.com:org/repo.git"),
        &authorizer,
    );

    assert_eq!(names(&retained), vec!["match"]);
    assert_eq!(calls.get(), 1);
    assert_eq!(report.considered, 1);
}

#[test]
fn empty_input_returns_nothing() {
    let authorizer = |_: &RegistrationRecord| -> anyhow::Result<bool> {
        panic!("authorizer should not be called for empty input")
    };

    let (retained, report) = filter_with_report(vec![], None, &authorizer);

    assert!(retained.is_empty());
    assert_eq!(report, FilterReport::default());
}

#[test]
/// Group ids containing the separator a joined string key would use do not collide.
fn group_ids_with_commas_do_not_collide() {
    let registrations = vec![
        RegistrationRecord::new("joined", &["a,b"], "git@host:joined.git"),
        RegistrationRecord::new("split", &["a", "b"], "git@host:split.git"),
    ];

    let calls = Cell::new(0);
    let authorizer = |registration: &RegistrationRecord| -> anyhow::Result<bool> {
        calls.set(calls.get() + 1);
        Ok(registration.access_groups.len() == 2)
    };

    let retained = filter(registrations, None, &authorizer);

    assert_eq!(calls.get(), 2);
    assert_eq!(names(&retained), vec!["split"]);
}
