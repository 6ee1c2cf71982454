//! Filters the application registrations down to those a user is allowed to see.
//!
//! Checking access is a remote call per application, which makes listing applications the most expensive read
//! in the API. Most applications share their access groups with many others though, so the answer is memoized
//! per distinct group set for the length of a single listing.

#[cfg(test)]
mod tests;

use crate::models::RegistrationRecord;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// An authorizer answers whether the current user may access the given application. Implementations usually
/// perform a remote permission check with the user's delegated credentials.
///
/// Any closure of the right shape is an authorizer.
pub trait Authorizer {
    fn authorize(&self, registration: &RegistrationRecord) -> anyhow::Result<bool>;
}

impl<F> Authorizer for F
where
    F: Fn(&RegistrationRecord) -> anyhow::Result<bool>,
{
    fn authorize(&self, registration: &RegistrationRecord) -> anyhow::Result<bool> {
        self(registration)
    }
}

/// The cached answer for a group set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    Granted,
    Denied,
}

/// Counts collected during a single filter call, mostly useful for operator facing logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// Registrations left after the repository filter.
    pub considered: usize,

    /// Number of times the authorizer was invoked.
    pub authorization_calls: usize,

    /// Authorizer invocations that returned an error and were treated as denied.
    pub failed_checks: usize,

    /// Registrations returned to the caller.
    pub retained: usize,
}

/// Order independent identity of a registration's access groups. Duplicate group ids collapse.
type GroupSet<'a> = BTreeSet<&'a str>;

fn group_set(registration: &RegistrationRecord) -> GroupSet<'_> {
    registration
        .access_groups
        .iter()
        .map(String::as_str)
        .collect()
}

fn matches_repo(registration: &RegistrationRecord, ssh_repo: Option<&str>) -> bool {
    match ssh_repo {
        Some(repo) => registration.clone_url.eq_ignore_ascii_case(repo),
        None => true,
    }
}

/// Returns the registrations the user may access, in their original order.
///
/// When `ssh_repo` is given only registrations whose clone url matches it exactly (ignoring case) are considered.
pub fn filter<A>(
    registrations: Vec<RegistrationRecord>,
    ssh_repo: Option<&str>,
    authorizer: &A,
) -> Vec<RegistrationRecord>
where
    A: Authorizer + ?Sized,
{
    filter_with_report(registrations, ssh_repo, authorizer).0
}

/// Same as [`filter`] but also returns the counts collected along the way.
///
/// The authorizer is invoked at most once per distinct access group set. A failing authorizer is never fatal;
/// the group set is treated as denied and the failure is logged.
pub fn filter_with_report<A>(
    registrations: Vec<RegistrationRecord>,
    ssh_repo: Option<&str>,
    authorizer: &A,
) -> (Vec<RegistrationRecord>, FilterReport)
where
    A: Authorizer + ?Sized,
{
    let mut report = FilterReport::default();

    let candidates: Vec<RegistrationRecord> = registrations
        .into_iter()
        .filter(|registration| matches_repo(registration, ssh_repo))
        .collect();

    report.considered = candidates.len();

    let mut cache: HashMap<GroupSet<'_>, AccessOutcome> = HashMap::new();
    let mut granted = Vec::with_capacity(candidates.len());

    for registration in &candidates {
        let key = group_set(registration);

        if let Some(outcome) = cache.get(&key) {
            granted.push(*outcome == AccessOutcome::Granted);
            continue;
        }

        report.authorization_calls += 1;

        let outcome = match authorizer.authorize(registration) {
            Ok(true) => AccessOutcome::Granted,
            Ok(false) => AccessOutcome::Denied,
            Err(e) => {
                report.failed_checks += 1;
                warn!(
                    application = %registration.name,
                    error = %format!("{:#}", e),
                    "could not check access to application; treating as denied"
                );
                AccessOutcome::Denied
            }
        };

        cache.insert(key, outcome);
        granted.push(outcome == AccessOutcome::Granted);
    }

    drop(cache);

    let retained: Vec<RegistrationRecord> = candidates
        .into_iter()
        .zip(granted)
        .filter_map(|(registration, granted)| granted.then_some(registration))
        .collect();

    report.retained = retained.len();

    debug!(
        considered = report.considered,
        authorization_calls = report.authorization_calls,
        failed_checks = report.failed_checks,
        retained = report.retained,
        "filtered application registrations"
    );

    (retained, report)
}
