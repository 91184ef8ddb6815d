// SPDX-License-Identifier: MIT OR Apache-2.0

//! Group based authorization rules.
use std::collections::BTreeSet;

use counsel_core::Classification;
use serde::{Deserialize, Serialize};

/// Names of the directory groups which unlock privileged actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupPolicy {
    /// Court staff, may disassociate any organisation.
    pub hmcts_staff: BTreeSet<String>,

    /// May grant access to members of their own organisation.
    pub can_grant: BTreeSet<String>,

    /// May remove grants held by members of their own organisation.
    pub can_remove: BTreeSet<String>,

    /// Grantees in these groups receive the full permission set.
    pub full_access: BTreeSet<String>,

    /// Users eligible for case assignment.
    pub can_be_assigned: BTreeSet<String>,
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn intersects(allowed: &BTreeSet<String>, groups: &[String]) -> bool {
    groups.iter().any(|group| allowed.contains(group))
}

impl GroupPolicy {
    pub fn is_hmcts_staff(&self, groups: &[String]) -> bool {
        intersects(&self.hmcts_staff, groups)
    }

    pub fn can_grant(&self, groups: &[String]) -> bool {
        intersects(&self.can_grant, groups)
    }

    pub fn can_remove(&self, groups: &[String]) -> bool {
        intersects(&self.can_remove, groups)
    }

    pub fn can_be_assigned(&self, groups: &[String]) -> bool {
        intersects(&self.can_be_assigned, groups)
    }

    /// Decide the permission set a grantee with the given groups receives.
    pub fn classify(&self, groups: &[String]) -> Classification {
        if intersects(&self.full_access, groups) {
            Classification::Full
        } else {
            Classification::Restricted
        }
    }
}

impl Default for GroupPolicy {
    fn default() -> Self {
        Self {
            hmcts_staff: set(&[
                "Court Administrators",
                "Court Clerks",
                "Legal Advisers",
                "Listing Officers",
            ]),
            can_grant: set(&["Advocates", "Chambers Admin", "Defence Lawyers"]),
            can_remove: set(&["Advocates", "Chambers Admin", "Defence Lawyers"]),
            full_access: set(&["Advocates", "Defence Lawyers"]),
            can_be_assigned: set(&["Advocates", "Defence Lawyers", "Prosecutors"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use counsel_core::Classification;

    use super::GroupPolicy;

    fn groups(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn classify_by_group() {
        let policy = GroupPolicy::default();

        assert_eq!(
            policy.classify(&groups(&["Defence Lawyers"])),
            Classification::Full
        );
        assert_eq!(
            policy.classify(&groups(&["Chambers Admin", "Advocates"])),
            Classification::Full
        );
        assert_eq!(
            policy.classify(&groups(&["Chambers Admin"])),
            Classification::Restricted
        );
        assert_eq!(policy.classify(&[]), Classification::Restricted);
    }

    #[test]
    fn group_checks_need_any_overlap() {
        let policy = GroupPolicy::default();

        assert!(policy.is_hmcts_staff(&groups(&["Listing Officers", "Other"])));
        assert!(!policy.is_hmcts_staff(&groups(&["Advocates"])));
        assert!(policy.can_be_assigned(&groups(&["Prosecutors"])));
        assert!(!policy.can_be_assigned(&groups(&["Chambers Admin"])));
    }
}
