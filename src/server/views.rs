//! HTML views of the build history, rendered from the templates in `templates/`.
//!
//! Every interpolated value is HTML-escaped by the template engine.
use crate::ci::outcome::Outcome;
use crate::db::models::build_record::BuildRecord;
use crate::db::models::commit::Commit;
use askama::Template;

/// Index page linking to every recorded build.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexView {
    /// One row per build, oldest first.
    pub builds: Vec<BuildRow>,
}

/// A build as listed on the index page.
#[derive(Debug, Clone)]
pub struct BuildRow {
    /// Build record id.
    pub id: i64,
    /// Branch that was built.
    pub branch: String,
    /// Classified outcome.
    pub outcome: Outcome,
}

impl From<&BuildRecord> for BuildRow {
    fn from(record: &BuildRecord) -> Self {
        Self {
            id: record.id,
            branch: record.branch.clone(),
            outcome: record.outcome,
        }
    }
}

impl IndexView {
    /// List `records` in the order given.
    #[must_use]
    pub fn new(records: &[BuildRecord]) -> Self {
        Self {
            builds: records.iter().map(BuildRow::from).collect(),
        }
    }
}

/// Page describing one build, its sender and the commits of its push.
#[derive(Template)]
#[template(path = "build.html")]
pub struct BuildPageView<'page> {
    /// The stored record.
    pub record: &'page BuildRecord,
    /// Commits of the push, in push order.
    pub commits: &'page [Commit],
    /// Push time as RFC 3339.
    pub timestamp: String,
    /// Human readable result.
    pub result: &'static str,
}

impl<'page> BuildPageView<'page> {
    /// View of `record` triggered by `commits`.
    #[must_use]
    pub fn new(record: &'page BuildRecord, commits: &'page [Commit]) -> Self {
        Self {
            record,
            commits,
            timestamp: record.timestamp.to_rfc3339(),
            result: result_label(record.outcome),
        }
    }
}

/// Human readable result of a build.
const fn result_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Pending => "pending",
        Outcome::Success => "success",
        Outcome::Error => "Test error",
        Outcome::Failure => "Build failure",
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db::models::person::Person;
    use chrono::{TimeZone, Utc};

    fn person(name: &str) -> Person {
        Person {
            id: 1,
            name: name.to_owned(),
            handle: name.to_owned(),
            contact_key: format!("{name}@example.com"),
            profile_url: Some(format!("https://github.com/{name}")),
            avatar_url: None,
        }
    }

    fn record(id: i64, branch: &str, outcome: Outcome) -> BuildRecord {
        BuildRecord {
            id,
            sender: person("octocat"),
            outcome,
            build_log: "BUILD SUCCESSFUL".to_owned(),
            total_tests: 12,
            passed_tests: 12,
            test_log: String::new(),
            timestamp: Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap(),
            branch: branch.to_owned(),
        }
    }

    fn commit(id: i64, sha: &str, author: &str, modified_files: Vec<String>) -> Commit {
        Commit {
            id,
            sha: sha.to_owned(),
            message: format!("commit {sha}"),
            url: String::new(),
            modified_files,
            author: person(author),
        }
    }

    #[test]
    fn test_index_view_when_empty_expect_no_builds_message() {
        let actual = IndexView::new(&[]).render().unwrap();
        assert!(actual.contains("No builds found in database."));
    }

    #[test]
    fn test_index_view_when_records_expect_link_per_build() {
        let records = [
            record(1, "main", Outcome::Success),
            record(2, "feature", Outcome::Error),
        ];
        let actual = IndexView::new(&records).render().unwrap();
        assert!(actual.contains("href=\"/build_1/\""));
        assert!(actual.contains("href=\"/build_2/\""));
        assert!(actual.contains("feature (error)"));
        assert!(!actual.contains("No builds found in database."));
    }

    #[test]
    fn test_index_view_when_branch_has_markup_expect_escaped() {
        let actual = IndexView::new(&[record(1, "<i>x</i>", Outcome::Success)])
            .render()
            .unwrap();
        assert!(actual.contains("&lt;i&gt;x"));
        assert!(!actual.contains("<i>x"));
    }

    #[test]
    fn test_build_page_view_when_branch_has_markup_expect_escaped() {
        let build = record(3, "<b>evil</b>", Outcome::Failure);
        let actual = BuildPageView::new(&build, &[]).render().unwrap();
        assert!(actual.contains("&lt;b&gt;evil"));
        assert!(!actual.contains("<b>evil"));
        assert!(actual.contains("Result: Build failure"));
    }

    #[test]
    fn test_build_page_view_when_commits_expect_each_listed_in_order() {
        let build = record(4, "main", Outcome::Success);
        let commits = [
            commit(1, "aaa111", "alice", vec!["a, b.rs".to_owned()]),
            commit(2, "bbb222", "bob", Vec::new()),
        ];
        let actual = BuildPageView::new(&build, &commits).render().unwrap();
        let first = actual.find("aaa111").unwrap();
        let second = actual.find("bbb222").unwrap();
        assert!(first < second);
        assert!(actual.contains("Modified: a, b.rs"));
        assert!(actual.contains("Author: alice"));
    }

    #[test]
    fn test_build_page_view_when_sender_has_no_avatar_expect_no_image() {
        let build = record(5, "main", Outcome::Success);
        let actual = BuildPageView::new(&build, &[]).render().unwrap();
        assert!(!actual.contains("<img"));
        assert!(actual.contains("Name: octocat"));
        assert!(actual.contains("Total: 12"));
    }

    #[test]
    fn test_build_page_view_when_sender_has_avatar_expect_image() {
        let mut build = record(6, "main", Outcome::Pending);
        build.sender.avatar_url = Some("avatar.png".to_owned());
        let actual = BuildPageView::new(&build, &[]).render().unwrap();
        assert!(actual.contains("<img src=\"avatar.png\""));
        assert!(actual.contains("Result: pending"));
    }
}
