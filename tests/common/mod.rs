#![allow(dead_code)]
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use git2::{Oid, Repository, Signature};
use hookci::ci::build_tool::{BuildTool, Phase, PhaseRun};
use hookci::ci::notifier::Notify;
use hookci::ci::outcome::Outcome;
use hookci::ci::push::PushEvent;
use hookci::db::init::{connect, default_database_url};
use hookci::db::models::commit::NewCommit;
use hookci::db::models::person::NewPerson;
use hookci::errors::BuildToolError;
use hookci::history::HistoryStore;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Name of the report the scripted tool writes.
pub const REPORT_FILE: &str = "report.html";

/// A git repository on disk used as the remote of a push.
pub struct FixtureRepo {
    pub repo: Repository,
    pub dir: TempDir,
}

impl FixtureRepo {
    /// Initialize a repository with one commit on its default branch.
    pub fn init() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let fixture = Self { repo, dir };
        fixture.commit_file("README.md", "# fixture\n", "Initial commit");
        fixture
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn url(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    /// Write `file_name` and commit it on the current branch.
    pub fn commit_file(&self, file_name: &str, content: &str, commit_msg: &str) -> Oid {
        fs::write(self.dir.path().join(file_name), content).unwrap();
        let mut index = self.repo.index().unwrap();
        index.add_path(&PathBuf::from(file_name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Fixture Author", "fixture@example.com").unwrap();
        let parents: Vec<git2::Commit> = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.target())
            .and_then(|target_id| self.repo.find_commit(target_id).ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, commit_msg, &tree, &parent_refs)
            .unwrap()
    }

    /// Name of the branch `HEAD` points at.
    pub fn current_branch(&self) -> String {
        self.repo.head().unwrap().shorthand().unwrap().to_owned()
    }

    /// Create `name` from `HEAD` and switch to it.
    pub fn create_branch(&self, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo.branch(name, &head, false).unwrap();
        self.switch_to(name);
    }

    /// Switch `HEAD` and the working tree to an existing branch.
    pub fn switch_to(&self, name: &str) {
        self.repo.set_head(&format!("refs/heads/{name}")).unwrap();
        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.force();
        self.repo.checkout_head(Some(&mut checkout)).unwrap();
    }
}

/// A history store on a fresh database file.
pub async fn init_history() -> (TempDir, HistoryStore) {
    let dir = tempfile::tempdir().unwrap();
    let db = connect(&default_database_url(dir.path())).await.unwrap();
    (dir, HistoryStore::new(db))
}

pub fn author(name: &str) -> NewPerson {
    NewPerson::author(
        name.to_owned(),
        name.to_lowercase(),
        format!("{}@example.com", name.to_lowercase()),
    )
}

pub fn sender(login: &str) -> NewPerson {
    NewPerson::sender(
        login.to_owned(),
        format!("https://github.com/{login}"),
        format!("https://avatars.example.com/{login}"),
    )
}

pub fn commit(sha: &str, message: &str, author_name: &str) -> NewCommit {
    NewCommit {
        sha: sha.to_owned(),
        message: message.to_owned(),
        url: format!("https://github.com/octo/app/commit/{sha}"),
        modified_files: vec!["src/main.rs".to_owned()],
        author: author(author_name),
    }
}

/// A push of `commits` to `branch` of the repository at `clone_url`.
pub fn push_event(clone_url: &str, branch: &str, commits: Vec<NewCommit>) -> PushEvent {
    PushEvent {
        repository_clone_url: clone_url.to_owned(),
        repository_full_name: "octo/app".to_owned(),
        branch: branch.to_owned(),
        pushed_at: Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap(),
        sender: sender("octocat"),
        commits,
    }
}

/// A counter-style test report like the one gradle writes.
pub fn report_html(total: u32, failed: u32) -> String {
    format!(
        "<html><body>\
         <div class=\"infoBox\"><div class=\"counter\">{total}</div><p>tests</p></div>\
         <div class=\"infoBox\"><div class=\"counter\">{failed}</div><p>failures</p></div>\
         <div class=\"infoBox\"><div class=\"counter\">0</div><p>ignored</p></div>\
         </body></html>"
    )
}

/// A build tool whose phases succeed or fail as scripted.
pub struct ScriptedTool {
    pub assemble_ok: bool,
    pub test_ok: bool,
    /// Written to the report path during the test phase.
    pub report: Option<String>,
}

impl ScriptedTool {
    pub fn new(assemble_ok: bool, test_ok: bool, report: Option<String>) -> Self {
        Self {
            assemble_ok,
            test_ok,
            report,
        }
    }
}

impl BuildTool for ScriptedTool {
    fn run(&self, phase: Phase, work_dir: &Path) -> PhaseRun {
        let ok = match phase {
            Phase::Assemble => self.assemble_ok,
            Phase::Test => {
                if let Some(report) = &self.report {
                    fs::write(self.report_path(work_dir), report).unwrap();
                }
                self.test_ok
            }
        };
        PhaseRun {
            log: format!("{phase} ran in {}", work_dir.display()),
            result: if ok {
                Ok(())
            } else {
                Err(BuildToolError::Failed {
                    phase: phase.to_string(),
                    code: Some(1),
                })
            },
        }
    }

    fn report_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(REPORT_FILE)
    }

    fn cache_dirs(&self) -> Vec<PathBuf> {
        vec![PathBuf::from(".cache")]
    }
}

/// Notifier remembering every status it was asked to report.
#[derive(Default)]
pub struct RecordingNotifier {
    pub reports: Mutex<Vec<(Outcome, String, String)>>,
}

impl RecordingNotifier {
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .map(|(outcome, _, _)| *outcome)
            .collect()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .map(|(_, description, _)| description.clone())
            .collect()
    }
}

#[async_trait]
impl Notify for RecordingNotifier {
    async fn report(&self, outcome: Outcome, description: &str, details_url: &str) -> bool {
        self.reports.lock().unwrap().push((
            outcome,
            description.to_owned(),
            details_url.to_owned(),
        ));
        true
    }
}

/// Whether `dir` has no entries left.
pub fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir).unwrap().next().is_none()
}
