//! Throwaway git repositories for tests

use std::path::Path;

use axum::Router;
use git2::{Repository, RepositoryInitOptions};
use scrutinize::backend::notes::repo::GitNotes;
use scrutinize::backend::server::{create_app, AppState};
use scrutinize::shared::config::DEFAULT_NOTES_REF;
use tempfile::TempDir;

/// Port the test apps pretend to listen on; names the session cookie
pub const TEST_PORT: u16 = 4242;

/// A repository in a temporary directory, on branch `main`, with a
/// configured author and one commit
pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test Reviewer").unwrap();
            config.set_str("user.email", "reviewer@example.com").unwrap();
        }
        let test_repo = Self { dir, repo };
        test_repo.commit("initial");
        test_repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commit the current index on HEAD and return the commit id
    pub fn commit(&self, message: &str) -> String {
        let signature = self.repo.signature().unwrap();
        let tree_id = self.repo.index().unwrap().write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let parent = self.repo.head().ok().map(|h| h.peel_to_commit().unwrap());
        let parents: Vec<_> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap()
            .to_string()
    }

    /// Create `name` at HEAD and check it out
    pub fn checkout_new_branch(&self, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo.branch(name, &head, false).unwrap();
        self.repo.set_head(&format!("refs/heads/{}", name)).unwrap();
    }

    /// Detach HEAD at the current commit
    pub fn detach(&self) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo.set_head_detached(head.id()).unwrap();
    }

    /// A second handle on the repository, as the server opens it
    pub fn notes(&self) -> GitNotes {
        GitNotes::discover(self.path()).unwrap()
    }

    /// State and router for a server over this repository
    pub fn app(&self, webroot: &Path) -> (AppState, Router) {
        let state = AppState::new(
            Box::new(self.notes()),
            DEFAULT_NOTES_REF,
            TEST_PORT,
            webroot,
            true,
        );
        let app = create_app(state.clone());
        (state, app)
    }
}
