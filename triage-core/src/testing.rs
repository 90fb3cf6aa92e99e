//! Fixtures shared by the unit tests of this crate.

use std::fs;
use std::path::Path;

use git2::{build::CheckoutBuilder, Repository as Git2Repository, Signature};
use tempfile::TempDir;

pub const JANE: (&str, &str) = ("Jane Doe", "jane.doe@example.com");
pub const BOB: (&str, &str) = ("Bob Roe", "bob@example.org");

/// A throwaway repository with one root commit on `base`.
pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Git2Repository,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Git2Repository::init(dir.path()).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Tester").unwrap();
            config.set_str("user.email", "tester@example.com").unwrap();
            config.set_bool("commit.gpgsign", false).unwrap();
        }
        let test_repo = TestRepo { dir, repo };
        test_repo.commit_file(
            "README",
            "hello\n",
            "Initial commit",
            ("Tester", "tester@example.com"),
        );
        test_repo.create_branch("base");
        test_repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, name: &str, content: &str) {
        fs::write(self.path().join(name), content).unwrap();
    }

    /// Commit `name` with `content` on the checked-out branch.
    pub fn commit_file(
        &self,
        name: &str,
        content: &str,
        message: &str,
        author: (&str, &str),
    ) -> String {
        self.write_file(name, content);
        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let author = Signature::now(author.0, author.1).unwrap();
        let committer = Signature::now("Tester", "tester@example.com").unwrap();
        let parent = self.repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &author, &committer, message, &tree, &parents)
            .unwrap()
            .to_string()
    }

    pub fn create_branch(&self, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo.branch(name, &head, true).unwrap();
    }

    pub fn checkout(&self, name: &str) {
        let refname = format!("refs/heads/{name}");
        let target = self.repo.revparse_single(&refname).unwrap();
        self.repo
            .checkout_tree(&target, Some(CheckoutBuilder::new().force()))
            .unwrap();
        self.repo.set_head(&refname).unwrap();
    }

    pub fn detach_head(&self, id: &str) {
        let oid = git2::Oid::from_str(id).unwrap();
        self.repo.set_head_detached(oid).unwrap();
    }

    pub fn head_message(&self) -> String {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        head.message().unwrap_or("").to_string()
    }

    pub fn head_id(&self) -> String {
        self.repo.head().unwrap().peel_to_commit().unwrap().id().to_string()
    }

    /// `upstream` gets three commits on top of `base` (Jane, Bob, Jane);
    /// `downstream` stays at `base` and is checked out. Returns the three ids.
    pub fn with_diverged_branches() -> (Self, [String; 3]) {
        let test_repo = TestRepo::new();
        test_repo.create_branch("upstream");
        test_repo.create_branch("downstream");

        test_repo.checkout("upstream");
        let first = test_repo.commit_file("a.txt", "a\n", "Add a", JANE);
        let second = test_repo.commit_file("b.txt", "b\n", "Add b", BOB);
        let third = test_repo.commit_file("c.txt", "c\n", "Add c\n\nWith a body.", JANE);

        test_repo.checkout("downstream");
        (test_repo, [first, second, third])
    }
}
