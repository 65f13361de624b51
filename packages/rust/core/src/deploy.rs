//! Profile README deploy.
//!
//! Clones the profile repository into a scratch directory, drops in a freshly
//! generated README, and commits and pushes it when something changed. Git is
//! driven as a subprocess.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use folio_shared::{AppConfig, FolioError, Result};

use crate::pipeline::{self, GenerateConfig};

/// File name of the README inside the profile repository.
const README_NAME: &str = "README.md";

/// Configuration for a deploy run.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// `owner/name` of the profile repository.
    pub profile_repo: String,
    /// Base the repository path is appended to (`https://github.com`).
    pub remote_base: String,
    pub branch: String,
    /// Commit subject; the date is appended as ` (YYYY-MM-DD)`.
    pub commit_message: String,
    pub git_user_name: String,
    pub git_user_email: String,
    /// Where the scratch clone is created.
    pub work_root: PathBuf,
    /// How the README is generated before copying.
    pub generate: GenerateConfig,
}

impl PublishConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            profile_repo: config.deploy.profile_repo.clone(),
            remote_base: config.deploy.remote_base.clone(),
            branch: config.deploy.branch.clone(),
            commit_message: config.deploy.commit_message.clone(),
            git_user_name: config.deploy.git_user_name.clone(),
            git_user_email: config.deploy.git_user_email.clone(),
            work_root: std::env::temp_dir(),
            generate: GenerateConfig::from_app(config),
        }
    }

    /// Clone URL: `{remote_base}/{profile_repo}.git`.
    pub fn remote_url(&self) -> String {
        format!(
            "{}/{}.git",
            self.remote_base.trim_end_matches('/'),
            self.profile_repo.trim_end_matches(".git")
        )
    }
}

/// What the deploy did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// A commit with this message was pushed.
    Pushed { commit_message: String },
    /// The repository already had this README.
    UpToDate,
}

#[derive(Debug)]
pub struct DeployResult {
    pub outcome: DeployOutcome,
    pub line_count: usize,
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting deploy status.
pub trait DeployProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the deploy completes.
    fn done(&self, result: &DeployResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl DeployProgress for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &DeployResult) {}
}

/// Check that `git` is callable; returns its version line.
pub fn check_git() -> Result<String> {
    let version = git(&["--version"], None)?;
    debug!(%version, "git available");
    Ok(version)
}

/// Run the full deploy.
///
/// 1. Preflight (`git --version`)
/// 2. Clone the profile repository into a fresh scratch directory
/// 3. Generate the README and copy it in
/// 4. Commit and push if `git status --porcelain` reports changes
///
/// The scratch directory is removed whatever the outcome.
#[instrument(skip_all, fields(repo = %config.profile_repo, branch = %config.branch))]
pub fn deploy_profile(
    config: &PublishConfig,
    generated_on: NaiveDate,
    progress: &dyn DeployProgress,
) -> Result<DeployResult> {
    let start = Instant::now();

    if config.profile_repo.trim().is_empty() {
        return Err(FolioError::config(
            "deploy.profile_repo is not set (expected owner/name)",
        ));
    }

    progress.phase("Checking git");
    check_git()?;
    info!(
        name = %config.git_user_name,
        email = %config.git_user_email,
        "committing as configured identity"
    );

    let workdir = config
        .work_root
        .join(format!("folio-deploy-{}", uuid::Uuid::now_v7()));

    let result = publish_in(config, &workdir, generated_on, progress);

    if workdir.exists() {
        if let Err(e) = std::fs::remove_dir_all(&workdir) {
            warn!(path = %workdir.display(), error = %e, "could not clean up scratch clone");
        }
    }

    let (outcome, line_count) = result?;
    let result = DeployResult {
        outcome,
        line_count,
        elapsed: start.elapsed(),
    };

    match &result.outcome {
        DeployOutcome::Pushed { commit_message } => {
            info!(%commit_message, "profile README pushed")
        }
        DeployOutcome::UpToDate => info!("profile README already up to date"),
    }
    progress.done(&result);

    Ok(result)
}

/// Steps that need the scratch directory.
fn publish_in(
    config: &PublishConfig,
    workdir: &Path,
    generated_on: NaiveDate,
    progress: &dyn DeployProgress,
) -> Result<(DeployOutcome, usize)> {
    progress.phase("Cloning profile repository");
    let remote = config.remote_url();
    let target = workdir.to_string_lossy().into_owned();
    git(&["clone", "--quiet", &remote, &target], None)?;

    progress.phase("Generating README");
    let generated = pipeline::generate_readme(&config.generate, generated_on)?;
    let dest = workdir.join(README_NAME);
    std::fs::copy(&generated.output_file, &dest).map_err(|e| FolioError::io(&dest, e))?;

    progress.phase("Checking for changes");
    let status = git(&["status", "--porcelain"], Some(workdir))?;
    if status.trim().is_empty() {
        return Ok((DeployOutcome::UpToDate, generated.line_count));
    }

    progress.phase("Committing and pushing");
    let commit_message = format!("{} ({})", config.commit_message, generated_on.format("%Y-%m-%d"));
    git(&["add", README_NAME], Some(workdir))?;
    git(&["config", "user.name", &config.git_user_name], Some(workdir))?;
    git(&["config", "user.email", &config.git_user_email], Some(workdir))?;
    git(
        &["-c", "commit.gpgsign=false", "commit", "--quiet", "-m", &commit_message],
        Some(workdir),
    )?;
    let refspec = format!("HEAD:{}", config.branch);
    git(&["push", "--quiet", "origin", &refspec], Some(workdir))?;

    Ok((DeployOutcome::Pushed { commit_message }, generated.line_count))
}

/// Run one git command, returning trimmed stdout.
fn git(args: &[&str], cwd: Option<&Path>) -> Result<String> {
    let mut cmd = Command::new("git");
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    debug!(?args, "running git");

    let output = cmd
        .output()
        .map_err(|e| FolioError::Git(format!("failed to run git: {e}. Is git installed?")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FolioError::Git(format!(
            "`git {}` failed ({}): {}",
            args.join(" "),
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
