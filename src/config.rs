//! Environment driven configuration
//!
//! Resolves the storage root and the author/committer identities once, at
//! startup. Everything downstream receives the resolved [`Config`] value.

use crate::artifacts::objects::commit::Author;
use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use std::path::{Path, PathBuf};

pub const ROOT_ENV: &str = "SHA1_FILE_DIRECTORY";
pub const DEFAULT_ROOT: &str = ".dircache";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    workdir: PathBuf,
    root: PathBuf,
    author: Author,
    committer: Author,
}

impl Config {
    pub fn new(workdir: PathBuf, root: PathBuf, author: Author, committer: Author) -> Self {
        Config {
            workdir,
            root,
            author,
            committer,
        }
    }

    pub fn from_env(workdir: &Path) -> anyhow::Result<Self> {
        Self::from_lookup(workdir, |key| {
            std::env::var(key).ok().filter(|value| !value.is_empty())
        })
    }

    /// Resolve configuration through `lookup` instead of the process environment
    pub fn from_lookup(
        workdir: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let root = match lookup(ROOT_ENV) {
            Some(root) => workdir.join(root),
            None => workdir.join(DEFAULT_ROOT),
        };

        let (user, email) = real_identity(&lookup);
        let committer = identity(&lookup, "COMMITTER", &user, &email)?;
        let author = identity(&lookup, "AUTHOR", &user, &email)?;

        Ok(Config {
            workdir: workdir.to_path_buf(),
            root,
            author,
            committer,
        })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }
}

/// The login name and `user@host` of whoever runs the process
fn real_identity(lookup: &impl Fn(&str) -> Option<String>) -> (String, String) {
    let user = lookup("USER")
        .or_else(|| lookup("LOGNAME"))
        .unwrap_or_else(|| "unknown".to_string());

    let host = lookup("HOSTNAME")
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
        })
        .unwrap_or_else(|| "localhost".to_string());

    let email = format!("{user}@{host}");
    (user, email)
}

fn identity(
    lookup: &impl Fn(&str) -> Option<String>,
    role: &str,
    user: &str,
    email: &str,
) -> anyhow::Result<Author> {
    let name = lookup(&format!("GIT_{role}_NAME")).unwrap_or_else(|| user.to_string());
    let email = lookup(&format!("GIT_{role}_EMAIL")).unwrap_or_else(|| email.to_string());

    let date_key = format!("GIT_{role}_DATE");
    match lookup(&date_key) {
        Some(date) => {
            let timestamp =
                parse_date(&date).with_context(|| format!("invalid {date_key}: {date:?}"))?;
            Ok(Author::new_with_timestamp(name, email, timestamp))
        }
        None => Ok(Author::new(name, email)),
    }
}

fn parse_date(date: &str) -> anyhow::Result<DateTime<FixedOffset>> {
    let timestamp = DateTime::parse_from_rfc3339(date)
        .or_else(|_| DateTime::parse_from_rfc2822(date))
        .or_else(|_| DateTime::parse_from_str(date, DATE_FORMAT))?;

    Ok(timestamp)
}
