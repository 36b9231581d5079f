//! Commit object
//!
//! Commits link a tree snapshot to its parent commits together with
//! authorship information and a free-form message.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>          (0 to 16 lines)
//! author <name> <<email>> <timestamp> <timezone>
//! committer <name> <<email>> <timestamp> <timezone>
//!
//! <commit message bytes>
//! ```

use crate::areas::database::Database;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::{Error, Result};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};

/// Maximum number of parents a commit may reference
pub const MAX_PARENTS: usize = 16;

/// Author or committer information
///
/// Contains name, email, and timestamp with timezone information.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: DateTime<FixedOffset>,
}

impl Author {
    /// Create a new author with the current local time
    pub fn new(name: String, email: String) -> Self {
        Self::new_with_timestamp(name, email, chrono::Local::now().fixed_offset())
    }

    /// Create a new author with a specific timestamp
    ///
    /// Newlines and angle brackets are dropped from name and email, since
    /// they delimit the identity line.
    pub fn new_with_timestamp(name: String, email: String, timestamp: DateTime<FixedOffset>) -> Self {
        Author {
            name: remove_special(&name),
            email: remove_special(&email),
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Seconds since the Unix epoch
    pub fn unix_time(&self) -> i64 {
        self.timestamp.timestamp()
    }

    /// Format author info as stored in commit headers
    ///
    /// # Returns
    ///
    /// String in format "Name <email> timestamp timezone"
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }
}

impl TryFrom<&str> for Author {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        let invalid = || Error::Corrupt(format!("invalid identity line {value:?}"));

        // Format: "name <email> timestamp timezone"
        let (name_email, timezone) = value.rsplit_once(' ').ok_or_else(invalid)?;
        let (name_email, timestamp) = name_email.rsplit_once(' ').ok_or_else(invalid)?;

        let email_start = name_email.find('<').ok_or_else(invalid)?;
        let email_end = name_email.rfind('>').ok_or_else(invalid)?;
        if email_end < email_start {
            return Err(invalid());
        }

        let name = name_email[..email_start].trim_end().to_string();
        let email = name_email[email_start + 1..email_end].to_string();

        let timestamp = timestamp.parse::<i64>().map_err(|_| invalid())?;
        let offset = parse_offset(timezone).ok_or_else(invalid)?;
        let timestamp = DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(invalid)?
            .with_timezone(&offset);

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

fn remove_special(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '\n' | '<' | '>'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parse a `+hhmm` / `-hhmm` timezone offset
fn parse_offset(value: &str) -> Option<FixedOffset> {
    let (sign, digits) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Commit object
///
/// Contains references to:
/// - The tree representing the state of files
/// - Parent commit(s) for history
/// - Author and committer information
/// - Commit message
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Tree object ID representing the directory snapshot
    tree_oid: ObjectId,
    /// Parent commit IDs (empty for initial commit, multiple for merge commits)
    parents: Vec<ObjectId>,
    /// Author who wrote the changes
    author: Author,
    /// Committer who recorded the commit
    committer: Author,
    /// Raw commit message
    message: Bytes,
}

impl Commit {
    /// Create a new commit
    ///
    /// Fails with [`Error::TooManyParents`] past [`MAX_PARENTS`] parents.
    pub fn new(
        tree_oid: ObjectId,
        parents: Vec<ObjectId>,
        author: Author,
        committer: Author,
        message: impl Into<Bytes>,
    ) -> Result<Self> {
        if parents.len() > MAX_PARENTS {
            return Err(Error::TooManyParents(parents.len()));
        }

        Ok(Commit {
            tree_oid,
            parents,
            author,
            committer,
            message: message.into(),
        })
    }

    /// Assemble a commit and write it to the store
    pub fn build(
        database: &Database,
        tree_oid: ObjectId,
        parents: Vec<ObjectId>,
        author: Author,
        committer: Author,
        message: impl Into<Bytes>,
    ) -> Result<ObjectId> {
        let commit = Self::new(tree_oid, parents, author, committer, message)?;
        database.store(&commit)
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }

    pub fn message(&self) -> &Bytes {
        &self.message
    }
}

impl Packable for Commit {
    fn serialize(&self) -> Result<Bytes> {
        let mut headers = vec![format!("tree {}", self.tree_oid)];
        for parent in &self.parents {
            headers.push(format!("parent {parent}"));
        }
        headers.push(format!("author {}", self.author.display()));
        headers.push(format!("committer {}", self.committer.display()));

        let mut content = Vec::new();
        for header in headers {
            content.extend_from_slice(header.as_bytes());
            content.push(b'\n');
        }
        content.push(b'\n');
        content.extend_from_slice(&self.message);

        Ok(Bytes::from(content))
    }
}

impl Unpackable for Commit {
    fn deserialize(payload: Bytes) -> Result<Self> {
        let split = payload
            .windows(2)
            .position(|w| w == b"\n\n")
            .ok_or_else(|| Error::Corrupt("commit without header terminator".to_string()))?;

        let headers = std::str::from_utf8(&payload[..split])
            .map_err(|_| Error::Corrupt("commit headers are not valid UTF-8".to_string()))?;
        let message = payload.slice(split + 2..);

        let mut lines = headers.lines();

        let tree_oid = lines
            .next()
            .and_then(|line| line.strip_prefix("tree "))
            .ok_or_else(|| Error::Corrupt("commit is missing its tree line".to_string()))?;
        let tree_oid = ObjectId::try_parse(tree_oid)?;

        // Parse all parent lines (there can be 0, 1, or multiple parents)
        let mut parents = Vec::new();
        let mut next_line = lines.next();
        while let Some(parent) = next_line.and_then(|line| line.strip_prefix("parent ")) {
            parents.push(ObjectId::try_parse(parent)?);
            next_line = lines.next();
        }

        let author = next_line
            .and_then(|line| line.strip_prefix("author "))
            .ok_or_else(|| Error::Corrupt("commit is missing its author line".to_string()))?;
        let author = Author::try_from(author)?;

        let committer = lines
            .next()
            .and_then(|line| line.strip_prefix("committer "))
            .ok_or_else(|| Error::Corrupt("commit is missing its committer line".to_string()))?;
        let committer = Author::try_from(committer)?;

        Self::new(tree_oid, parents, author, committer, message)
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn author() -> Author {
        let timestamp = DateTime::parse_from_rfc3339("2024-03-01T12:00:00+02:00").unwrap();
        Author::new_with_timestamp("Ada Lovelace".into(), "ada@example.com".into(), timestamp)
    }

    #[fixture]
    fn committer() -> Author {
        let timestamp = DateTime::parse_from_rfc3339("2024-03-02T08:30:00-05:30").unwrap();
        Author::new_with_timestamp("Charles Babbage".into(), "cb@example.com".into(), timestamp)
    }

    fn oid(byte: u8) -> ObjectId {
        ObjectId::from_bytes([byte; 20])
    }

    #[rstest]
    fn test_author_line_format(author: Author) {
        assert_eq!(
            author.display(),
            "Ada Lovelace <ada@example.com> 1709287200 +0200"
        );
        assert_eq!(author.unix_time(), 1709287200);
    }

    #[rstest]
    fn test_author_line_parses_back(author: Author, committer: Author) {
        assert_eq!(Author::try_from(author.display().as_str()).unwrap(), author);
        assert_eq!(
            Author::try_from(committer.display().as_str()).unwrap(),
            committer
        );
    }

    #[rstest]
    fn test_identity_cannot_inject_header_lines(author: Author, committer: Author) {
        let intruder = Author::new_with_timestamp(
            format!("Eve\nparent {}\nauthor X <x> 1 +0000\ncommitter Y", oid(0x07)),
            "eve@example.com>\nparent x".into(),
            author.timestamp(),
        );
        assert!(!intruder.display().contains('\n'));
        assert_eq!(intruder.display().matches('<').count(), 1);

        let commit = Commit::new(oid(0xaa), vec![], intruder.clone(), committer, "m").unwrap();
        let payload = commit.serialize().unwrap();
        let header_lines = payload
            .split(|&b| b == b'\n')
            .take_while(|line| !line.is_empty())
            .count();
        assert_eq!(header_lines, 3);

        let parsed = Commit::deserialize(payload).unwrap();
        assert!(parsed.parents().is_empty());
        assert_eq!(parsed.author(), &intruder);
        assert_eq!(parsed, commit);
    }

    #[rstest]
    fn test_identity_is_trimmed(author: Author) {
        let padded = Author::new_with_timestamp(
            " <Ada> ".into(),
            " ada@example.com\n".into(),
            author.timestamp(),
        );
        assert_eq!(padded.name(), "Ada");
        assert_eq!(padded.email(), "ada@example.com");
    }

    #[rstest]
    #[case("no email 1 +0000")]
    #[case("A <a@b> soon +0000")]
    #[case("A <a@b> 1 0000")]
    #[case("A <a@b> 1 +00")]
    fn test_malformed_author_lines(#[case] line: &str) {
        assert!(matches!(Author::try_from(line), Err(Error::Corrupt(_))));
    }

    #[rstest]
    fn test_header_block_order(author: Author, committer: Author) {
        let commit = Commit::new(
            oid(0xaa),
            vec![oid(0x01), oid(0x02)],
            author,
            committer,
            &b"Initial import\n"[..],
        )
        .unwrap();

        let expected = format!(
            "tree {}\nparent {}\nparent {}\n\
             author Ada Lovelace <ada@example.com> 1709287200 +0200\n\
             committer Charles Babbage <cb@example.com> 1709388000 -0530\n\
             \nInitial import\n",
            oid(0xaa),
            oid(0x01),
            oid(0x02)
        );
        assert_eq!(
            String::from_utf8(commit.serialize().unwrap().to_vec()).unwrap(),
            expected
        );
    }

    #[rstest]
    fn test_payload_parses_back(author: Author, committer: Author) {
        let commit = Commit::new(
            oid(0xaa),
            vec![oid(0x01)],
            author,
            committer,
            &b"subject\n\nbody with \xff raw bytes"[..],
        )
        .unwrap();

        let parsed = Commit::deserialize(commit.serialize().unwrap()).unwrap();
        assert_eq!(parsed, commit);
        assert_eq!(parsed.message(), &b"subject\n\nbody with \xff raw bytes"[..]);
    }

    #[rstest]
    fn test_root_commit_has_no_parent_lines(author: Author, committer: Author) {
        let commit = Commit::new(oid(0xaa), vec![], author, committer, "msg").unwrap();
        let payload = commit.serialize().unwrap();

        assert!(!payload.windows(7).any(|w| w == b"parent "));
        assert!(Commit::deserialize(payload).unwrap().parents().is_empty());
    }

    #[rstest]
    fn test_parent_limit(author: Author, committer: Author) {
        let sixteen = (0..16).map(oid).collect::<Vec<_>>();
        assert!(Commit::new(oid(0xaa), sixteen, author.clone(), committer.clone(), "m").is_ok());

        let seventeen = (0..17).map(oid).collect::<Vec<_>>();
        assert!(matches!(
            Commit::new(oid(0xaa), seventeen, author, committer, "m"),
            Err(Error::TooManyParents(17))
        ));
    }
}
