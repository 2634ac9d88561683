//! Data directory globs for one instrument hour.

use std::path::{Path, PathBuf};

use gapfill_model::{InstrumentRef, TimeSlice};
use regex::Regex;
use tracing::warn;

/// `{root}/{node}/{instrument}*{slice}*`, the directories holding one hour of
/// raw data for an instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPattern {
    dir: PathBuf,
    name_glob: String,
}

impl DataPattern {
    pub fn new(root: &Path, instrument: &InstrumentRef, slice: &TimeSlice) -> Self {
        Self {
            dir: root.join(instrument.node()),
            name_glob: format!(
                "{}*{}*",
                instrument.instrument_class(),
                slice.label()
            ),
        }
    }

    /// Full glob as handed to the player.
    pub fn as_glob(&self) -> String {
        self.dir.join(&self.name_glob).display().to_string()
    }

    /// Entries of the node directory whose names match the glob, sorted.
    ///
    /// A missing node directory simply has no matches. Other listing errors
    /// are logged and also treated as no data.
    pub async fn matches(&self) -> Vec<PathBuf> {
        let Some(matcher) = glob_regex(&self.name_glob) else {
            return Vec::new();
        };
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Vec::new();
            }
            Err(err) => {
                warn!(dir = %self.dir.display(), error = %err, "cannot list data directory");
                return Vec::new();
            }
        };

        let mut found = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let name = entry.file_name();
                    if name.to_str().is_some_and(|name| matcher.is_match(name)) {
                        found.push(entry.path());
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    warn!(dir = %self.dir.display(), error = %err, "data directory listing interrupted");
                    break;
                }
            }
        }
        found.sort();
        found
    }
}

/// Anchored regex for a single-component glob supporting `*` and `?`.
fn glob_regex(glob: &str) -> Option<Regex> {
    let mut pattern = String::with_capacity(glob.len() + 8);
    pattern.push('^');
    for ch in glob.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            other => pattern.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    pattern.push('$');
    match Regex::new(&pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!(glob, error = %err, "unusable data glob");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(root: &Path) -> DataPattern {
        DataPattern::new(
            root,
            &InstrumentRef::parse("RS01SLBS-LJ01A-05-HYDLFA101").unwrap(),
            &TimeSlice::parse_label("20200101T00").unwrap(),
        )
    }

    #[test]
    fn glob_layout() {
        let p = pattern(Path::new("/rsn_cabled/rsn_data/DVT_Data"));
        assert_eq!(
            p.as_glob(),
            "/rsn_cabled/rsn_data/DVT_Data/lj01a/HYDLFA101*20200101T00*"
        );
    }

    #[test]
    fn glob_regex_escapes_literals() {
        let re = glob_regex("HYD.A*2020?").unwrap();
        assert!(re.is_match("HYD.A_x_20201"));
        assert!(!re.is_match("HYDXA_x_20201"));
        assert!(!re.is_match("HYD.A_x_2020"));
    }

    #[tokio::test]
    async fn matches_only_the_requested_hour() {
        let root = tempfile::tempdir().unwrap();
        let node = root.path().join("lj01a");
        std::fs::create_dir_all(node.join("HYDLFA101_20200101T0000_UTC")).unwrap();
        std::fs::create_dir_all(node.join("HYDLFA101_20200101T0100_UTC")).unwrap();
        std::fs::create_dir_all(node.join("CTDPFA101_20200101T0000_UTC")).unwrap();

        let found = pattern(root.path()).matches().await;
        assert_eq!(found, vec![node.join("HYDLFA101_20200101T0000_UTC")]);
    }

    #[tokio::test]
    async fn missing_node_directory_has_no_matches() {
        let root = tempfile::tempdir().unwrap();
        assert!(pattern(root.path()).matches().await.is_empty());
    }
}
