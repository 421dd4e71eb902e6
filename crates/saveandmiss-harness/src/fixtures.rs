//! Fixture loading and management.
//!
//! A case table is a JSON array of `{"arg", "num", "want"}` objects. Visible
//! tables come from the configured cases directory; the hidden table lives at
//! a fixed path and may be absent.

use std::fmt;
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::HarnessConfig;

/// Fixture failures. Every variant aborts the run before any case executes.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unmarshal {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("encode case table: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A single test vector.
///
/// Decoding follows Go's `encoding/json` rules for a struct with `arg`, `num`
/// and `want` tags: keys match case-insensitively, the last duplicate wins,
/// missing keys and `null` values leave the zero value, a `null` record is an
/// all-zero case, and unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Case {
    /// String input.
    pub arg: String,
    /// Integer input.
    pub num: i64,
    /// Expected output.
    pub want: String,
}

impl Case {
    #[must_use]
    pub fn new(arg: impl Into<String>, num: i64, want: impl Into<String>) -> Self {
        Self {
            arg: arg.into(),
            num,
            want: want.into(),
        }
    }
}

#[derive(Clone, Copy)]
enum CaseField {
    Arg,
    Num,
    Want,
}

impl CaseField {
    fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "arg" => Some(Self::Arg),
            "num" => Some(Self::Num),
            "want" => Some(Self::Want),
            _ => None,
        }
    }
}

struct CaseVisitor;

impl<'de> Visitor<'de> for CaseVisitor {
    type Value = Case;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a case object or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Case, E> {
        Ok(Case::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Case, A::Error> {
        let mut case = Case::default();
        while let Some(key) = map.next_key::<String>()? {
            match CaseField::from_key(&key) {
                Some(CaseField::Arg) => {
                    if let Some(arg) = map.next_value::<Option<String>>()? {
                        case.arg = arg;
                    }
                }
                Some(CaseField::Num) => {
                    if let Some(num) = map.next_value::<Option<i64>>()? {
                        case.num = num;
                    }
                }
                Some(CaseField::Want) => {
                    if let Some(want) = map.next_value::<Option<String>>()? {
                        case.want = want;
                    }
                }
                None => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(case)
    }
}

impl<'de> Deserialize<'de> for Case {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CaseVisitor)
    }
}

/// Which table a case was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSource {
    Visible,
    Hidden,
}

impl CaseSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        }
    }
}

/// A case together with its stable position in the merged collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledCase {
    /// Position in the visible-then-hidden sequence.
    pub index: usize,
    pub source: CaseSource,
    pub case: Case,
}

impl LabeledCase {
    /// Stable sub-test label, `case_<index>`.
    #[must_use]
    pub fn label(&self) -> String {
        case_label(self.index)
    }
}

/// Label for the case at `index` of the merged collection.
#[must_use]
pub fn case_label(index: usize) -> String {
    format!("case_{index}")
}

/// Provenance of one loaded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureDigest {
    pub source: CaseSource,
    pub path: String,
    pub cases: usize,
    /// Lowercase hex SHA-256 of the raw file bytes.
    pub sha256: String,
}

/// Cases decoded from one file plus the digest of the bytes they came from.
#[derive(Debug, Clone)]
pub struct CaseTable {
    pub cases: Vec<Case>,
    pub digest: FixtureDigest,
}

/// The visible table followed by the (possibly empty) hidden table.
#[derive(Debug, Clone, Default)]
pub struct CaseCollection {
    visible: Vec<Case>,
    hidden: Vec<Case>,
    digests: Vec<FixtureDigest>,
}

impl CaseCollection {
    /// Concatenate two tables, visible first.
    #[must_use]
    pub fn new(visible: Vec<Case>, hidden: Vec<Case>) -> Self {
        Self {
            visible,
            hidden,
            digests: Vec::new(),
        }
    }

    /// Number of visible cases.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Number of hidden cases.
    #[must_use]
    pub fn hidden_len(&self) -> usize {
        self.hidden.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.visible.len() + self.hidden.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Digests of the tables that were read from disk.
    #[must_use]
    pub fn digests(&self) -> &[FixtureDigest] {
        &self.digests
    }

    /// Iterate the merged sequence with labels assigned.
    pub fn iter(&self) -> impl Iterator<Item = LabeledCase> + '_ {
        let visible = self.visible.iter().map(|c| (CaseSource::Visible, c));
        let hidden = self.hidden.iter().map(|c| (CaseSource::Hidden, c));
        visible
            .chain(hidden)
            .enumerate()
            .map(|(index, (source, case))| LabeledCase {
                index,
                source,
                case: case.clone(),
            })
    }
}

/// Decode a case table from a JSON string. A top-level `null` is an empty table.
pub fn cases_from_json(json: &str) -> Result<Vec<Case>, serde_json::Error> {
    serde_json::from_str::<Option<Vec<Case>>>(json).map(Option::unwrap_or_default)
}

/// Read and decode the case table at `path`.
pub fn load_cases(path: &Path) -> Result<Vec<Case>, FixtureError> {
    read_table(path, CaseSource::Visible).map(|table| table.cases)
}

/// Read the hidden table if it exists.
///
/// Only a missing file is tolerated; an unreadable, empty or malformed file
/// is as fatal as it would be for the visible table.
pub fn load_optional_cases(path: &Path) -> Result<Option<CaseTable>, FixtureError> {
    match read_table(path, CaseSource::Hidden) {
        Ok(table) => Ok(Some(table)),
        Err(FixtureError::Read { source, .. }) if source.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Load the visible table and, when present, the hidden table.
pub fn load_collection(config: &HarnessConfig) -> Result<CaseCollection, FixtureError> {
    let visible = read_table(&config.visible_path(), CaseSource::Visible)?;
    let hidden = load_optional_cases(&config.hidden_path)?;

    let mut digests = vec![visible.digest];
    let hidden_cases = match hidden {
        Some(table) => {
            digests.push(table.digest);
            table.cases
        }
        None => Vec::new(),
    };
    Ok(CaseCollection {
        visible: visible.cases,
        hidden: hidden_cases,
        digests,
    })
}

fn read_table(path: &Path, tier: CaseSource) -> Result<CaseTable, FixtureError> {
    let bytes = std::fs::read(path).map_err(|source| FixtureError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cases = serde_json::from_slice::<Option<Vec<Case>>>(&bytes)
        .map(Option::unwrap_or_default)
        .map_err(|source| FixtureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
    let digest = FixtureDigest {
        source: tier,
        path: path.display().to_string(),
        cases: cases.len(),
        sha256: hex_lower(&Sha256::digest(&bytes)),
    };
    Ok(CaseTable { cases, digest })
}

/// Serialize `cases` as a pretty JSON array at `path`.
pub fn write_cases(path: &Path, cases: &[Case]) -> Result<(), FixtureError> {
    let json = encode_cases(cases)?;
    create_parent(path)?;
    std::fs::write(path, json).map_err(|source| FixtureError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn encode_cases(cases: &[Case]) -> Result<String, FixtureError> {
    serde_json::to_string_pretty(cases)
        .map(|json| json + "\n")
        .map_err(FixtureError::Encode)
}

fn create_parent(path: &Path) -> Result<(), FixtureError> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => std::fs::create_dir_all(parent).map_err(|source| FixtureError::Write {
            path: parent.to_path_buf(),
            source,
        }),
        None => Ok(()),
    }
}

/// Starter table written by [`seed_default_cases`].
#[must_use]
pub fn default_cases() -> Vec<Case> {
    vec![
        Case::new("123456789", 3, "123789"),
        Case::new("abcdef", 2, "abef"),
        Case::new("", 3, ""),
    ]
}

/// Create the visible case file with [`default_cases`] if it does not exist.
///
/// Returns `true` when a file was written. An existing file is left untouched.
pub fn seed_default_cases(config: &HarnessConfig) -> Result<bool, FixtureError> {
    let path = config.visible_path();
    let json = encode_cases(&default_cases())?;
    create_parent(&path)?;

    let mut file = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
    {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(source) => return Err(FixtureError::Write { path, source }),
    };
    file.write_all(json.as_bytes())
        .map_err(|source| FixtureError::Write { path, source })?;
    Ok(true)
}

fn hex_lower(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}
