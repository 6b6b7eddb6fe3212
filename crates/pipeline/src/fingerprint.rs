//! Content fingerprints for the watched input tables.
//!
//! A fingerprint is the SHA-256 digest of a file's raw bytes, or
//! [`Fingerprint::Absent`] when the file does not exist. The detector keeps
//! the last pair it saw in memory only; a fresh detector has no recorded
//! state, so its first check always reports a change.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use reprice_core::Table;

use crate::error::PassError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    /// The file does not exist ("no data yet").
    Absent,
    /// SHA-256 of the file contents.
    Digest([u8; 32]),
}

impl Fingerprint {
    pub fn is_absent(&self) -> bool {
        matches!(self, Fingerprint::Absent)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fingerprint::Absent => write!(f, "absent"),
            Fingerprint::Digest(bytes) => {
                for b in &bytes[..6] {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}

/// Hash the file at `path`. A missing file yields [`Fingerprint::Absent`].
pub fn fingerprint(path: &Path) -> io::Result<Fingerprint> {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Fingerprint::Absent),
        Err(e) => return Err(e),
    };
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(Fingerprint::Digest(hasher.finalize().into()))
}

/// Pure equality check between two observations of the same table.
pub fn has_changed(previous: &Fingerprint, current: &Fingerprint) -> bool {
    previous != current
}

/// Fingerprints of both inputs taken at the same check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFingerprints {
    pub products: Fingerprint,
    pub sales: Fingerprint,
}

/// Decides whether the inputs changed since the last check.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    products: PathBuf,
    sales: PathBuf,
    /// `None` until the first check, which therefore always reports a change.
    last: Option<TableFingerprints>,
}

impl ChangeDetector {
    pub fn new(products: impl Into<PathBuf>, sales: impl Into<PathBuf>) -> Self {
        Self {
            products: products.into(),
            sales: sales.into(),
            last: None,
        }
    }

    /// Fingerprint both tables and compare against the previous check.
    ///
    /// Both fingerprints are refreshed together on every call, so edits made
    /// between two checks collapse into a single change.
    pub fn check(&mut self) -> Result<bool, PassError> {
        let current = self.observe()?;
        let changed = match &self.last {
            None => true,
            Some(prev) => {
                has_changed(&prev.products, &current.products)
                    || has_changed(&prev.sales, &current.sales)
            }
        };
        debug!(
            products = %current.products,
            sales = %current.sales,
            changed,
            "checked input fingerprints"
        );
        self.last = Some(current);
        Ok(changed)
    }

    /// Forget the recorded state so the next check reports a change.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn last(&self) -> Option<&TableFingerprints> {
        self.last.as_ref()
    }

    fn observe(&self) -> Result<TableFingerprints, PassError> {
        let products = fingerprint(&self.products).map_err(|source| PassError::Fingerprint {
            table: Table::Products,
            path: self.products.clone(),
            source,
        })?;
        let sales = fingerprint(&self.sales).map_err(|source| PassError::Fingerprint {
            table: Table::Sales,
            path: self.sales.clone(),
            source,
        })?;
        Ok(TableFingerprints { products, sales })
    }
}
