//! Update sites
//!
//! Every mutation site in the source gets a one-line patch that copies the
//! variable's runtime value into the tracking table. Sites are keyed by the
//! end location of the mutating construct.

use crate::analysis::location::Location;
use crate::analysis::shape::AssignmentTargetName;
use crate::analysis::state_table::state_key;
use serde::{Deserialize, Serialize};

/// Marker appended to every generated statement
pub const AUTOGEN_MARKER: &str = "/* autogen added */";

/// A patch to splice into the source after the line of `location`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSite {
    #[serde(rename = "loc")]
    pub location: Location,
    /// Collection order; breaks ties between sites with the same location
    pub sequence: usize,
    /// Tracking-table key written by the patch, if the target resolved
    pub key: Option<String>,
    pub patch: String,
}

/// Accumulates update sites in traversal order
#[derive(Debug, Clone)]
pub struct UpdateSiteCollector {
    table_identifier: String,
    sites: Vec<UpdateSite>,
}

impl UpdateSiteCollector {
    pub fn new(table_identifier: impl Into<String>) -> Self {
        Self {
            table_identifier: table_identifier.into(),
            sites: Vec::new(),
        }
    }

    /// Record a mutation of `target` in `scope_name`, ending at `location`
    ///
    /// Duplicate locations are kept; the patcher orders them by sequence.
    pub fn record(
        &mut self,
        location: Location,
        scope_name: &str,
        target: &AssignmentTargetName,
    ) -> &UpdateSite {
        let (key, patch) = match target {
            AssignmentTargetName::Identifier(name) => {
                let key = state_key(scope_name, name);
                let patch = write_back_statement(&self.table_identifier, &key, name);
                (Some(key), patch)
            }
            AssignmentTargetName::Unresolved(label) => (
                None,
                format!("/* autogen skipped: unresolved mutation target ({label}) */"),
            ),
        };
        log::debug!("update site at {location}: {patch}");
        self.sites.push(UpdateSite {
            location,
            sequence: self.sites.len(),
            key,
            patch,
        });
        &self.sites[self.sites.len() - 1]
    }

    pub fn into_sites(self) -> Vec<UpdateSite> {
        self.sites
    }
}

/// `<table>["<key>"] = <name>; /* autogen added */`
///
/// The key is emitted as a JSON string literal, which is also a valid
/// JavaScript string literal.
fn write_back_statement(table: &str, key: &str, name: &str) -> String {
    let quoted = serde_json::Value::String(key.to_string()).to_string();
    format!("{table}[{quoted}] = {name}; {AUTOGEN_MARKER}")
}
