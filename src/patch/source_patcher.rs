//! Splicing update sites back into the source
//!
//! Sites are applied from the end of the file towards the start, so an
//! insertion never shifts the line of a site that is still pending. The line
//! array itself is never mutated: the patched body is assembled in a single
//! backward pass and reversed once at the end.

use crate::analysis::UpdateSite;
use crate::error::{Error, Result};

/// First line of the generated header
pub const HEADER_START: &str = "/* autogen added */";
/// Last line of the generated header
pub const HEADER_END: &str = "/* end autogen added */";
/// Lines the header adds in front of the body, blank separator included
pub const HEADER_LINES: usize = 4;

/// Produces the instrumented source from the collected artifacts
#[derive(Debug, Clone)]
pub struct SourcePatcher {
    table_identifier: String,
}

impl SourcePatcher {
    pub fn new(table_identifier: impl Into<String>) -> Self {
        Self {
            table_identifier: table_identifier.into(),
        }
    }

    /// Apply `sites` to `source` and prepend the tracking-table header
    ///
    /// Every site is validated before anything is spliced; a site whose line
    /// does not exist in `source` fails the whole call.
    pub fn apply(
        &self,
        source: &str,
        sites: &[UpdateSite],
        serialized_table: &str,
    ) -> Result<String> {
        let lines: Vec<&str> = source.split('\n').collect();
        let body = splice(&lines, sites)?;
        Ok(format!("{}\n\n{}", self.header(serialized_table), body))
    }

    /// Header declaring the tracking table, without the trailing blank line
    pub fn header(&self, serialized_table: &str) -> String {
        format!(
            "{HEADER_START}\nlet {} = {};\n{HEADER_END}",
            self.table_identifier,
            serialized_table.trim()
        )
    }
}

/// Insert each site's patch on a new line right after its target line
///
/// Sites sharing a line land in ascending column order; sites with the same
/// location keep their collection order.
pub fn splice(lines: &[&str], sites: &[UpdateSite]) -> Result<String> {
    for site in sites {
        let line = site.location.line as usize;
        if line == 0 || line > lines.len() {
            return Err(Error::PatchOutOfRange {
                location: site.location,
                line_count: lines.len(),
            });
        }
    }

    let mut ordered: Vec<&UpdateSite> = sites.iter().collect();
    ordered.sort_by(|a, b| (b.location, b.sequence).cmp(&(a.location, a.sequence)));
    let mut pending = ordered.into_iter().peekable();

    let mut reversed: Vec<&str> = Vec::with_capacity(lines.len() + sites.len());
    for (index, line) in lines.iter().enumerate().rev() {
        let line_number = index + 1;
        while let Some(site) = pending.next_if(|site| site.location.line as usize == line_number) {
            reversed.push(&site.patch);
        }
        reversed.push(line);
    }
    debug_assert!(pending.next().is_none(), "validated sites must all be applied");

    reversed.reverse();
    Ok(reversed.join("\n"))
}
