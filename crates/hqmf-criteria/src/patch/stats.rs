//! Patch pass statistics

use std::fmt;

/// Changes made by the patch pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchStats {
    /// Code list ids copied from a source criteria
    pub code_lists_copied: usize,

    /// Descriptions replaced
    pub descriptions_patched: usize,

    /// Titles replaced from a referenced criteria
    pub titles_patched: usize,

    /// Child references rewritten to their grouper form
    pub children_rewritten: usize,

    /// Variables turned into groupers
    pub groupers_embedded: usize,
}

impl PatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }

    pub fn total_changes(&self) -> usize {
        self.code_lists_copied
            + self.descriptions_patched
            + self.titles_patched
            + self.children_rewritten
            + self.groupers_embedded
    }

    pub fn merge(&mut self, other: &PatchStats) {
        self.code_lists_copied += other.code_lists_copied;
        self.descriptions_patched += other.descriptions_patched;
        self.titles_patched += other.titles_patched;
        self.children_rewritten += other.children_rewritten;
        self.groupers_embedded += other.groupers_embedded;
    }

    pub fn record_code_list(&mut self) {
        self.code_lists_copied += 1;
    }

    pub fn record_description(&mut self) {
        self.descriptions_patched += 1;
    }

    pub fn record_title(&mut self) {
        self.titles_patched += 1;
    }

    pub fn record_child_rewrite(&mut self) {
        self.children_rewritten += 1;
    }

    pub fn record_grouper(&mut self) {
        self.groupers_embedded += 1;
    }
}

impl fmt::Display for PatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} code lists, {} descriptions, {} titles, {} children, {} groupers",
            self.code_lists_copied,
            self.descriptions_patched,
            self.titles_patched,
            self.children_rewritten,
            self.groupers_embedded
        )
    }
}
