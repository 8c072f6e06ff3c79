//! What a script reads.
//!
//! Dependency discovery does not run scripts. Each script engine reports,
//! for a given script, the set of document locations the script can read
//! ([`VariableReads`]). Discovery turns those reads into dependency
//! records, and the content check tests whether any of them refers to
//! rendered content.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::EngineConfig;

/// One location a script can read.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableRef {
    /// A bare context variable.
    Variable(String),
    /// `set.<name>`
    SetField(String),
    /// `card.<name>`
    CardField(String),
    /// `styling.<name>`
    StylingField(String),
    /// `extra_card.<name>`
    ExtraCardField(String),
    /// `card_style.<field>.<member>` or `extra_card_style.<field>.<member>`
    StyleMember { field: String, member: String },
    /// `set.cards`
    CardList,
    /// The keyword list of the set.
    Keywords,
    /// The `stylesheet` variable.
    StyleSheet,
}

impl VariableRef {
    /// Check if this read touches rendered content.
    #[must_use]
    pub fn is_content(&self, config: &EngineConfig) -> bool {
        match self {
            VariableRef::Variable(name) => config.is_content_name(name),
            VariableRef::StyleMember { member, .. } => config.is_content_name(member),
            _ => false,
        }
    }
}

/// The set of locations a script can read.
///
/// `forward` is set when the script's result is a plain copy of one other
/// field (`card.name`, `set.title`). Such scripts also forward the
/// dependents of the copied field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariableReads {
    reads: SmallVec<[VariableRef; 4]>,
    forward: Option<VariableRef>,
}

impl VariableReads {
    /// Create an empty read set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a read. Duplicates are ignored.
    pub fn add(&mut self, read: VariableRef) {
        if !self.reads.contains(&read) {
            self.reads.push(read);
        }
    }

    /// Merge another read set. The forward target is kept only if this set
    /// had none.
    pub fn extend(&mut self, other: VariableReads) {
        for read in other.reads {
            self.add(read);
        }
        if self.forward.is_none() {
            self.forward = other.forward;
        }
    }

    /// Mark the script as a plain copy of `target`.
    pub fn set_forward(&mut self, target: VariableRef) {
        self.forward = Some(target);
    }

    /// Forget the forward target.
    pub fn clear_forward(&mut self) {
        self.forward = None;
    }

    /// The field this script copies, if it is a plain copy.
    #[must_use]
    pub fn forward(&self) -> Option<&VariableRef> {
        self.forward.as_ref()
    }

    /// Iterate over recorded reads.
    pub fn iter(&self) -> impl Iterator<Item = &VariableRef> {
        self.reads.iter()
    }

    /// Check if a read was recorded.
    #[must_use]
    pub fn contains(&self, read: &VariableRef) -> bool {
        self.reads.contains(read)
    }

    /// Number of distinct reads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reads.len()
    }

    /// Check if nothing is read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    /// Check if any read touches rendered content.
    #[must_use]
    pub fn is_content_dependent(&self, config: &EngineConfig) -> bool {
        self.reads.iter().any(|read| read.is_content(config))
    }
}
