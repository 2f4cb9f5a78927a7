//! Channel identifiers and the closed channel set.
//!
//! The set of vessels is fixed at configuration time; every per-channel slot
//! (window, gate, ledger entry, queue) is addressed by its index in the set.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::BuildError;

/// Short vessel code, e.g. "V1". Cheap to clone across worker threads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(Arc<str>);

impl ChannelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

/// Closed enumeration of channels, with explicit initialization and index
/// lookup. No default-on-access: an identifier outside the set resolves to
/// `None` and the reading is dropped by the caller.
#[derive(Debug, Clone)]
pub struct ChannelSet {
    ids: Vec<ChannelId>,
    index: HashMap<String, usize>,
}

impl ChannelSet {
    pub fn new<I, S>(ids: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();
        let mut index = HashMap::new();
        for id in ids {
            let id = id.as_ref().trim();
            if id.is_empty() {
                return Err(BuildError::InvalidConfig("empty channel identifier"));
            }
            if index.insert(id.to_string(), out.len()).is_some() {
                return Err(BuildError::DuplicateChannel(id.to_string()));
            }
            out.push(ChannelId::from(id));
        }
        if out.is_empty() {
            return Err(BuildError::NoChannels);
        }
        Ok(Self { ids: out, index })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Index of `id` within the set, if it is a member.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn id(&self, idx: usize) -> Option<&ChannelId> {
        self.ids.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelId> {
        self.ids.iter()
    }
}
