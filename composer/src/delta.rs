//! Document model handed to the engine when the composer loads content.
//!
//! The shape follows the delta JSON most web rich-text editors speak:
//! `{"ops":[{"insert":"hello ","attributes":{"bold":true}},{"insert":"world\n"}]}`.
//! Attributes are carried through untouched; only the engine interprets
//! them.

use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub ops: Vec<Op>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Op {
    Insert {
        insert: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attributes: BTreeMap<String, serde_json::Value>,
    },
}

impl Op {
    pub fn insert(text: impl Into<String>) -> Self {
        Op::Insert {
            insert: text.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn insert_with(
        text: impl Into<String>,
        attributes: impl IntoIterator<Item = (String, serde_json::Value)>,
    ) -> Self {
        Op::Insert {
            insert: text.into(),
            attributes: attributes.into_iter().collect(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Op::Insert { insert, .. } => insert,
        }
    }
}

impl Delta {
    pub fn new(ops: Vec<Op>) -> Self {
        Self { ops }
    }

    /// Single unformatted insert, the common "reset to this text" case.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::default();
        }
        Self::new(vec![Op::insert(text)])
    }

    pub fn plain_text(&self) -> String {
        self.ops.iter().map(Op::text).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.iter().all(|op| op.text().is_empty())
    }
}

impl From<Vec<Op>> for Delta {
    fn from(ops: Vec<Op>) -> Self {
        Self::new(ops)
    }
}

/// Content loaded into a freshly created engine: either a full document or a
/// bare list of operations.
#[derive(Clone, Debug, PartialEq)]
pub enum InitialContent {
    Document(Delta),
    Ops(Vec<Op>),
}

impl InitialContent {
    pub fn to_delta(&self) -> Delta {
        match self {
            InitialContent::Document(delta) => delta.clone(),
            InitialContent::Ops(ops) => Delta::new(ops.clone()),
        }
    }
}

impl Default for InitialContent {
    fn default() -> Self {
        InitialContent::Ops(Vec::new())
    }
}

impl From<Delta> for InitialContent {
    fn from(delta: Delta) -> Self {
        InitialContent::Document(delta)
    }
}

impl From<Vec<Op>> for InitialContent {
    fn from(ops: Vec<Op>) -> Self {
        InitialContent::Ops(ops)
    }
}

/// A file staged alongside a message. Picking files is handled outside the
/// composer, so submissions currently always carry `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub path: PathBuf,
}
