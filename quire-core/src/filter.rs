//! Publication filter: drops omitted notes and the folders left without content.

use crate::models::{Folder, Note};
use std::collections::{btree_map, BTreeMap};

/// A note is published unless its `omit` metadata is truthy
pub fn is_publishable(note: &Note) -> bool {
    !note.is_omitted()
}

/// One folder whose children are still being pruned.
struct Frame {
    key: String,
    name: String,
    notes: Vec<Note>,
    pending: btree_map::IntoIter<String, Folder>,
    kept: BTreeMap<String, Folder>,
}

impl Frame {
    fn open(key: String, folder: Folder) -> Self {
        let Folder {
            name,
            notes,
            children,
        } = folder;

        Self {
            key,
            name,
            notes: notes.into_iter().filter(is_publishable).collect(),
            pending: children.into_iter(),
            kept: BTreeMap::new(),
        }
    }

    fn close(self) -> (String, Option<Folder>) {
        if self.notes.is_empty() && self.kept.is_empty() {
            tracing::debug!("Pruned empty folder {:?}", self.name);
            return (self.key, None);
        }

        let folder = Folder {
            name: self.name,
            notes: self.notes,
            children: self.kept,
        };
        (self.key, Some(folder))
    }
}

/// Prune a content tree down to what gets published.
///
/// Consumes the tree and returns a new one in which every folder holds at
/// least one publishable note or one kept child folder. Returns `None` when
/// nothing in the tree is publishable. Children are pruned before their
/// parent, using an explicit stack so nesting depth is bounded by memory
/// rather than by the call stack.
pub fn prune(root: Folder) -> Option<Folder> {
    let mut stack = vec![Frame::open(String::new(), root)];

    loop {
        let top = stack.last_mut()?;

        if let Some((key, child)) = top.pending.next() {
            stack.push(Frame::open(key, child));
            continue;
        }

        let frame = stack.pop()?;
        let (key, result) = frame.close();

        match stack.last_mut() {
            Some(parent) => {
                if let Some(folder) = result {
                    parent.kept.insert(key, folder);
                }
            }
            None => return result,
        }
    }
}
