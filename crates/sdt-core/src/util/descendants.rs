use crate::xml::arena::XmlDocument;
use indextree::NodeId;

/// Pre-order descendants of `node` (itself included) that skips whole
/// subtrees for which `prune` returns true.
///
/// Pruned nodes are neither yielded nor descended into, which is what makes
/// content moved under an already-processed container invisible to searches.
pub fn descendants_pruned<'a, F>(
    doc: &'a XmlDocument,
    node: NodeId,
    prune: F,
) -> impl Iterator<Item = NodeId> + 'a
where
    F: Fn(NodeId) -> bool + 'a,
{
    PrunedDescendants {
        doc,
        stack: vec![node],
        prune,
    }
}

struct PrunedDescendants<'a, F>
where
    F: Fn(NodeId) -> bool,
{
    doc: &'a XmlDocument,
    stack: Vec<NodeId>,
    prune: F,
}

impl<F> Iterator for PrunedDescendants<'_, F>
where
    F: Fn(NodeId) -> bool,
{
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if self.doc.get(current).is_none() || (self.prune)(current) {
                continue;
            }

            let children: Vec<_> = self.doc.children(current).collect();
            self.stack.extend(children.into_iter().rev());

            return Some(current);
        }
        None
    }
}
