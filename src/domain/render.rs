use termtree::Tree as TermTree;
use tracing::instrument;

use crate::domain::node::Node;
use crate::domain::tree::Tree;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> TermTree<String>;
}

// The container sentinel is the top label; a node with several parents is
// drawn once under each of them.
impl TreeNodeConvert for Tree {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> TermTree<String> {
        fn build(tree: &Tree, node: &Node) -> TermTree<String> {
            let leaves: Vec<_> = tree.children_of(node).map(|c| build(tree, c)).collect();
            TermTree::new(node.id().to_string()).with_leaves(leaves)
        }

        let roots: Vec<_> = self
            .root_nodes()
            .into_iter()
            .map(|root| build(self, root))
            .collect();
        TermTree::new(self.root_id().to_string()).with_leaves(roots)
    }
}
