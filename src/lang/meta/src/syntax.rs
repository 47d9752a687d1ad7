
/// Grammar role of a syntax tree node
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum SyntaxClassifier {
    Root,
    Namespace,
    Struct,
    Variable,
    DataType,
    SemanticName,
    RegisterIndex,
    InputSlot,
    InstanceData,
    SlottedStream,
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct NodeId(pub usize);

#[derive(PartialEq, Debug, Clone)]
pub struct SyntaxNode {
    pub classifier: SyntaxClassifier,
    /// Index of the symbol the node was built from, None only for the root
    pub symbol_index: Option<u32>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Arena of syntax nodes mirroring the nested scopes of the source
#[derive(PartialEq, Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    pub fn new() -> SyntaxTree {
        SyntaxTree {
            nodes: vec![SyntaxNode {
                classifier: SyntaxClassifier::Root,
                symbol_index: None,
                parent: None,
                children: vec![],
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn add(&mut self, parent: NodeId, classifier: SyntaxClassifier, symbol_index: u32) -> NodeId {
        assert!(parent.0 < self.nodes.len(), "parent node {:?} does not exist", parent);
        let id = NodeId(self.nodes.len());
        self.nodes.push(SyntaxNode {
            classifier: classifier,
            symbol_index: Some(symbol_index),
            parent: Some(parent),
            children: vec![],
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes with the given classifier in creation order
    pub fn find_all(&self, classifier: SyntaxClassifier) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|&(_, node)| node.classifier == classifier)
            .map(|(index, _)| NodeId(index))
            .collect()
    }
}

#[test]
fn test_tree_links() {
    let mut tree = SyntaxTree::new();
    let root = tree.root();
    let ns = tree.add(root, SyntaxClassifier::Namespace, 1);
    let st = tree.add(ns, SyntaxClassifier::Struct, 4);
    let var = tree.add(st, SyntaxClassifier::Variable, 7);
    tree.add(var, SyntaxClassifier::DataType, 6);

    assert_eq!(tree.len(), 5);
    assert_eq!(tree.children(root), &[ns]);
    assert_eq!(tree.node(st).parent, Some(ns));
    assert_eq!(tree.node(var).symbol_index, Some(7));
    assert_eq!(tree.find_all(SyntaxClassifier::Struct), vec![st]);
}
