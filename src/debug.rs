use std::{collections::VecDeque, fmt};

use crate::{AvlTree, Dir, Node};

impl AvlTree {
    /// Writes a Graphviz rendering of the tree to `w`.
    ///
    /// Each node is labelled `key:height:balance`, and nodes at the same depth share a rank. Empty
    /// child slots are drawn as points so that left and right children stay distinguishable.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let root = match self.root.as_deref() {
            Some(r) => r,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item<'tree> {
            Node(&'tree Node),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut missing = 0;
        let mut links = String::new();

        while !queue.is_empty() {
            use fmt::Write;

            write!(w, "{{rank=same; ")?;

            for _ in 0..queue.len() {
                let Some(item) = queue.pop_front() else {
                    break;
                };

                let node = match item {
                    Item::Node(node) => node,
                    Item::Missing(id) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                };

                let key = node.key;
                let height = node.height;
                let balance = node.balance_factor();
                write!(
                    w,
                    "\"graph{name}-{key}\" [label=\"{key}:{height}:{balance}\"]; "
                )?;

                // Leaves get no missing-child points.
                if node.is_leaf() {
                    continue;
                }

                for dir in [Dir::Left, Dir::Right] {
                    if let Some(child) = node.child(dir) {
                        let child_key = child.key;

                        queue.push_back(Item::Node(child));
                        writeln!(
                            links,
                            "\"graph{name}-{key}\" -> \"graph{name}-{child_key}\";"
                        )?;
                    } else {
                        queue.push_back(Item::Missing(missing));
                        writeln!(
                            links,
                            "\"graph{name}-{key}\" -> \"graph{name}-missing{missing}\";"
                        )?;
                        missing += 1;
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&links)?;

        w.write_str(" }\n}")
    }
}
