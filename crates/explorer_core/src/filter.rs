use crate::{JobTree, Node, NodeId, TreeError, TreeResult};

impl JobTree {
    /// Narrows the job children of a session or favorited search to those whose
    /// filter text contains `query`, case-insensitively.
    ///
    /// The unfiltered children are captured on first use and every later filter
    /// runs against that capture.
    pub fn apply_local_filter(&mut self, id: NodeId, query: &str) -> TreeResult<Vec<NodeId>> {
        let query = query.trim().to_uppercase();
        let snapshot = {
            let node = self.get_mut(id)?;
            let children = node.children.clone();
            let data = node.session_data_mut().ok_or(TreeError::UnexpectedKind {
                node: id,
                expected: "session or favorited search",
            })?;
            data.local_filter
                .snapshot
                .get_or_insert(children)
                .clone()
        };

        let visible: Vec<NodeId> = snapshot
            .into_iter()
            .filter(|child| {
                self.node(*child)
                    .and_then(Node::job)
                    .is_some_and(|job| job.filter_text().to_uppercase().contains(&query))
            })
            .collect();

        let node = self.get_mut(id)?;
        node.children = visible.clone();
        node.description = Some(format!("Filter: {query}"));
        if let Some(data) = node.session_data_mut() {
            data.local_filter.query = Some(query);
        }
        self.mark_dirty();
        Ok(visible)
    }

    /// Restores the children captured before filtering and forgets the capture.
    pub fn clear_local_filter(&mut self, id: NodeId) -> TreeResult<()> {
        let node = self.get_mut(id)?;
        let data = node.session_data_mut().ok_or(TreeError::UnexpectedKind {
            node: id,
            expected: "session or favorited search",
        })?;
        data.local_filter.query = None;
        let snapshot = data.local_filter.snapshot.take();
        if let Some(snapshot) = snapshot {
            node.children = snapshot;
        }
        node.description = None;
        self.mark_dirty();
        Ok(())
    }

    /// Drops filter state before a fresh listing so reconciliation sees every job.
    pub(crate) fn reset_local_filter(&mut self, id: NodeId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let Some(data) = node.session_data_mut() else {
            return;
        };
        let was_filtered = data.local_filter.query.take().is_some();
        let snapshot = data.local_filter.snapshot.take();
        if was_filtered {
            node.description = None;
        }
        if let Some(snapshot) = snapshot {
            node.children = snapshot;
        }
    }

    pub fn is_locally_filtered(&self, id: NodeId) -> bool {
        self.node(id)
            .and_then(Node::session_data)
            .is_some_and(|data| data.local_filter.query.is_some())
    }
}
