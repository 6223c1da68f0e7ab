use crate::{JobTree, Node, NodeId, NodeKind, TreeError, TreeResult};

/// Shortest accepted spool polling interval.
pub const MIN_POLL_INTERVAL_MS: u64 = 1_000;

pub const INVALID_POLL_INTERVAL: &str =
    "The polling interval must be greater than or equal to 1000ms.";

/// Parses a polling interval typed by the user, in milliseconds.
pub fn validate_poll_interval(text: &str) -> Result<u64, String> {
    match text.trim().parse::<u64>() {
        Ok(interval) if interval >= MIN_POLL_INTERVAL_MS => Ok(interval),
        _ => Err(INVALID_POLL_INTERVAL.to_string()),
    }
}

impl JobTree {
    /// Marks a spool node as polled or not, together with every other spool
    /// node shown for the same file. Returns the nodes that were updated.
    pub fn set_polling(&mut self, id: NodeId, polling: bool) -> TreeResult<Vec<NodeId>> {
        if self.get(id)?.spool().is_none() {
            return Err(TreeError::UnexpectedKind {
                node: id,
                expected: "spool file",
            });
        }
        let path = self.resource_path(id).ok_or(TreeError::UnknownNode(id))?;
        let updated = self.spools_at(&path);
        for &spool in &updated {
            if let Some(Node {
                kind: NodeKind::Spool(data),
                ..
            }) = self.node_mut(spool)
            {
                data.polling = polling;
            }
        }
        self.mark_dirty();
        Ok(updated)
    }

    /// Whether any spool node for `path` is marked as polled.
    pub fn path_polled(&self, path: &str) -> bool {
        self.spools_at(path).into_iter().any(|id| {
            self.node(id)
                .and_then(Node::spool)
                .is_some_and(|data| data.polling)
        })
    }

    /// Finds the spool node behind a virtual file path.
    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        // Live session nodes are visited before favorites.
        let mut stack: Vec<NodeId> = self.favorites().to_vec();
        stack.extend(self.sessions().iter().rev());
        while let Some(id) = stack.pop() {
            if self.resource_path(id).as_deref() == Some(path) {
                return Some(id);
            }
            stack.extend_from_slice(self.children(id));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intervals_below_one_second_are_rejected() {
        assert_eq!(validate_poll_interval("1000"), Ok(1000));
        assert_eq!(validate_poll_interval(" 2500 "), Ok(2500));
        assert_eq!(
            validate_poll_interval("999"),
            Err(INVALID_POLL_INTERVAL.to_string())
        );
        assert!(validate_poll_interval("soon").is_err());
    }
}
