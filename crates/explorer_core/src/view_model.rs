use crate::{Collapsible, JobTree, NodeId, NodeKind};

/// What kind of row a tree item is; drives menus and icons in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Favorites,
    Session,
    FavoriteProfile,
    FavoriteSearch,
    Job,
    FavoriteJob,
    Spool,
    Information,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItemView {
    pub id: NodeId,
    pub label: String,
    pub description: Option<String>,
    pub tooltip: Option<String>,
    pub collapsible: Collapsible,
    pub kind: ItemKind,
    /// Path of the item in the job file system, when it has one.
    pub resource_path: Option<String>,
    /// A favorite exists with the same label.
    pub favorited: bool,
    pub polling: bool,
    pub locally_filtered: bool,
}

/// Top-level rows plus the change flag consumed by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobTreeView {
    pub roots: Vec<TreeItemView>,
    pub dirty: bool,
}

impl JobTree {
    pub fn tree_item(&self, id: NodeId) -> Option<TreeItemView> {
        let node = self.node(id)?;
        let kind = match &node.kind {
            NodeKind::FavoritesRoot => ItemKind::Favorites,
            NodeKind::Session(_) => ItemKind::Session,
            NodeKind::FavoriteProfile(_) => ItemKind::FavoriteProfile,
            NodeKind::FavoriteSearch(_) => ItemKind::FavoriteSearch,
            NodeKind::Job(_) => ItemKind::Job,
            NodeKind::FavoriteJob(_) => ItemKind::FavoriteJob,
            NodeKind::Spool(_) => ItemKind::Spool,
            NodeKind::Information => ItemKind::Information,
        };
        Some(TreeItemView {
            id,
            label: node.label.clone(),
            description: node.description.clone(),
            tooltip: node.tooltip.clone(),
            collapsible: node.collapsible,
            kind,
            resource_path: self.resource_path(id),
            favorited: matches!(kind, ItemKind::Session | ItemKind::Job)
                && self.find_favorited_node(id).is_some(),
            polling: node.is_polling(),
            locally_filtered: self.is_locally_filtered(id),
        })
    }

    /// Snapshot of the top-level rows; consumes the change flag.
    pub fn view(&mut self) -> JobTreeView {
        let dirty = self.consume_dirty();
        JobTreeView {
            roots: self
                .sessions()
                .iter()
                .filter_map(|id| self.tree_item(*id))
                .collect(),
            dirty,
        }
    }
}
