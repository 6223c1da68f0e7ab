use explorer_core::{Collapsible, ItemKind, TreeItemView};

/// One line of the tree listing.
pub fn item_line(item: &TreeItemView, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    if item.kind == ItemKind::Information {
        return format!("{:>4} {indent}  {}", "", item.label);
    }
    let marker = match item.collapsible {
        Collapsible::Collapsed => "+",
        Collapsible::Expanded => "-",
        Collapsible::None => " ",
    };
    let mut line = format!("{:>4} {indent}{marker} {}", item.id, item.label);
    if let Some(description) = &item.description {
        line.push_str(&format!("  ({description})"));
    }
    let mut flags = Vec::new();
    if item.favorited {
        flags.push("favorite");
    }
    if item.polling {
        flags.push("polling");
    }
    if item.locally_filtered {
        flags.push("filtered");
    }
    if !flags.is_empty() {
        line.push_str(&format!(" [{}]", flags.join(", ")));
    }
    line
}
