use super::config::{Config, StraddlePolicy};
use super::item::{Item, ItemHandle};
use super::pool::{Handle, Pool, Resettable};
use common::shapes::Rectangle;
use tracing::trace;

/// Child slot of a split node. The discriminant is the slot index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    /// Insertion order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    pub fn bounds_in(self, parent: &Rectangle) -> Rectangle {
        parent.quadrants()[self as usize]
    }
}

#[derive(Debug, Default)]
pub(crate) struct Node {
    pub(crate) level: usize,
    pub(crate) bounds: Rectangle,
    pub(crate) items: Vec<ItemHandle>,
    pub(crate) children: Option<[Handle; 4]>,
}

impl Resettable for Node {
    fn reset(&mut self) {
        self.level = 0;
        self.bounds = Rectangle::default();
        // Keeps the allocation for the next owner.
        self.items.clear();
        self.children = None;
    }
}

enum ChildTarget {
    Nothing,
    One(Handle),
    Several,
}

fn child_target(nodes: &Pool<Node>, children: &[Handle; 4], bounds: &Rectangle) -> ChildTarget {
    let mut target = ChildTarget::Nothing;
    for &child in children {
        if !bounds.overlaps(&nodes[child].bounds) {
            continue;
        }
        match target {
            ChildTarget::Nothing => target = ChildTarget::One(child),
            _ => return ChildTarget::Several,
        }
    }
    target
}

/// Inserts `item` (whose current bounds are `bounds`) below `node`.
/// Returns false when neither `node` nor any of its descendants accepts it.
pub(crate) fn insert<T>(
    nodes: &mut Pool<Node>,
    items: &Pool<Item<T>>,
    config: &Config,
    node: Handle,
    item: ItemHandle,
    bounds: &Rectangle,
) -> bool {
    let current = &nodes[node];
    if !bounds.overlaps(&current.bounds) {
        return false;
    }

    let is_leaf = current.children.is_none();
    if (is_leaf && current.items.len() < config.max_items_per_node)
        || current.level >= config.max_level
    {
        nodes[node].items.push(item);
        return true;
    }

    let children = match current.children {
        Some(children) => children,
        None => split(nodes, items, config, node),
    };

    match config.straddle_policy {
        StraddlePolicy::FirstQuadrant => children
            .iter()
            .any(|&child| insert(nodes, items, config, child, item, bounds)),
        StraddlePolicy::KeepInParent => match child_target(nodes, &children, bounds) {
            ChildTarget::One(child) => {
                if !insert(nodes, items, config, child, item, bounds) {
                    nodes[node].items.push(item);
                }
                true
            }
            ChildTarget::Several => {
                nodes[node].items.push(item);
                true
            }
            ChildTarget::Nothing => false,
        },
    }
}

fn split<T>(
    nodes: &mut Pool<Node>,
    items: &Pool<Item<T>>,
    config: &Config,
    node: Handle,
) -> [Handle; 4] {
    let (bounds, level) = {
        let parent = &nodes[node];
        (parent.bounds, parent.level)
    };
    let children = bounds.quadrants().map(|quadrant_bounds| {
        let child = nodes.obtain();
        let child_node = &mut nodes[child];
        child_node.bounds = quadrant_bounds;
        child_node.level = level + 1;
        child
    });
    nodes[node].children = Some(children);
    trace!(level, x = bounds.x, y = bounds.y, "split node");

    if config.straddle_policy == StraddlePolicy::KeepInParent {
        sink_items(nodes, items, config, node, &children);
    }
    children
}

/// Pushes the items of a freshly split node down into the one child each
/// overlaps. Straddlers stay.
fn sink_items<T>(
    nodes: &mut Pool<Node>,
    items: &Pool<Item<T>>,
    config: &Config,
    node: Handle,
    children: &[Handle; 4],
) {
    let mut pending = std::mem::take(&mut nodes[node].items);
    let mut kept = 0;
    for i in 0..pending.len() {
        let handle = pending[i];
        let bounds = items[handle.0].bounds();
        let sunk = match child_target(nodes, children, &bounds) {
            ChildTarget::One(child) => insert(nodes, items, config, child, handle, &bounds),
            _ => false,
        };
        if !sunk {
            pending[kept] = handle;
            kept += 1;
        }
    }
    pending.truncate(kept);
    nodes[node].items = pending;
}

/// Calls `f` for every item below `node` whose bounds overlap `area`.
pub(crate) fn retrieve<T, F>(
    nodes: &Pool<Node>,
    items: &Pool<Item<T>>,
    node: Handle,
    area: &Rectangle,
    f: &mut F,
) where
    F: FnMut(ItemHandle, &Item<T>),
{
    let current = &nodes[node];
    if !area.overlaps(&current.bounds) {
        return;
    }

    for &handle in &current.items {
        let item = &items[handle.0];
        if item.bounds().overlaps(area) {
            f(handle, item);
        }
    }

    if let Some(children) = current.children {
        for child in children {
            retrieve(nodes, items, child, area, f);
        }
    }
}

/// Returns every item below `node` to the item pool and every descendant
/// node to the node pool. `node` itself stays allocated as an empty leaf.
pub(crate) fn clear<T>(nodes: &mut Pool<Node>, items: &mut Pool<Item<T>>, node: Handle) {
    let current = &mut nodes[node];
    let freed_items = current.items.len();
    let released = items.free_all(current.items.drain(..).map(|handle| handle.0));
    debug_assert_eq!(released, freed_items, "node held a stale item handle");

    if let Some(children) = current.children.take() {
        for child in children {
            clear(nodes, items, child);
            let released = nodes.free(child);
            debug_assert!(released, "child node freed twice");
        }
    }
}
