use super::config::Config;
use super::item::{Item, ItemHandle};
use super::node::{self, Node, Quadrant};
use super::pool::{Handle, Pool, PoolUsage};
use crate::error::{QuadtreeError, QuadtreeResult};
use common::shapes::Rectangle;
use smallvec::SmallVec;
use tracing::{debug, trace};

/// Read-only snapshot of one node, handed out by [`QuadTree::for_each_node`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeView {
    pub bounds: Rectangle,
    pub level: usize,
    pub item_count: usize,
    pub is_leaf: bool,
    /// Slot under the parent; `None` for the root.
    pub quadrant: Option<Quadrant>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub nodes: PoolUsage,
    pub items: PoolUsage,
}

/// Result of [`QuadTree::retrieve`], borrowing the tree's result buffer.
pub struct Retrieved<'a, T> {
    handles: &'a [ItemHandle],
    items: &'a Pool<Item<T>>,
}

impl<'a, T> Retrieved<'a, T> {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn handles(&self) -> &'a [ItemHandle] {
        self.handles
    }

    pub fn contains(&self, handle: ItemHandle) -> bool {
        self.handles.contains(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemHandle, &'a Item<T>)> {
        let items = self.items;
        let handles = self.handles;
        handles
            .iter()
            .map(move |&handle| (handle, &items[handle.0]))
    }

    pub fn payloads(&self) -> impl Iterator<Item = &'a T> {
        self.iter().filter_map(|(_, item)| item.payload())
    }
}

type NodeStack = SmallVec<[(Handle, Option<Quadrant>); 32]>;

/// Region quadtree over rectangles, rebuilt by `clear` + `insert` and
/// queried with `retrieve`. Nodes and items come from per-tree pools so a
/// rebuild of similar size allocates nothing.
pub struct QuadTree<T> {
    root: Handle,
    nodes: Pool<Node>,
    items: Pool<Item<T>>,
    config: Config,
    retrieved: Vec<ItemHandle>,
    len: usize,
}

impl<T> QuadTree<T> {
    pub fn new(bounding_box: Rectangle) -> QuadtreeResult<Self> {
        Self::new_with_config(bounding_box, Config::default())
    }

    pub fn new_with_config(bounding_box: Rectangle, config: Config) -> QuadtreeResult<Self> {
        if !bounding_box.is_valid() {
            return Err(QuadtreeError::InvalidRectangleDims {
                x: bounding_box.x,
                y: bounding_box.y,
                width: bounding_box.width,
                height: bounding_box.height,
            });
        }

        // The root is drawn from the pool like any other node, so prewarm
        // one extra.
        let mut nodes: Pool<Node> = Pool::new(config.pool_size.saturating_add(1));
        let root = nodes.obtain();
        nodes[root].bounds = bounding_box;
        let items: Pool<Item<T>> = Pool::new(config.pool_size);
        debug!(
            ?bounding_box,
            max_level = config.max_level,
            max_items_per_node = config.max_items_per_node,
            pool_size = config.pool_size,
            "created quadtree"
        );

        Ok(QuadTree {
            root,
            nodes,
            items,
            retrieved: Vec::with_capacity(config.pool_size),
            config,
            len: 0,
        })
    }

    /// Pulls an item from the pool. It has no payload and empty bounds until
    /// set through [`QuadTree::item_mut`].
    pub fn obtain_item(&mut self) -> ItemHandle {
        ItemHandle(self.items.obtain())
    }

    pub fn obtain_item_with(&mut self, payload: T, bounds: Rectangle) -> ItemHandle {
        let handle = self.obtain_item();
        let item = &mut self.items[handle.0];
        item.set_payload(payload);
        item.set_bounds(bounds);
        handle
    }

    /// Inserts a previously obtained item.
    ///
    /// Returns false when the item lies outside the tree bounds; the item
    /// is then back in the pool and `handle` is dead.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is stale or already inserted. See
    /// [`QuadTree::try_insert`] for the non-panicking form.
    pub fn insert(&mut self, handle: ItemHandle) -> bool {
        match self.try_insert(handle) {
            Ok(inserted) => inserted,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_insert(&mut self, handle: ItemHandle) -> QuadtreeResult<bool> {
        let bounds = match self.items.get(handle.0) {
            Some(item) if item.inserted => return Err(already_inserted(handle)),
            Some(item) => item.bounds(),
            None => return Err(stale(handle)),
        };

        let inserted = node::insert(
            &mut self.nodes,
            &self.items,
            &self.config,
            self.root,
            handle,
            &bounds,
        );
        if inserted {
            self.items[handle.0].inserted = true;
            self.len += 1;
        } else {
            trace!(?bounds, "item rejected, returning it to the pool");
            self.items.free(handle.0);
        }
        Ok(inserted)
    }

    /// Returns an obtained item that was never inserted.
    pub fn release_item(&mut self, handle: ItemHandle) -> QuadtreeResult<()> {
        match self.items.get(handle.0) {
            Some(item) if item.inserted => Err(already_inserted(handle)),
            Some(_) => {
                self.items.free(handle.0);
                Ok(())
            }
            None => Err(stale(handle)),
        }
    }

    /// Empties the tree back to a single leaf. Every inserted item and every
    /// node below the root returns to its pool.
    pub fn clear(&mut self) {
        self.retrieved.clear();
        node::clear(&mut self.nodes, &mut self.items, self.root);
        debug!(
            items = self.len,
            pooled_nodes = self.nodes.usage().free,
            pooled_items = self.items.usage().free,
            "cleared quadtree"
        );
        self.len = 0;
    }
}

impl<T> QuadTree<T> {
    pub fn bounds(&self) -> Rectangle {
        self.nodes[self.root].bounds
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn max_level(&self) -> usize {
        self.config.max_level
    }

    /// Applies to later split decisions; existing nodes are left alone.
    pub fn set_max_level(&mut self, max_level: usize) {
        self.config.max_level = max_level;
    }

    pub fn max_items_per_node(&self) -> usize {
        self.config.max_items_per_node
    }

    /// Applies to later split decisions; existing nodes are left alone.
    pub fn set_max_items_per_node(&mut self, max_items_per_node: usize) {
        self.config.max_items_per_node = max_items_per_node;
    }

    pub fn item(&self, handle: ItemHandle) -> Option<&Item<T>> {
        self.items.get(handle.0)
    }

    /// Mutable access for items not yet inserted. Inserted items return
    /// `None` so their bounds cannot drift from the node holding them.
    pub fn item_mut(&mut self, handle: ItemHandle) -> Option<&mut Item<T>> {
        self.items.get_mut(handle.0).filter(|item| !item.inserted)
    }

    pub fn payload_mut(&mut self, handle: ItemHandle) -> Option<&mut T> {
        self.items.get_mut(handle.0).and_then(Item::payload_mut)
    }

    pub fn contains(&self, handle: ItemHandle) -> bool {
        self.items.get(handle.0).is_some_and(|item| item.inserted)
    }

    /// Number of inserted items.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Nodes currently in the tree, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.usage().live()
    }

    /// Deepest level of any node; 0 when the root has not split.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        self.for_each_node(|view| depth = depth.max(view.level));
        depth
    }

    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            nodes: self.nodes.usage(),
            items: self.items.usage(),
        }
    }

    /// Items overlapping `area`. The result borrows an internal buffer that
    /// is reused by the next call.
    pub fn retrieve(&mut self, area: Rectangle) -> Retrieved<'_, T> {
        self.retrieved.clear();
        let retrieved = &mut self.retrieved;
        let mut push = |handle: ItemHandle, _: &Item<T>| retrieved.push(handle);
        node::retrieve(&self.nodes, &self.items, self.root, &area, &mut push);
        Retrieved {
            handles: &self.retrieved,
            items: &self.items,
        }
    }

    /// Appends the handles of items overlapping `area` to `out`.
    pub fn retrieve_into(&self, area: Rectangle, out: &mut Vec<ItemHandle>) {
        self.query_with(area, |handle, _| out.push(handle));
    }

    pub fn query_with<F>(&self, area: Rectangle, mut f: F)
    where
        F: FnMut(ItemHandle, &Item<T>),
    {
        node::retrieve(&self.nodes, &self.items, self.root, &area, &mut f);
    }

    /// Pre-order walk, children in NW, NE, SW, SE order.
    pub fn for_each_node<F>(&self, mut f: F)
    where
        F: FnMut(NodeView),
    {
        let mut stack: NodeStack = SmallVec::new();
        stack.push((self.root, None));
        while let Some((handle, quadrant)) = stack.pop() {
            let current = &self.nodes[handle];
            f(NodeView {
                bounds: current.bounds,
                level: current.level,
                item_count: current.items.len(),
                is_leaf: current.children.is_none(),
                quadrant,
            });
            if let Some(children) = current.children {
                for quadrant in Quadrant::ALL.into_iter().rev() {
                    stack.push((children[quadrant as usize], Some(quadrant)));
                }
            }
        }
    }

    pub fn all_node_bounding_boxes(&self, bounding_boxes: &mut Vec<Rectangle>) {
        self.for_each_node(|view| bounding_boxes.push(view.bounds));
    }
}

fn stale(handle: ItemHandle) -> QuadtreeError {
    QuadtreeError::StaleHandle {
        index: handle.index(),
        generation: handle.generation(),
    }
}

fn already_inserted(handle: ItemHandle) -> QuadtreeError {
    QuadtreeError::AlreadyInserted {
        index: handle.index(),
        generation: handle.generation(),
    }
}
