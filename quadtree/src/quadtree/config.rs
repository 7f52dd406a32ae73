/// How a split node places an item that overlaps more than one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StraddlePolicy {
    /// Keep the item in the split node itself. Items already held when a
    /// leaf splits are pushed down under the same rule, so the item lists of
    /// split nodes only contain straddlers.
    #[default]
    KeepInParent,
    /// Hand the item to the first child in NW, NE, SW, SE order that
    /// overlaps it. Items held before the split stay where they are. A query
    /// touching only another quadrant can miss such an item.
    FirstQuadrant,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Depth at which nodes stop splitting. The root is level 0.
    pub max_level: usize,
    pub max_items_per_node: usize,
    /// Nodes and items allocated up front in each pool.
    pub pool_size: usize,
    /// With the default `KeepInParent`, a split node above `max_level` can
    /// still hold items in its own list: those overlapping more than one of
    /// its children. Only `FirstQuadrant` sinks every item it can.
    pub straddle_policy: StraddlePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_level: 6,
            max_items_per_node: 4,
            pool_size: 32,
            straddle_policy: StraddlePolicy::KeepInParent,
        }
    }
}
