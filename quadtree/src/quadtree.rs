mod config;
mod item;
mod node;
mod pool;
mod tree;

pub use config::{Config, StraddlePolicy};
pub use item::{Item, ItemHandle};
pub use node::Quadrant;
pub use pool::PoolUsage;
pub use tree::{NodeView, PoolStats, QuadTree, Retrieved};
