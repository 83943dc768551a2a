pub mod bucket_array;
pub mod node_pool;
pub mod recency_list;
pub mod sizing;

pub use bucket_array::{BucketArray, ChainLinks, ChainNode, ChainProbe};
pub use node_pool::{MAX_POOLED_NODES, NodeId, NodePool, Relocation};
pub use recency_list::{RecencyLinks, RecencyList, RecencyNode};
pub use sizing::{MAX_CAPACITY, MIN_BUCKETS};
