// Peer-to-peer node: gossip protocol, mempool and validator loop

mod mempool;
mod message;
mod node;
mod peer;

pub use mempool::Mempool;
pub use message::{Message, Version, read_message, write_message};
pub use node::Node;
pub use peer::PeerClient;
