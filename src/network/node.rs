// Network node - peer registry, RPC handlers, gossip and block production

use crate::chain::Chain;
use crate::core::{Block, Hash256, Header, Transaction, hash_block, hash_transaction, sign_block};
use crate::crypto::PrivateKey;
use crate::network::{Mempool, Message, PeerClient, Version, read_message, write_message};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;

/// Interval between block production attempts on validator nodes
const BLOCK_TIME: Duration = Duration::from_secs(5);

struct PeerEntry {
    client: Arc<PeerClient>,
    version: Version,
}

/// A ledger node: wraps a chain and a mempool, serves the RPC surface and
/// drives peer discovery and (for validators) block production.
pub struct Node {
    version: String,
    listen_addr: String,
    private_key: Option<PrivateKey>,
    chain: Arc<Chain>,
    mempool: Mempool,
    /// Known peers keyed by their listen address. The lock is never held
    /// across a network call.
    peers: RwLock<HashMap<String, PeerEntry>>,
}

impl Node {
    pub fn new(
        version: String,
        listen_addr: String,
        private_key: Option<PrivateKey>,
        chain: Arc<Chain>,
    ) -> Self {
        Self {
            version,
            listen_addr,
            private_key,
            chain,
            mempool: Mempool::new(),
            peers: RwLock::new(HashMap::new()),
        }
    }

    pub fn chain(&self) -> &Arc<Chain> {
        &self.chain
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    /// Bind the listener, spawn bootstrap and (for validators) the block
    /// production loop, then serve connections until the process exits.
    pub async fn start(self: Arc<Self>, bootstrap: Vec<String>) -> Result<(), String> {
        let listener = TcpListener::bind(&self.listen_addr)
            .await
            .map_err(|e| format!("failed to bind {}: {}", self.listen_addr, e))?;

        log::info!("[{}] node started", self.listen_addr);

        if !bootstrap.is_empty() {
            let node = self.clone();
            tokio::spawn(async move {
                if let Err(e) = node.clone().bootstrap_network(bootstrap).await {
                    log::error!("[{}] bootstrap error: {}", node.listen_addr, e);
                }
            });
        }

        if self.private_key.is_some() {
            let node = self.clone();
            tokio::spawn(async move { node.validator_loop().await });
        }

        loop {
            let (stream, remote) = listener
                .accept()
                .await
                .map_err(|e| format!("failed to accept connection: {}", e))?;

            log::debug!("[{}] connection from {}", self.listen_addr, remote);

            let node = self.clone();
            tokio::spawn(async move {
                if let Err(e) = node.handle_connection(stream).await {
                    log::debug!("connection from {} closed: {}", remote, e);
                }
            });
        }
    }

    /// Serve request/response frames on one inbound connection
    async fn handle_connection(self: Arc<Self>, mut stream: TcpStream) -> Result<(), String> {
        loop {
            let request = read_message(&mut stream).await?;

            let response = match request {
                Message::Handshake(v) => match self.clone().handshake(v).await {
                    Ok(our_version) => Message::Version(our_version),
                    Err(e) => Message::Error(e),
                },
                Message::Tx(tx) => self.handle_transaction(tx).await,
                Message::Block(block) => self.handle_block(*block).await,
                other => Message::Error(format!("unexpected message: {}", other.type_str())),
            };

            write_message(&mut stream, &response).await?;
        }
    }

    /// Transaction submission/gossip entry point. New transactions are pooled
    /// and re-broadcast; duplicates are dropped. Always acks.
    pub async fn handle_transaction(&self, tx: Transaction) -> Message {
        let hash = hash_transaction(&tx).to_hex();

        if self.mempool.add(tx.clone()) {
            log::info!("[{}] received tx {}", self.listen_addr, hash);

            let clients = self.peer_clients().await;
            tokio::spawn(broadcast_transaction(clients, tx));
        }

        Message::Ack
    }

    /// Block gossip entry point: committed through the chain and re-broadcast
    /// on success. Rejections are logged, not returned - gossip sinks ack
    /// unconditionally.
    pub async fn handle_block(&self, block: Block) -> Message {
        let hash = hash_block(&block).to_hex();

        match self.chain.add_block(block.clone()) {
            Ok(()) => {
                log::info!(
                    "[{}] accepted block {} at height {}",
                    self.listen_addr,
                    hash,
                    self.chain.height()
                );
                let clients = self.peer_clients().await;
                tokio::spawn(broadcast_block(clients, block));
            }
            Err(e) => {
                log::debug!("[{}] rejected block {}: {}", self.listen_addr, hash, e);
            }
        }

        Message::Ack
    }

    /// Handshake: dial back the caller's advertised listen address, record it
    /// as a peer and answer with our own version. A failed dial-back fails
    /// the handshake.
    pub async fn handshake(self: Arc<Self>, remote: Version) -> Result<Version, String> {
        let client = Arc::new(PeerClient::connect(&remote.listen_addr).await?);
        let our_version = self.our_version().await;
        self.add_peer(client, remote).await;
        Ok(our_version)
    }

    /// Dial and handshake every viable candidate. The first dial or handshake
    /// failure aborts the remaining candidates of this call. Boxed because
    /// `add_peer` spawns a transitive bootstrap, making this future recursive.
    pub fn bootstrap_network(
        self: Arc<Self>,
        addrs: Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send>> {
        Box::pin(async move {
            for addr in addrs {
                if !self.can_connect_with(&addr).await {
                    continue;
                }

                log::debug!("[{}] dialing remote {}", self.listen_addr, addr);
                let client = Arc::new(PeerClient::connect(&addr).await?);
                let version = client.handshake(&self.our_version().await).await?;

                self.clone().add_peer(client, version).await;
            }
            Ok(())
        })
    }

    /// Record a peer. A non-empty remote peer list triggers a transitive
    /// bootstrap over it, which is how peer knowledge spreads without a
    /// central directory.
    pub async fn add_peer(self: Arc<Self>, client: Arc<PeerClient>, version: Version) {
        let peer_list = version.peer_list.clone();

        log::info!(
            "[{}] new peer {} (height {})",
            self.listen_addr,
            version.listen_addr,
            version.height
        );

        self.peers
            .write()
            .await
            .insert(version.listen_addr.clone(), PeerEntry { client, version });

        if !peer_list.is_empty() {
            let node = self.clone();
            tokio::spawn(async move {
                if let Err(e) = node.clone().bootstrap_network(peer_list).await {
                    log::debug!("[{}] transitive bootstrap error: {}", node.listen_addr, e);
                }
            });
        }
    }

    /// Drop a peer whose connection handle has become unusable
    pub async fn remove_peer(&self, listen_addr: &str) {
        self.peers.write().await.remove(listen_addr);
    }

    /// Whether an address is worth dialing: not ourselves, not already known
    async fn can_connect_with(&self, addr: &str) -> bool {
        if addr == self.listen_addr {
            return false;
        }
        !self.peer_list().await.iter().any(|peer| peer == addr)
    }

    /// Listen addresses of all known peers
    pub async fn peer_list(&self) -> Vec<String> {
        self.peers
            .read()
            .await
            .values()
            .map(|entry| entry.version.listen_addr.clone())
            .collect()
    }

    async fn peer_clients(&self) -> Vec<Arc<PeerClient>> {
        self.peers
            .read()
            .await
            .values()
            .map(|entry| entry.client.clone())
            .collect()
    }

    async fn our_version(&self) -> Version {
        Version {
            version: self.version.clone(),
            height: self.chain.height() as u32,
            listen_addr: self.listen_addr.clone(),
            peer_list: self.peer_list().await,
        }
    }

    /// Periodically turn the pooled transactions into a new signed block,
    /// commit it and broadcast it.
    async fn validator_loop(self: Arc<Self>) {
        let priv_key = self
            .private_key
            .clone()
            .expect("validator loop requires a private key");

        log::info!(
            "[{}] starting validator loop (block time {:?})",
            self.listen_addr,
            BLOCK_TIME
        );

        let mut interval = tokio::time::interval(BLOCK_TIME);
        // the first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            self.produce_block(&priv_key).await;
        }
    }

    /// Assemble the pooled transactions into a new signed block, commit it
    /// and broadcast it. Drained transactions that no longer validate (for
    /// example settled by a gossiped block in the meantime) are dropped
    /// individually instead of poisoning the rest of the batch.
    async fn produce_block(&self, priv_key: &PrivateKey) {
        let drained = self.mempool.take_all();
        if drained.is_empty() {
            return;
        }

        let txs: Vec<Transaction> = drained
            .into_iter()
            .filter(|tx| match self.chain.validate_transaction(tx) {
                Ok(()) => true,
                Err(e) => {
                    log::debug!(
                        "[{}] dropping pooled tx {}: {}",
                        self.listen_addr,
                        hash_transaction(tx).to_hex(),
                        e
                    );
                    false
                }
            })
            .collect();

        if txs.is_empty() {
            return;
        }

        log::info!(
            "[{}] producing block with {} txs",
            self.listen_addr,
            txs.len()
        );

        let tip = match self.chain.get_block_by_height(self.chain.height()) {
            Ok(block) => block,
            Err(e) => {
                log::error!("[{}] failed to load tip: {}", self.listen_addr, e);
                return;
            }
        };

        let header = Header::new(
            1,
            hash_block(&tip),
            Hash256::zero(),
            self.chain.height() as u32 + 1,
            unix_now(),
        );
        let mut block = Block::new(header, txs);
        sign_block(priv_key, &mut block);

        match self.chain.add_block(block.clone()) {
            Ok(()) => {
                log::info!(
                    "[{}] committed block {} at height {}",
                    self.listen_addr,
                    hash_block(&block).to_hex(),
                    self.chain.height()
                );
                let clients = self.peer_clients().await;
                tokio::spawn(broadcast_block(clients, block));
            }
            Err(e) => {
                log::error!("[{}] produced block rejected: {}", self.listen_addr, e);
            }
        }
    }
}

/// Best-effort fan-out: per-peer errors are logged and swallowed
async fn broadcast_transaction(clients: Vec<Arc<PeerClient>>, tx: Transaction) {
    for client in clients {
        if let Err(e) = client.send_transaction(&tx).await {
            log::error!("tx broadcast to {} failed: {}", client.addr(), e);
        }
    }
}

async fn broadcast_block(clients: Vec<Arc<PeerClient>>, block: Block) {
    for client in clients {
        if let Err(e) = client.send_block(&block).await {
            log::error!("block broadcast to {} failed: {}", client.addr(), e);
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{GENESIS_AMOUNT, GENESIS_SEED, MemoryBlockStore, MemoryTxStore, genesis_block};
    use crate::core::{TxInput, TxOutput, sign_transaction};

    fn new_node(listen_addr: &str) -> Arc<Node> {
        let chain = Arc::new(Chain::new(
            Box::new(MemoryBlockStore::new()),
            Box::new(MemoryTxStore::new()),
        ));
        Arc::new(Node::new(
            "picochain-test".to_string(),
            listen_addr.to_string(),
            None,
            chain,
        ))
    }

    fn dummy_tx(marker: u8) -> Transaction {
        Transaction::new(
            vec![TxInput::new(Hash256::new([marker; 32]), 0, vec![marker; 32])],
            vec![TxOutput::new(marker as u64, vec![marker; 20])],
        )
    }

    /// A signed single-input transaction spending one output of `prev_tx`
    fn signed_spend(
        key: &PrivateKey,
        prev_tx: &Transaction,
        out_index: u32,
        outputs: Vec<TxOutput>,
    ) -> Transaction {
        let input = TxInput::new(
            hash_transaction(prev_tx),
            out_index,
            key.public().to_bytes().to_vec(),
        );
        let mut tx = Transaction::new(vec![input], outputs);
        let sig = sign_transaction(key, &tx);
        tx.inputs[0].signature = sig.to_bytes().to_vec();
        tx
    }

    fn next_block(chain: &Chain, key: &PrivateKey, txs: Vec<Transaction>) -> Block {
        let tip = chain.get_block_by_height(chain.height()).unwrap();
        let header = Header::new(
            1,
            hash_block(&tip),
            Hash256::zero(),
            chain.height() as u32 + 1,
            1700000000,
        );
        let mut block = Block::new(header, txs);
        sign_block(key, &mut block);
        block
    }

    #[tokio::test]
    async fn test_handle_transaction_pools_and_acks() {
        let node = new_node("127.0.0.1:0");
        let tx = dummy_tx(1);

        assert!(matches!(
            node.handle_transaction(tx.clone()).await,
            Message::Ack
        ));
        assert!(node.mempool().has(&tx));

        // duplicate still acks, pool unchanged
        assert!(matches!(node.handle_transaction(tx).await, Message::Ack));
        assert_eq!(node.mempool().len(), 1);
    }

    #[tokio::test]
    async fn test_handle_block_rejects_unlinked_block_but_acks() {
        let node = new_node("127.0.0.1:0");

        let priv_key = PrivateKey::generate();
        let header = Header::new(1, Hash256::new([9; 32]), Hash256::zero(), 1, 0);
        let mut block = Block::new(header, vec![]);
        sign_block(&priv_key, &mut block);

        assert!(matches!(node.handle_block(block).await, Message::Ack));
        assert_eq!(node.chain().height(), 0);
    }

    #[tokio::test]
    async fn test_can_connect_with() {
        let node = new_node("127.0.0.1:3000");
        assert!(!node.can_connect_with("127.0.0.1:3000").await);
        assert!(node.can_connect_with("127.0.0.1:4000").await);
    }

    #[tokio::test]
    async fn test_our_version_reflects_state() {
        let node = new_node("127.0.0.1:3000");
        let version = node.our_version().await;

        assert_eq!(version.listen_addr, "127.0.0.1:3000");
        assert_eq!(version.height, 0);
        assert!(version.peer_list.is_empty());
    }

    #[tokio::test]
    async fn test_produce_block_drops_settled_txs_keeps_valid_ones() {
        let node = new_node("127.0.0.1:0");
        let producer = PrivateKey::generate();

        let genesis_key = PrivateKey::from_seed_hex(GENESIS_SEED).unwrap();
        let recipient = PrivateKey::generate();

        let settled = signed_spend(
            &genesis_key,
            &genesis_block().transactions[0],
            0,
            vec![TxOutput::new(
                GENESIS_AMOUNT,
                recipient.public().address().as_bytes().to_vec(),
            )],
        );

        // the first spend lands in a block, as if gossiped by a peer
        let block = next_block(node.chain(), &producer, vec![settled.clone()]);
        node.chain().add_block(block).unwrap();

        // both end up pooled: the settled spend and a fresh spend of its output
        let fresh = signed_spend(
            &recipient,
            &settled,
            0,
            vec![TxOutput::new(GENESIS_AMOUNT, vec![9u8; 20])],
        );
        node.mempool().add(settled);
        node.mempool().add(fresh.clone());

        node.produce_block(&producer).await;

        // the settled tx is dropped and must not sink the fresh one
        assert_eq!(node.chain().height(), 2);
        let produced = node.chain().get_block_by_height(2).unwrap();
        assert_eq!(produced.transactions, vec![fresh]);
        assert!(node.mempool().is_empty());
    }

    #[tokio::test]
    async fn test_produce_block_skips_when_nothing_validates() {
        let node = new_node("127.0.0.1:0");
        let producer = PrivateKey::generate();

        node.mempool().add(dummy_tx(1));
        node.produce_block(&producer).await;

        assert_eq!(node.chain().height(), 0);
        assert!(node.mempool().is_empty());
    }

    #[tokio::test]
    async fn test_remove_peer_is_a_noop_for_unknown_address() {
        let node = new_node("127.0.0.1:3000");
        node.remove_peer("127.0.0.1:9999").await;
        assert!(node.peer_list().await.is_empty());
    }
}
