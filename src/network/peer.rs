// Client handle for a remote peer

use crate::core::{Block, Transaction};
use crate::network::{Message, Version, read_message, write_message};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

/// One persistent connection to a remote peer. All RPC-style exchanges go
/// through `call`, which serializes in-flight requests on the connection.
pub struct PeerClient {
    addr: String,
    stream: Mutex<TcpStream>,
}

impl PeerClient {
    /// Dial a peer
    pub async fn connect(addr: &str) -> Result<Self, String> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| format!("failed to connect to {}: {}", addr, e))?;

        Ok(Self {
            addr: addr.to_string(),
            stream: Mutex::new(stream),
        })
    }

    /// Address this client dialed
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Send one request frame and wait for the response frame
    async fn call(&self, msg: &Message) -> Result<Message, String> {
        let mut stream = self.stream.lock().await;
        write_message(&mut *stream, msg).await?;
        let response = read_message(&mut *stream).await?;

        if let Message::Error(e) = response {
            return Err(format!("rpc error from {}: {}", self.addr, e));
        }
        Ok(response)
    }

    /// Exchange versions with the remote; returns the remote's version
    pub async fn handshake(&self, our_version: &Version) -> Result<Version, String> {
        match self.call(&Message::Handshake(our_version.clone())).await? {
            Message::Version(v) => Ok(v),
            other => Err(format!(
                "expected version from {}, got {}",
                self.addr,
                other.type_str()
            )),
        }
    }

    /// Push a transaction to the remote
    pub async fn send_transaction(&self, tx: &Transaction) -> Result<(), String> {
        match self.call(&Message::Tx(tx.clone())).await? {
            Message::Ack => Ok(()),
            other => Err(format!(
                "expected ack from {}, got {}",
                self.addr,
                other.type_str()
            )),
        }
    }

    /// Push a block to the remote
    pub async fn send_block(&self, block: &Block) -> Result<(), String> {
        match self.call(&Message::Block(Box::new(block.clone()))).await? {
            Message::Ack => Ok(()),
            other => Err(format!(
                "expected ack from {}, got {}",
                self.addr,
                other.type_str()
            )),
        }
    }
}
