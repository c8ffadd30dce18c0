//! Contract between the router and the simulation host that drives it.
//! The host owns the clock, the contact plan, the message store and the transfer
//! mechanics. The router reads and requests through this trait only.
use crate::message::Message;
use crate::mobility::Position;
use crate::{DtnAodvError, NodeId};
use std::fmt;

/// A link between the local node and a neighbour.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct Connection {
    /// The node at the other end of the link.
    pub peer: NodeId,
    /// Whether the link is currently up.
    pub up: bool,
}

impl Connection {
    pub fn new(peer: NodeId) -> Self {
        Connection { peer, up: true }
    }

    /// The same link, marked as down.
    pub fn down(mut self) -> Self {
        self.up = false;
        self
    }
}

/// Result of asking the host to start a transfer over a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The transfer was handed to the link.
    Started,
    /// Either end of the link is busy with another transfer.
    Busy,
    /// The host refused the transfer (link down, peer already holds the message, ...).
    Refused,
}

/// Acceptance code returned to the host for an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveCode {
    /// The message was stored for further forwarding.
    Accepted,
    /// This node is the final recipient.
    Delivered,
    /// The message (or a copy of it) was already handled.
    DeniedDuplicate,
    /// The node is busy and the sender should try later.
    DeniedBusy,
    /// The local store has no room for the message.
    DeniedNoSpace,
}

impl ReceiveCode {
    /// True if the message was taken in by this node.
    pub fn is_accepted(&self) -> bool {
        match *self {
            ReceiveCode::Accepted | ReceiveCode::Delivered => true,
            _ => false,
        }
    }
}

impl fmt::Display for ReceiveCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Services the host exposes to the router of a single node.
pub trait Substrate {
    /// Name of the node this router runs on.
    fn me(&self) -> NodeId;

    /// Current simulation time.
    fn now(&self) -> f64;

    /// Current location of the node.
    fn location(&self) -> Position;

    /// The links that are currently up.
    fn connections(&self) -> Vec<Connection>;

    /// Whether a transfer is already in progress on this node.
    fn is_transferring(&self) -> bool;

    /// Whether a new transfer could start this tick.
    fn can_start_transfer(&self) -> bool;

    /// Attempts to start transferring `msg` over `connection`. Never blocks.
    fn start_transfer(&mut self, msg: &Message, connection: &Connection) -> TransferOutcome;

    /// A snapshot of the messages queued at this node.
    fn messages(&self) -> Vec<Message>;

    /// Whether the local store holds a message with this id.
    fn has_message(&self, msg_id: &str) -> bool;

    /// Adds a locally created message to the store.
    fn add_message(&mut self, msg: Message) -> Result<(), DtnAodvError>;

    /// Removes a message from the store. Returns false if it was not there.
    fn delete_message(&mut self, msg_id: &str) -> bool;

    /// Default receipt handling of the transfer layer for an inbound message.
    fn accept(&mut self, msg: Message, from: &str) -> ReceiveCode;
}
