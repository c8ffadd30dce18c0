use crate::logging;
use crate::message::Message;
use crate::mobility::Position;
use crate::router::config::RouterConfig;
use crate::router::{DtnAodv, Router};
use crate::substrate::{Connection, ReceiveCode, Substrate, TransferOutcome};
use crate::{DtnAodvError, DtnAodvErrorKind, NodeId};

use slog::Logger;
use std::env;
use std::path::PathBuf;

/***********************************************/
/***************  Test Data Types  *************/
/***********************************************/
pub type TestResult<T = ()> = std::result::Result<T, Box<dyn std::error::Error>>;

/// In-memory host for a single node. Transfers are only recorded; moving the message
/// to the peer is up to the test.
#[derive(Debug, Default)]
pub struct SimulatedNode {
    pub name: NodeId,
    pub location: Position,
    pub clock: f64,
    pub connections: Vec<Connection>,
    pub store: Vec<Message>,
    /// Messages for which this node was the final recipient
    pub delivered: Vec<Message>,
    /// (message, peer) of every transfer started
    pub transfers: Vec<(Message, NodeId)>,
    pub transferring: bool,
    pub busy_peers: Vec<NodeId>,
    blocked: bool,
    /// Number of upcoming `add_message` calls the store will refuse
    refused_adds: usize,
}

impl SimulatedNode {
    pub fn new(name: &str) -> Self {
        SimulatedNode {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_connections(mut self, peers: &[&str]) -> Self {
        for p in peers {
            self.connect(p);
        }
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.location = Position::new(x, y);
        self
    }

    pub fn connect(&mut self, peer: &str) {
        if !self.connections.iter().any(|c| c.peer == peer) {
            self.connections.push(Connection::new(peer.to_string()));
        }
    }

    /// Drops the link to `peer` and returns it, marked as down.
    pub fn disconnect(&mut self, peer: &str) -> Option<Connection> {
        let pos = self.connections.iter().position(|c| c.peer == peer)?;
        Some(self.connections.remove(pos).down())
    }

    pub fn set_clock(&mut self, now: f64) {
        self.clock = now;
    }

    pub fn set_transferring(&mut self, transferring: bool) {
        self.transferring = transferring;
    }

    pub fn set_can_start(&mut self, can_start: bool) {
        self.blocked = !can_start;
    }

    /// Makes the store refuse the next `count` insertions, as a full store would.
    pub fn refuse_next_adds(&mut self, count: usize) {
        self.refused_adds = count;
    }

    pub fn clear_transfers(&mut self) {
        self.transfers.clear();
    }

    /// Peers `msg_id` was handed to, in order.
    pub fn transfers_of(&self, msg_id: &str) -> Vec<NodeId> {
        self.transfers
            .iter()
            .filter(|(m, _)| m.get_msg_id() == msg_id)
            .map(|(_, peer)| peer.clone())
            .collect()
    }

    pub fn find_message(&self, msg_id: &str) -> Option<&Message> {
        self.store.iter().find(|m| m.get_msg_id() == msg_id)
    }

    pub fn was_delivered(&self, msg_id: &str) -> bool {
        self.delivered.iter().any(|m| m.get_msg_id() == msg_id)
    }
}

impl Substrate for SimulatedNode {
    fn me(&self) -> NodeId {
        self.name.clone()
    }

    fn now(&self) -> f64 {
        self.clock
    }

    fn location(&self) -> Position {
        self.location
    }

    fn connections(&self) -> Vec<Connection> {
        self.connections.clone()
    }

    fn is_transferring(&self) -> bool {
        self.transferring
    }

    fn can_start_transfer(&self) -> bool {
        !self.blocked
    }

    fn start_transfer(&mut self, msg: &Message, connection: &Connection) -> TransferOutcome {
        if !connection.up || !self.connections.iter().any(|c| c.peer == connection.peer) {
            return TransferOutcome::Refused;
        }
        if self.transferring || self.busy_peers.contains(&connection.peer) {
            return TransferOutcome::Busy;
        }
        self.transfers.push((msg.clone(), connection.peer.clone()));
        TransferOutcome::Started
    }

    fn messages(&self) -> Vec<Message> {
        self.store.clone()
    }

    fn has_message(&self, msg_id: &str) -> bool {
        self.find_message(msg_id).is_some()
    }

    fn add_message(&mut self, msg: Message) -> Result<(), DtnAodvError> {
        if self.refused_adds > 0 {
            self.refused_adds -= 1;
            let err_msg = String::from("Message store full");
            return Err(DtnAodvErrorKind::Storage(err_msg).into());
        }
        if self.has_message(msg.get_msg_id()) {
            let err_msg = format!("Message {} already stored", msg.get_msg_id());
            return Err(DtnAodvErrorKind::Storage(err_msg).into());
        }
        self.store.push(msg);
        Ok(())
    }

    fn delete_message(&mut self, msg_id: &str) -> bool {
        let before = self.store.len();
        self.store.retain(|m| m.get_msg_id() != msg_id);
        self.store.len() != before
    }

    fn accept(&mut self, msg: Message, _from: &str) -> ReceiveCode {
        if msg.destination == self.name {
            self.delivered.push(msg);
            return ReceiveCode::Delivered;
        }
        if self.has_message(msg.get_msg_id()) {
            return ReceiveCode::DeniedDuplicate;
        }
        self.store.push(msg);
        ReceiveCode::Accepted
    }
}

/// A node and its router, driven together by the tests.
#[derive(Debug)]
pub struct TestNode {
    pub host: SimulatedNode,
    pub router: DtnAodv,
}

impl TestNode {
    pub fn new(name: &str, config: RouterConfig, logger: Logger) -> Result<Self, DtnAodvError> {
        Ok(TestNode {
            host: SimulatedNode::new(name),
            router: DtnAodv::new(config, logger)?,
        })
    }

    pub fn tick(&mut self) -> Result<(), DtnAodvError> {
        self.router.on_tick(&mut self.host)
    }

    pub fn receive(&mut self, msg: Message, from: &str) -> Result<ReceiveCode, DtnAodvError> {
        self.router.on_receive(&mut self.host, msg, from)
    }
}

/*******************************************
*********** Utility functions *************
********************************************/
pub fn get_tests_root() -> PathBuf {
    let test_home = env::var("DTN_AODV_TEST_DIR").unwrap_or_else(|_| String::from("/tmp/"));
    PathBuf::from(test_home)
}

/// Path of the log file for `test_name`, under the tests root.
pub fn test_log_file(test_name: &str) -> PathBuf {
    let mut path = get_tests_root();
    path.push("dtn_aodv");
    path.push(format!("{}.log", test_name));
    path
}

/// Logger for tests that do not inspect their logs.
pub fn quiet_logger() -> Logger {
    logging::create_discard_logger()
}
