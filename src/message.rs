//! Messages handled by the router. The store that holds them, their lifetime and the
//! mechanics of moving them over a link all belong to the host; the router only reads
//! their provenance and decides where they go next.
use crate::mobility::{self, Position};
use crate::{DtnAodvError, DtnAodvErrorKind, NodeId};
use serde_cbor::de::*;
use serde_cbor::ser::*;
use slog::{Key, Record, Serializer, Value, KV};
use std::fmt;

/// The kinds of message the router distinguishes.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Flooded control message looking for a route to its destination.
    RouteRequest,
    /// Control message advertising a route back to the requester.
    RouteReply,
    /// Application data.
    Data,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MessageKind::RouteRequest => write!(f, "RREQ"),
            MessageKind::RouteReply => write!(f, "RREP"),
            MessageKind::Data => write!(f, "DATA"),
        }
    }
}

/// A message as seen by the router.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    id: String,
    ///Type of the message
    pub kind: MessageKind,
    ///Node that created the message
    pub origin: NodeId,
    ///Node the message is meant for
    pub destination: NodeId,
    ///Every node that has held this message, starting with its origin. Append-only.
    pub hop_path: Vec<NodeId>,
    ///Sequence number assigned by the origin, per message kind
    pub request_id: u32,
    ///Where the node that last stamped this message was located at the time
    pub previous_hop_location: Option<Position>,
    ///Geometric length of the path travelled so far
    pub distance_travelled: f64,
    ///Hops of a cached route advertised by an indirect route reply
    pub advertised_hops: u32,
    ///Application payload. Empty for control messages.
    pub payload: Vec<u8>,
}

impl Message {
    /// Creates a new data message. Its id is derived from the origin, destination and payload.
    pub fn new_data(origin: NodeId, destination: NodeId, payload: Vec<u8>) -> Message {
        let id = Message::create_msg_id(&origin, &destination, &payload);
        Message {
            id,
            kind: MessageKind::Data,
            hop_path: vec![origin.clone()],
            origin,
            destination,
            request_id: 0,
            previous_hop_location: None,
            distance_travelled: 0f64,
            advertised_hops: 0,
            payload,
        }
    }

    /// Builds a route request. The id embeds origin, destination and request number.
    pub fn route_request(origin: NodeId, destination: NodeId, request_id: u32) -> Message {
        let id = format!("RREQ_{}_to_{}_{}", &origin, &destination, request_id);
        Message::control(id, MessageKind::RouteRequest, origin, destination, request_id)
    }

    /// Builds a route reply. When the replying node (`generated_by`) is not the reply's
    /// origin, the id is tagged with the replying node so relayed replies can be told apart
    /// from authoritative ones.
    pub fn route_reply(
        origin: NodeId,
        destination: NodeId,
        reply_id: u32,
        generated_by: &str,
    ) -> Message {
        let mut id = format!("RREP_{}_to_{}_{}", &origin, &destination, reply_id);
        if origin != generated_by {
            id.push_str(&format!("_gen_by_{}", generated_by));
        }
        let mut msg = Message::control(id, MessageKind::RouteReply, origin, destination, reply_id);
        msg.hop_path = vec![generated_by.to_string()];
        msg
    }

    fn control(
        id: String,
        kind: MessageKind,
        origin: NodeId,
        destination: NodeId,
        request_id: u32,
    ) -> Message {
        Message {
            id,
            kind,
            hop_path: vec![origin.clone()],
            origin,
            destination,
            request_id,
            previous_hop_location: None,
            distance_travelled: 0f64,
            advertised_hops: 0,
            payload: Vec::new(),
        }
    }

    /// Unique id of this message.
    pub fn get_msg_id(&self) -> &str {
        &self.id
    }

    /// Number of hops this message has taken so far.
    pub fn hops(&self) -> usize {
        self.hop_path.len().saturating_sub(1)
    }

    /// The node that handed this message to its current holder, if any.
    pub fn last_hop(&self) -> Option<&NodeId> {
        self.hop_path.last()
    }

    /// Total path distance once the hop into `here` is accounted for.
    pub fn observed_distance(&self, here: &Position) -> f64 {
        self.distance_travelled + mobility::hop_distance(self.previous_hop_location.as_ref(), here)
    }

    /// Route back to the origin implied by this message's provenance, as seen by its
    /// current holder: the neighbour it came from, the hop count (including any hops
    /// advertised on behalf of a cached route) and the path distance.
    /// Messages that have not left their creator carry no such route.
    pub fn reverse_route(&self) -> Option<(&NodeId, f64, f64)> {
        let n = self.hop_path.len();
        if n < 2 {
            return None;
        }
        let hop_count = f64::from(self.hops() as u32 + self.advertised_hops);
        Some((&self.hop_path[n - 2], hop_count, self.distance_travelled))
    }

    /// True if `node` already appears in the path before the current holder, meaning the
    /// message looped back to a node that held it earlier.
    pub fn has_looped_through(&self, node: &str) -> bool {
        match self.hop_path.split_last() {
            Some((_, earlier)) => earlier.iter().any(|n| n == node),
            None => false,
        }
    }

    /// Records that `node`, located at `location`, now holds this message.
    pub fn record_hop(&mut self, node: &str, location: Position) {
        self.distance_travelled = self.observed_distance(&location);
        self.previous_hop_location = Some(location);
        self.hop_path.push(node.to_string());
    }

    /// Sets the location a freshly created message starts from.
    pub fn stamp_origin(&mut self, location: Position) {
        self.previous_hop_location = Some(location);
    }

    /// Encodes this message for hosts that move messages across process boundaries.
    pub fn to_vec(&self) -> Result<Vec<u8>, DtnAodvError> {
        to_vec(self).map_err(|e| {
            let err_msg = String::from("Error serializing message");
            DtnAodvError {
                kind: DtnAodvErrorKind::Serialization(err_msg),
                cause: Some(Box::new(e)),
            }
        })
    }

    ///Creates a Message from a serialized vector of bytes.
    pub fn from_vec(data: &[u8]) -> Result<Message, DtnAodvError> {
        from_slice(data).map_err(|e| {
            let err_msg = String::from("Error deserializing data into message");
            DtnAodvError {
                kind: DtnAodvErrorKind::Serialization(err_msg),
                cause: Some(Box::new(e)),
            }
        })
    }

    fn create_msg_id(origin: &str, destination: &str, payload: &[u8]) -> String {
        let mut data = Vec::new();
        data.extend_from_slice(origin.as_bytes());
        data.extend_from_slice(destination.as_bytes());
        data.extend_from_slice(payload);

        let d = md5::compute(&data);
        format!("{:x}", d)
    }
}

impl KV for Message {
    fn serialize(&self, _rec: &Record, serializer: &mut dyn Serializer) -> slog::Result {
        serializer.emit_str("msg_id", &self.id)?;
        serializer.emit_usize("hops", self.hops())?;
        serializer.emit_str("msg_destination", &self.destination)?;
        serializer.emit_str("msg_source", &self.origin)?;
        serializer.emit_str("msg_type", &self.kind.to_string())
    }
}

/// Enum that represents the possible status of a Message as it moves through the network
pub enum MessageStatus {
    /// The message has reached its destination.
    ACCEPTED,
    /// The message has been dropped. The *reason* field should provide more data.
    DROPPED,
    /// The message has reached an intermediate node and will be forwarded.
    FORWARDING,
    /// A new message has been transmitted
    SENT,
    /// The message has been queued. This usually indicates a pending route operation.
    QUEUED,
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MessageStatus::ACCEPTED => write!(f, "ACCEPTED"),
            MessageStatus::DROPPED => write!(f, "DROPPED"),
            MessageStatus::FORWARDING => write!(f, "FORWARDING"),
            MessageStatus::SENT => write!(f, "SENT"),
            MessageStatus::QUEUED => write!(f, "QUEUED"),
        }
    }
}

impl Value for MessageStatus {
    fn serialize(&self, _rec: &Record, key: Key, serializer: &mut dyn Serializer) -> slog::Result {
        serializer.emit_str(key, &self.to_string())
    }
}
