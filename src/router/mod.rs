//! Reactive route discovery for delay-tolerant networks, modelled on AODV.
//! Routes are discovered on demand by flooding route requests and learnt back from the
//! provenance of the requests and replies that cross the node. Messages without a known
//! route stay queued at the host until a reply brings one in.
use crate::logging::log_handle_message;
use crate::message::{Message, MessageKind, MessageStatus};
use crate::substrate::{Connection, ReceiveCode, Substrate, TransferOutcome};
use crate::{DtnAodvError, NodeId};

use slog::Logger;
use std::collections::HashSet;

// **************************************************
// ************ Sub-modules ************
// **************************************************
pub mod config;
pub mod routing_table;
pub mod strategies;
pub mod suppressor;
pub mod throttle;

use self::config::RouterConfig;
use self::routing_table::RoutingTable;
use self::suppressor::DuplicateSuppressor;
use self::throttle::RequestThrottle;

/// Events the host delivers to the router of a node.
pub trait Router: std::fmt::Debug {
    /// Periodic update. Flushes deferred deletions and tries to move queued messages.
    fn on_tick(&mut self, host: &mut dyn Substrate) -> Result<(), DtnAodvError>;

    /// An inbound message from the neighbour `from`. The return value tells the host
    /// whether the message was taken in.
    fn on_receive(
        &mut self,
        host: &mut dyn Substrate,
        msg: Message,
        from: &str,
    ) -> Result<ReceiveCode, DtnAodvError>;

    /// A link changed state. Only links going down are of interest.
    fn on_connection_down(&mut self, host: &dyn Substrate, connection: &Connection);

    /// A transfer of `msg_id` to `to` completed.
    fn on_message_delivered(&mut self, host: &dyn Substrate, msg_id: &str, to: &str);

    /// A router with the same settings and fresh state, for another node.
    fn replicate(&self) -> Box<dyn Router>;
}

/// Router state of a single node.
#[derive(Debug)]
pub struct DtnAodv {
    config: RouterConfig,
    rreq_seq_no: u32,
    rrep_seq_no: u32,
    routing_table: RoutingTable,
    throttle: RequestThrottle,
    /// Requests this node already answered
    answered_requests: DuplicateSuppressor,
    /// Requests this node already took in or originated
    processed_requests: DuplicateSuppressor,
    /// Messages to drop from the host's store at the start of the next tick
    pending_deletions: HashSet<String>,
    logger: Logger,
}

impl DtnAodv {
    /// Creates a new router after validating its configuration.
    pub fn new(config: RouterConfig, logger: Logger) -> Result<DtnAodv, DtnAodvError> {
        config.validate()?;
        Ok(DtnAodv::build(config, logger))
    }

    fn build(config: RouterConfig, logger: Logger) -> DtnAodv {
        DtnAodv {
            rreq_seq_no: 0,
            rrep_seq_no: 0,
            routing_table: RoutingTable::new(config.route_selection.build_strategy()),
            throttle: RequestThrottle::new(config.rreq_retry_interval),
            answered_requests: DuplicateSuppressor::new(config.request_memory_size),
            processed_requests: DuplicateSuppressor::new(config.request_memory_size),
            pending_deletions: HashSet::new(),
            config,
            logger,
        }
    }

    /// A fresh router with the same configuration and logger as this one.
    pub fn replicate_node(&self) -> DtnAodv {
        DtnAodv::build(self.config.clone(), self.logger.clone())
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    pub fn throttle(&self) -> &RequestThrottle {
        &self.throttle
    }

    /// Whether `msg_id` will be removed from the store on the next tick.
    pub fn is_pending_deletion(&self, msg_id: &str) -> bool {
        self.pending_deletions.contains(msg_id)
    }

    /// Whether a request with this id was already taken in or originated here.
    pub fn has_processed_request(&self, msg_id: &str) -> bool {
        self.processed_requests.has_handled(msg_id)
    }

    fn clear_pending_deletions(&mut self, host: &mut dyn Substrate) {
        for msg_id in self.pending_deletions.drain() {
            if host.delete_message(&msg_id) {
                debug!(self.logger, "Message deleted"; "msg_id"=>&msg_id);
            }
        }
    }

    /// Learns the reverse route carried by a stored message.
    fn save_to_routing_table(&mut self, me: &str, msg: &Message) {
        let (next_hop, hop_count, distance) = match msg.reverse_route() {
            Some(route) => route,
            None => return,
        };
        if self
            .routing_table
            .record_observation(me, &msg.origin, next_hop, hop_count, distance)
        {
            info!(
                self.logger,
                "Updating route";
                "node"=>me,
                "destination"=>&msg.origin,
                "next_hop"=>next_hop,
                "hop_count"=>hop_count,
                "distance"=>distance,
            );
        }
    }

    fn skip_looped_message(&mut self, me: &str, msg: &Message) -> bool {
        if !msg.has_looped_through(me) {
            return false;
        }
        log_handle_message(
            &self.logger,
            msg,
            MessageStatus::DROPPED,
            Some("Message looped back"),
            None,
        );
        self.pending_deletions.insert(msg.get_msg_id().to_string());
        true
    }

    /// Offers `msg` to every open link. Returns the number of transfers started.
    fn broadcast(&self, host: &mut dyn Substrate, msg: &Message) -> usize {
        let mut started = 0;
        for conn in host.connections().iter().filter(|c| c.up) {
            match host.start_transfer(msg, conn) {
                TransferOutcome::Started => started += 1,
                outcome => {
                    debug!(self.logger, "Transfer not started"; "msg_id"=>msg.get_msg_id(), "peer"=>&conn.peer, "outcome"=>format!("{:?}", outcome));
                }
            }
        }
        if started > 0 {
            let reason = format!("Flooded over {} links", started);
            log_handle_message(
                &self.logger,
                msg,
                MessageStatus::FORWARDING,
                Some(&reason),
                None,
            );
        }
        started
    }

    /// Hands `msg` to the link towards `next_hop`, if that neighbour is in range.
    fn send_message(&self, host: &mut dyn Substrate, msg: &Message, next_hop: &str) -> bool {
        let conn = match host
            .connections()
            .into_iter()
            .find(|c| c.up && c.peer == next_hop)
        {
            Some(c) => c,
            None => {
                debug!(self.logger, "Next hop not in range"; "msg_id"=>msg.get_msg_id(), "next_hop"=>next_hop);
                return false;
            }
        };
        match host.start_transfer(msg, &conn) {
            TransferOutcome::Started => {
                let status = if msg.origin == host.me() && msg.hops() == 0 {
                    MessageStatus::SENT
                } else {
                    MessageStatus::FORWARDING
                };
                log_handle_message(&self.logger, msg, status, None, Some(next_hop));
                true
            }
            outcome => {
                debug!(self.logger, "Transfer not started"; "msg_id"=>msg.get_msg_id(), "peer"=>next_hop, "outcome"=>format!("{:?}", outcome));
                false
            }
        }
    }

    /// Forwards along the best known route, or asks for one.
    fn route_or_discover(
        &mut self,
        host: &mut dyn Substrate,
        msg: &Message,
    ) -> Result<(), DtnAodvError> {
        match self.routing_table.next_hop(&msg.destination).cloned() {
            Some(next_hop) => {
                self.send_message(host, msg, &next_hop);
            }
            None => {
                if self.ask_for_route(host, &msg.destination)? {
                    log_handle_message(
                        &self.logger,
                        msg,
                        MessageStatus::QUEUED,
                        Some("Route discovery started"),
                        None,
                    );
                }
            }
        }
        Ok(())
    }

    /// Originates and floods a route request towards `destination`, unless one was
    /// issued too recently. Returns whether a request was sent.
    /// The request id and the throttle window are only used up once the host stored
    /// the request.
    fn ask_for_route(
        &mut self,
        host: &mut dyn Substrate,
        destination: &str,
    ) -> Result<bool, DtnAodvError> {
        let now = host.now();
        if !self.throttle.is_open(destination, now) {
            return Ok(false);
        }
        let rreq_id = self.rreq_seq_no;
        let mut rreq = Message::route_request(host.me(), destination.to_string(), rreq_id);
        rreq.stamp_origin(host.location());
        host.add_message(rreq.clone())?;

        self.rreq_seq_no += 1;
        self.throttle.record(destination, now);
        self.processed_requests.mark_handled(rreq.get_msg_id());
        info!(self.logger, "Initiated RREQ"; "rreq_id" => rreq_id, "msg_id"=>rreq.get_msg_id(), "destination"=>destination);
        self.broadcast(host, &rreq);
        Ok(true)
    }

    /// The destination of `rreq` answers it, once per request.
    fn reply_to_request(
        &mut self,
        host: &mut dyn Substrate,
        rreq: &Message,
    ) -> Result<(), DtnAodvError> {
        if self.answered_requests.has_handled(rreq.get_msg_id()) {
            return Ok(());
        }
        let me = host.me();
        let mut rrep =
            Message::route_reply(me.clone(), rreq.origin.clone(), self.rrep_seq_no, &me);
        rrep.stamp_origin(host.location());
        self.queue_reply(host, rreq, rrep, None)
    }

    /// A node with a cached route to the requested destination answers on its behalf.
    fn reply_on_behalf(
        &mut self,
        host: &mut dyn Substrate,
        rreq: &Message,
    ) -> Result<(), DtnAodvError> {
        let entry = match self.routing_table.lookup_best_route(&rreq.destination) {
            Some(entry) => entry.clone(),
            None => return Ok(()),
        };
        //A route through the requester's own path is of no use to it
        if rreq.hop_path.contains(&entry.next_hop) {
            return Ok(());
        }
        if self.answered_requests.has_handled(rreq.get_msg_id()) {
            return Ok(());
        }
        let me = host.me();
        let mut rrep = Message::route_reply(
            rreq.destination.clone(),
            rreq.origin.clone(),
            self.rrep_seq_no,
            &me,
        );
        rrep.advertised_hops = entry.hop_count.round() as u32;
        rrep.distance_travelled = entry.distance;
        rrep.stamp_origin(host.location());
        self.queue_reply(host, rreq, rrep, Some("Cached route"))
    }

    /// Stores `rrep` as the answer to `rreq`. The request only counts as answered, and the
    /// reply id as used, once the host accepted the reply.
    fn queue_reply(
        &mut self,
        host: &mut dyn Substrate,
        rreq: &Message,
        rrep: Message,
        reason: Option<&str>,
    ) -> Result<(), DtnAodvError> {
        host.add_message(rrep.clone())?;
        self.rrep_seq_no += 1;
        self.answered_requests.mark_handled(rreq.get_msg_id());
        log_handle_message(
            &self.logger,
            &rrep,
            MessageStatus::QUEUED,
            reason,
            Some("Answering route request"),
        );
        Ok(())
    }
}

impl Router for DtnAodv {
    fn on_tick(&mut self, host: &mut dyn Substrate) -> Result<(), DtnAodvError> {
        self.clear_pending_deletions(host);

        if host.is_transferring() || !host.can_start_transfer() {
            return Ok(());
        }

        let me = host.me();
        for msg in host.messages() {
            if self.pending_deletions.contains(msg.get_msg_id()) {
                continue;
            }
            if self.skip_looped_message(&me, &msg) {
                continue;
            }
            match msg.kind {
                MessageKind::RouteRequest => {
                    self.save_to_routing_table(&me, &msg);
                    self.broadcast(host, &msg);
                }
                MessageKind::RouteReply | MessageKind::Data => {
                    if let Err(e) = self.route_or_discover(host, &msg) {
                        warn!(
                            self.logger,
                            "Route discovery failed";
                            "msg_id"=>msg.get_msg_id(),
                            "reason"=>e.to_string(),
                        );
                    }
                }
            }
        }

        Ok(())
    }

    fn on_receive(
        &mut self,
        host: &mut dyn Substrate,
        msg: Message,
        from: &str,
    ) -> Result<ReceiveCode, DtnAodvError> {
        let me = host.me();
        let mut msg = msg;
        msg.record_hop(&me, host.location());

        match msg.kind {
            MessageKind::RouteRequest => {
                self.save_to_routing_table(&me, &msg);
                if msg.destination == me {
                    self.reply_to_request(host, &msg)?;
                } else if self.config.intermediate_replies {
                    self.reply_on_behalf(host, &msg)?;
                }
                if self.processed_requests.check_and_mark(msg.get_msg_id()) {
                    log_handle_message(
                        &self.logger,
                        &msg,
                        MessageStatus::DROPPED,
                        Some("DUPLICATE"),
                        None,
                    );
                    return Ok(ReceiveCode::DeniedDuplicate);
                }
            }
            MessageKind::RouteReply => {
                if msg.destination == me {
                    self.save_to_routing_table(&me, &msg);
                }
            }
            MessageKind::Data => {}
        }

        let code = host.accept(msg.clone(), from);
        if code == ReceiveCode::Delivered {
            log_handle_message(&self.logger, &msg, MessageStatus::ACCEPTED, None, None);
        }
        Ok(code)
    }

    fn on_connection_down(&mut self, _host: &dyn Substrate, connection: &Connection) {
        if connection.up {
            return;
        }
        for entry in self.routing_table.evict_by_next_hop(&connection.peer) {
            info!(
                self.logger,
                "Broken route detected";
                "destination"=>&entry.destination,
                "next_hop"=>&entry.next_hop,
            );
        }
    }

    fn on_message_delivered(&mut self, host: &dyn Substrate, msg_id: &str, to: &str) {
        if host.has_message(msg_id) {
            debug!(self.logger, "Marked for deletion"; "msg_id"=>msg_id, "delivered_to"=>to);
            self.pending_deletions.insert(msg_id.to_string());
        }
    }

    fn replicate(&self) -> Box<dyn Router> {
        Box::new(self.replicate_node())
    }
}

/// Shorthand for the route a router would use towards `destination`.
pub fn best_next_hop(router: &DtnAodv, destination: &str) -> Option<NodeId> {
    router.routing_table().next_hop(destination).cloned()
}
