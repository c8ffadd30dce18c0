extern crate dtn_aodv;

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

use dtn_aodv::router::config::RouterConfig;
use dtn_aodv::router::Router;
use dtn_aodv::substrate::Substrate;
use dtn_aodv::tests::common::*;
use dtn_aodv::DtnAodvError;
use slog::Logger;


/***********************************************/
/**************** Helper functions *************/
/***********************************************/

/// A set of nodes whose transfers are carried out by hand after every tick.
pub struct Network {
    pub nodes: Vec<TestNode>,
}

impl Network {
    /// Builds a network from a list of nodes and the links between them.
    pub fn new(
        names: &[&str],
        links: &[(&str, &str)],
        config: RouterConfig,
        logger: &Logger,
    ) -> Result<Network, DtnAodvError> {
        let mut nodes = Vec::new();
        for name in names {
            nodes.push(TestNode::new(name, config.clone(), logger.clone())?);
        }
        let mut net = Network { nodes };
        for (a, b) in links {
            net.link(a, b);
        }
        Ok(net)
    }

    pub fn link(&mut self, a: &str, b: &str) {
        self.node_mut(a).host.connect(b);
        self.node_mut(b).host.connect(a);
    }

    /// Takes the link between `a` and `b` down and notifies both routers.
    pub fn unlink(&mut self, a: &str, b: &str) {
        for (me, peer) in &[(a, b), (b, a)] {
            let node = self.node_mut(me);
            if let Some(conn) = node.host.disconnect(peer) {
                node.router.on_connection_down(&node.host, &conn);
            }
        }
    }

    /// Moves `name` to the given coordinates.
    pub fn place(&mut self, name: &str, x: f64, y: f64) {
        let node = self.node_mut(name);
        let host = std::mem::replace(&mut node.host, SimulatedNode::default());
        node.host = host.at(x, y);
    }

    pub fn node(&self, name: &str) -> &TestNode {
        self.nodes
            .iter()
            .find(|n| n.host.name == name)
            .expect("Unknown node")
    }

    pub fn node_mut(&mut self, name: &str) -> &mut TestNode {
        self.nodes
            .iter_mut()
            .find(|n| n.host.name == name)
            .expect("Unknown node")
    }

    pub fn set_clock(&mut self, now: f64) {
        for n in self.nodes.iter_mut() {
            n.host.set_clock(now);
        }
    }

    /// Ticks every node in order, handing each started transfer to its peer right away.
    /// The sender learns about every transfer its peer took in.
    pub fn round(&mut self) -> Result<(), DtnAodvError> {
        for i in 0..self.nodes.len() {
            self.nodes[i].tick()?;
            let from = self.nodes[i].host.name.clone();
            let transfers = std::mem::replace(&mut self.nodes[i].host.transfers, Vec::new());
            for (msg, peer) in transfers {
                let msg_id = msg.get_msg_id().to_string();
                let code = self.node_mut(&peer).receive(msg, &from)?;
                if code.is_accepted() {
                    let sender = &mut self.nodes[i];
                    sender
                        .router
                        .on_message_delivered(&sender.host, &msg_id, &peer);
                }
            }
        }
        Ok(())
    }

    pub fn run(&mut self, rounds: usize) -> Result<(), DtnAodvError> {
        for _ in 0..rounds {
            self.round()?;
        }
        Ok(())
    }

    pub fn has_message(&self, node: &str, msg_id: &str) -> bool {
        self.node(node).host.has_message(msg_id)
    }
}
