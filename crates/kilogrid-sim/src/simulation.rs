//! The lock-step round driver.

use kilogrid_protocol::{display, Color, Envelope, Fix, Node, Payload, Role};
use kilogrid_topology::{Layout, SlotIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::channel::ChannelModel;
use crate::config::SimulationConfig;
use crate::error::{ConfigError, Result};
use crate::events::{MeshSnapshot, NodeState, ProtocolEvent};
use crate::monitor::{best_alignment, ConvergenceMonitor, RunReport};

/// Runs the swarm one synchronous round at a time and records what
/// happened.
///
/// A round is: failure checks, every live node sends, deliveries through
/// the channel into fresh inboxes, every live node resolves. Nodes are
/// always visited in slot order, so the single seeded generator makes the
/// whole run reproducible.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    layout: Layout,
    channel: ChannelModel,
    /// Broadcast reach of each slot, fixed for the run
    reach: Vec<Vec<SlotIndex>>,
    nodes: Vec<Node>,
    /// Envelopes each slot has had delivered to others
    delivered_from: Vec<u64>,
    rng: ChaCha8Rng,
    tick: u64,
    events: Vec<ProtocolEvent>,
    monitor: ConvergenceMonitor,
}

impl Simulation {
    /// Build the layout and place a fresh robot in every slot.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let nodes = (0..config.node_count()).map(|_| Node::new(&mut rng)).collect();
        Self::assemble(config, nodes, rng)
    }

    /// Like [`Simulation::new`] with caller-built robots, one per slot in
    /// placement order.
    pub fn with_nodes(config: SimulationConfig, nodes: Vec<Node>) -> Result<Self> {
        if nodes.len() != config.node_count() {
            return Err(ConfigError::NodeCount {
                expected: config.node_count(),
                got: nodes.len(),
            });
        }
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::assemble(config, nodes, rng)
    }

    fn assemble(config: SimulationConfig, nodes: Vec<Node>, rng: ChaCha8Rng) -> Result<Self> {
        config.validate()?;
        let layout = Layout::new(config.grid_width, config.grid_height, config.spacing)?;
        let channel = ChannelModel::new(config.loss_probability, config.distance_noise)?;
        let reach = layout
            .slots()
            .map(|slot| layout.peers_within(slot, config.broadcast_radius))
            .collect();

        let events = layout
            .slots()
            .zip(&nodes)
            .map(|(slot, node)| ProtocolEvent::NodeJoined {
                slot,
                identity: node.identity(),
                true_position: layout.true_position(slot),
                tick: 0,
            })
            .collect();

        info!(
            width = config.grid_width,
            height = config.grid_height,
            seed = config.seed,
            loss = config.loss_probability,
            noise = config.distance_noise,
            "Simulation ready"
        );

        Ok(Self {
            config,
            layout,
            channel,
            reach,
            delivered_from: vec![0; nodes.len()],
            nodes,
            rng,
            tick: 0,
            events,
            monitor: ConvergenceMonitor::new(),
        })
    }

    /// Run one round. Returns the tick just completed.
    pub fn step(&mut self) -> u64 {
        self.tick += 1;
        let tick = self.tick;
        let schedule = &self.config.schedule;

        for (i, node) in self.nodes.iter_mut().enumerate() {
            if node.check_failure(tick, self.config.failure_probability, schedule, &mut self.rng) {
                self.events.push(ProtocolEvent::NodeFailed {
                    slot: SlotIndex(i),
                    tick,
                });
            }
        }

        // Send: read-only against last round's state
        let outgoing: Vec<Option<Payload>> = self.nodes.iter().map(Node::send).collect();

        let mut inboxes: Vec<Vec<Envelope>> = vec![Vec::new(); self.nodes.len()];
        let (mut delivered, mut dropped) = (0usize, 0usize);
        for (from, payload) in outgoing.into_iter().enumerate() {
            let Some(payload) = payload else {
                continue;
            };
            let sender = self.nodes[from].identity();
            for &to in &self.reach[from] {
                if self.nodes[to.value()].is_failed() {
                    continue;
                }
                if self.channel.should_drop(&mut self.rng) {
                    dropped += 1;
                    continue;
                }
                let distance = self
                    .channel
                    .measured_distance(self.layout.true_distance(SlotIndex(from), to), &mut self.rng);
                inboxes[to.value()].push(Envelope::new(sender, distance, payload.clone()));
                self.delivered_from[from] += 1;
                delivered += 1;
            }
        }

        // Resolve: the only mutation
        for (i, (node, inbox)) in self.nodes.iter_mut().zip(inboxes).enumerate() {
            let before = Milestones::of(node);
            node.resolve(tick, &inbox, schedule, &mut self.rng);
            before.record_changes(node, SlotIndex(i), tick, &mut self.events);
        }

        self.monitor.observe(tick, &self.nodes);
        trace!(tick, delivered, dropped, "Round complete");
        tick
    }

    /// Fail the robot in `slot` before the next round, outside the failure
    /// schedule. Returns false if it was already down.
    pub fn fail_node(&mut self, slot: SlotIndex) -> bool {
        let tick = self.tick;
        if !self.nodes[slot.value()].fail(tick) {
            return false;
        }
        self.events.push(ProtocolEvent::NodeFailed { slot, tick });
        info!(slot = slot.value(), tick, "Robot failed by hand");
        true
    }

    /// Step until the tick counter reaches `tick`.
    pub fn run_until(&mut self, tick: u64) {
        while self.tick < tick {
            self.step();
        }
    }

    /// Run the full schedule and report.
    pub fn run(&mut self) -> RunReport {
        self.run_until(self.config.schedule.run_length);
        let report = self.report();
        info!(
            ticks = report.ticks,
            accuracy = report.accuracy,
            converged = ?report.convergence_tick,
            failed = report.failed,
            "Simulation finished"
        );
        report
    }

    /// Score the swarm as it stands.
    pub fn report(&self) -> RunReport {
        let live = self.nodes.iter().filter(|n| !n.is_failed()).count();
        let positioned = self
            .nodes
            .iter()
            .filter(|n| !n.is_failed() && n.position().is_known())
            .count();
        let alignment = best_alignment(&self.layout, &self.nodes);
        let accuracy = match (alignment, live) {
            (Some(a), live) if live > 0 => a.matching as f64 / live as f64,
            _ => 0.0,
        };
        let total_messages: u64 = self.nodes.iter().map(Node::messages_received).sum();

        RunReport {
            grid_width: self.config.grid_width,
            grid_height: self.config.grid_height,
            seed: self.config.seed,
            ticks: self.tick,
            node_count: self.nodes.len(),
            failed: self.nodes.len() - live,
            positioned,
            accuracy,
            symmetry: alignment.map(|a| a.symmetry),
            convergence_tick: self.monitor.convergence_tick(),
            average_messages: total_messages as f64 / self.nodes.len() as f64,
            summary: self.sealed_summary(),
        }
    }

    /// The origin's sealed summary, once it has one.
    fn sealed_summary(&self) -> Option<kilogrid_protocol::DimensionSummary> {
        self.nodes
            .iter()
            .filter(|n| n.is_origin())
            .find_map(|n| n.sealed_summary())
    }

    /// Live read-out of every robot.
    pub fn snapshot(&self) -> MeshSnapshot {
        let nodes = self
            .layout
            .slots()
            .zip(&self.nodes)
            .map(|(slot, n)| NodeState {
                slot,
                true_position: self.layout.true_position(slot),
                identity: n.identity(),
                role: n.role(),
                position: n.position().known(),
                is_origin: n.is_origin(),
                failed: n.is_failed(),
            })
            .collect();
        MeshSnapshot::from_nodes(self.tick, nodes, self.sealed_summary())
    }

    /// Every robot's LED, in slot order.
    pub fn markers(&self) -> Vec<Color> {
        self.nodes
            .iter()
            .map(|n| display::marker(n, self.config.animation, &self.config.schedule))
            .collect()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, slot: SlotIndex) -> &Node {
        &self.nodes[slot.value()]
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn events(&self) -> &[ProtocolEvent] {
        &self.events
    }

    /// Envelopes from `slot` that reached another robot's inbox.
    pub fn delivered_from(&self, slot: SlotIndex) -> u64 {
        self.delivered_from[slot.value()]
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// The parts of a node that produce timeline events when they change.
struct Milestones {
    identity: u8,
    role: Role,
    is_origin: bool,
    position: Fix,
    sealed: bool,
}

impl Milestones {
    fn of(node: &Node) -> Self {
        Self {
            identity: node.identity(),
            role: node.role(),
            is_origin: node.is_origin(),
            position: node.position(),
            sealed: node.sealed_summary().is_some(),
        }
    }

    fn record_changes(self, node: &Node, slot: SlotIndex, tick: u64, events: &mut Vec<ProtocolEvent>) {
        if node.identity() != self.identity {
            events.push(ProtocolEvent::IdentityChanged {
                slot,
                from: self.identity,
                to: node.identity(),
                tick,
            });
        }
        if node.role() != self.role {
            events.push(ProtocolEvent::RoleDecided {
                slot,
                role: node.role(),
                tick,
            });
        }
        if node.is_origin() && !self.is_origin {
            events.push(ProtocolEvent::OriginConfirmed {
                slot,
                identity: node.identity(),
                tick,
            });
        }
        if let (false, Some(position)) = (self.position.is_known(), node.position().known()) {
            events.push(ProtocolEvent::PositionFixed {
                slot,
                position,
                tick,
            });
        }
        if node.is_origin() && !self.sealed {
            if let Some(summary) = node.sealed_summary() {
                debug!(slot = slot.value(), ?summary, "Origin sealed the perimeter summary");
                events.push(ProtocolEvent::SummarySealed {
                    slot,
                    summary,
                    tick,
                });
            }
        }
    }
}
