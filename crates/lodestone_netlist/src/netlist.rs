//! The abstract logic netlist.
//!
//! Instances (placeable template copies plus the two reserved I/O stubs)
//! and networks (one driver pin sequence fanning out to sink pin
//! sequences). The netlist is built once, validated as it is built, and
//! never mutated by the engine.

use crate::error::NetlistError;
use crate::ids::{InstanceId, NetworkId};
use crate::port::{PinIdSequence, Port, PortDirection, PortId};
use crate::template::InstanceTemplate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Name of the reserved instance exposing the circuit's inputs.
pub const INPUT_STUB: &str = "input";

/// Name of the reserved instance exposing the circuit's outputs.
pub const OUTPUT_STUB: &str = "output";

/// One instance in the netlist.
///
/// Regular instances reference a placeable [`InstanceTemplate`]. The two
/// reserved stubs `"input"` and `"output"` carry only ports; their port
/// directions are inverted relative to the circuit boundary (the input
/// stub exposes out-ports that feed the circuit).
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Instance {
    /// The unique ID of this instance.
    pub id: InstanceId,
    /// The instance name; unique across the netlist.
    pub name: String,
    /// The instance's ports by name.
    pub ports: BTreeMap<String, Port>,
    /// The backing template. `None` only for the reserved I/O stubs.
    pub template: Option<InstanceTemplate>,
}

impl Instance {
    /// Whether this is one of the reserved I/O stubs.
    pub fn is_io_stub(&self) -> bool {
        self.template.is_none()
    }
}

/// One logical connection: a driver pin sequence fanning out to one or
/// more equally wide sink pin sequences.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Network {
    /// The unique ID of this network.
    pub id: NetworkId,
    /// The driving pin sequence.
    pub driver: PinIdSequence,
    /// The driven pin sequences, in insertion order.
    pub sinks: Vec<PinIdSequence>,
}

impl Network {
    /// Bit width of the connection.
    pub fn width(&self) -> usize {
        self.driver.len()
    }
}

/// The complete abstract netlist.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Netlist {
    /// All instances, indexed by [`InstanceId`].
    pub instances: Vec<Instance>,
    /// All networks, indexed by [`NetworkId`].
    pub networks: Vec<Network>,
    /// Auxiliary index: instance name to ID (rebuilt on deserialization).
    #[serde(skip)]
    pub instance_by_name: HashMap<String, InstanceId>,
}

impl Netlist {
    /// Creates an empty netlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an instance and returns its ID.
    ///
    /// Validates that the name is unique, that non-stub instances carry a
    /// template, and that the template agrees with the declared ports.
    pub fn add_instance(
        &mut self,
        name: impl Into<String>,
        ports: BTreeMap<String, Port>,
        template: Option<InstanceTemplate>,
    ) -> Result<InstanceId, NetlistError> {
        let name = name.into();
        if self.instance_by_name.contains_key(&name) {
            return Err(NetlistError::DuplicateInstance { name });
        }

        let is_stub_name = name == INPUT_STUB || name == OUTPUT_STUB;
        match &template {
            Some(template) => template.validate(&ports)?,
            None if !is_stub_name => {
                return Err(NetlistError::MissingTemplate { name });
            }
            None => {}
        }

        let id = InstanceId::from_raw(self.instances.len() as u32);
        self.instance_by_name.insert(name.clone(), id);
        self.instances.push(Instance {
            id,
            name,
            ports,
            template,
        });
        Ok(id)
    }

    /// Adds a network and returns its ID.
    ///
    /// Validates port references, slice ranges, equal widths, and pin-level
    /// acyclicity (driver pins disjoint from sink pins).
    pub fn add_network(
        &mut self,
        driver: PinIdSequence,
        sinks: Vec<PinIdSequence>,
    ) -> Result<NetworkId, NetlistError> {
        self.check_sequence(&driver)?;
        for sink in &sinks {
            self.check_sequence(sink)?;
        }

        if driver.is_empty() {
            return Err(NetlistError::EmptyPinSequence {
                port: driver.port.clone(),
            });
        }
        if sinks.is_empty() {
            return Err(NetlistError::EmptyNetwork {
                driver: driver.port.clone(),
            });
        }
        for sink in &sinks {
            if sink.len() != driver.len() {
                return Err(NetlistError::WidthMismatch {
                    driver: driver.len(),
                    sink: sink.len(),
                });
            }
        }

        let driver_pins: BTreeSet<_> = driver.pin_ids().collect();
        for sink in &sinks {
            for pin in sink.pin_ids() {
                if driver_pins.contains(&pin) {
                    return Err(NetlistError::CyclicNetwork { pin });
                }
            }
        }

        let id = NetworkId::from_raw(self.networks.len() as u32);
        self.networks.push(Network { id, driver, sinks });
        Ok(id)
    }

    fn check_sequence(&self, seq: &PinIdSequence) -> Result<(), NetlistError> {
        let instance = self
            .instances
            .get(seq.port.instance.as_raw() as usize)
            .ok_or(NetlistError::UnknownInstance {
                id: seq.port.instance.as_raw(),
            })?;
        let port =
            instance
                .ports
                .get(&seq.port.port)
                .ok_or_else(|| NetlistError::UnknownPort {
                    instance: instance.name.clone(),
                    port: seq.port.port.clone(),
                })?;

        for index in seq.slice.indices() {
            if index < 0 || index as u32 >= port.pin_count {
                return Err(NetlistError::SliceOutOfRange {
                    port: seq.port.port.clone(),
                    index,
                    pin_count: port.pin_count,
                });
            }
        }
        Ok(())
    }

    /// Returns the instance with the given ID.
    pub fn instance(&self, id: InstanceId) -> &Instance {
        &self.instances[id.as_raw() as usize]
    }

    /// Returns the network with the given ID.
    pub fn network(&self, id: NetworkId) -> &Network {
        &self.networks[id.as_raw() as usize]
    }

    /// Looks an instance up by name.
    pub fn instance_named(&self, name: &str) -> Option<&Instance> {
        self.instance_by_name.get(name).map(|&id| self.instance(id))
    }

    /// The port referenced by a [`PortId`].
    pub fn port(&self, port_id: &PortId) -> &Port {
        &self.instance(port_id.instance).ports[&port_id.port]
    }

    /// Number of instances (including I/O stubs).
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Number of networks.
    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    /// The placeable (non-stub) instances, in ID order.
    pub fn placeable_instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances
            .iter()
            .filter(|instance| !instance.is_io_stub())
    }

    /// Rebuilds the name index after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.instance_by_name.clear();
        for (index, instance) in self.instances.iter().enumerate() {
            self.instance_by_name
                .insert(instance.name.clone(), InstanceId::from_raw(index as u32));
        }
    }

    /// Every (driver sequence, sink sequence) pair to be wired, in the
    /// fixed routing order: networks by ascending ID, sinks in insertion
    /// order. Pairs touching the I/O stubs are skipped.
    pub fn source_sink_seq_pairs(&self) -> Vec<(&PinIdSequence, &PinIdSequence)> {
        let mut pairs = Vec::new();
        for network in &self.networks {
            if self.instance(network.driver.port.instance).is_io_stub() {
                continue;
            }
            for sink in &network.sinks {
                if self.instance(sink.port.instance).is_io_stub() {
                    continue;
                }
                pairs.push((&network.driver, sink));
            }
        }
        pairs
    }

    /// The circuit's boundary ports as seen from outside.
    ///
    /// The input stub's out-ports become circuit inputs; the output stub's
    /// in-ports become circuit outputs.
    pub fn io_ports(&self) -> BTreeMap<String, Port> {
        let mut ports = BTreeMap::new();

        if let Some(stub) = self.instance_named(INPUT_STUB) {
            for (name, port) in &stub.ports {
                if port.direction == PortDirection::Output {
                    ports.insert(
                        name.clone(),
                        Port {
                            direction: PortDirection::Input,
                            pin_count: port.pin_count,
                        },
                    );
                }
            }
        }
        if let Some(stub) = self.instance_named(OUTPUT_STUB) {
            for (name, port) in &stub.ports {
                if port.direction == PortDirection::Input {
                    ports.insert(
                        name.clone(),
                        Port {
                            direction: PortDirection::Output,
                            pin_count: port.pin_count,
                        },
                    );
                }
            }
        }

        ports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::example_netlist;
    use lodestone_voxel::Slice;

    fn seq(netlist: &Netlist, instance: &str, port: &str, width: u32) -> PinIdSequence {
        PinIdSequence {
            port: PortId {
                instance: netlist.instance_named(instance).unwrap().id,
                port: port.into(),
            },
            slice: Slice::from_len(width),
        }
    }

    #[test]
    fn example_structure() {
        let netlist = example_netlist(4);
        assert_eq!(netlist.instance_count(), 6);
        assert_eq!(netlist.network_count(), 6);
        assert_eq!(netlist.placeable_instances().count(), 4);
        assert!(netlist.instance_named("and").is_some());
        assert!(netlist.instance_named(INPUT_STUB).unwrap().is_io_stub());
    }

    #[test]
    fn routing_pairs_skip_io_stubs() {
        let netlist = example_netlist(4);
        let pairs = netlist.source_sink_seq_pairs();
        // not_a.out -> and.a, not_b.out -> and.b, and.out -> not_out.in.
        assert_eq!(pairs.len(), 3);
        for (driver, sink) in pairs {
            assert!(!netlist.instance(driver.port.instance).is_io_stub());
            assert!(!netlist.instance(sink.port.instance).is_io_stub());
        }
    }

    #[test]
    fn io_ports_flip_directions() {
        let netlist = example_netlist(4);
        let io = netlist.io_ports();
        assert_eq!(io["a"].direction, PortDirection::Input);
        assert_eq!(io["b"].direction, PortDirection::Input);
        assert_eq!(io["out"].direction, PortDirection::Output);
        assert_eq!(io["out"].pin_count, 4);
    }

    #[test]
    fn cyclic_network_rejected() {
        let mut netlist = example_netlist(4);
        let driver = seq(&netlist, "and", "out", 4);
        let err = netlist
            .add_network(driver.clone(), vec![driver])
            .unwrap_err();
        assert!(matches!(err, NetlistError::CyclicNetwork { .. }));
    }

    #[test]
    fn width_mismatch_rejected() {
        let mut netlist = example_netlist(4);
        let driver = seq(&netlist, "and", "out", 4);
        let sink = PinIdSequence {
            port: PortId {
                instance: netlist.instance_named("not_out").unwrap().id,
                port: "in".into(),
            },
            slice: Slice::from_len(2),
        };
        let err = netlist.add_network(driver, vec![sink]).unwrap_err();
        assert!(matches!(
            err,
            NetlistError::WidthMismatch { driver: 4, sink: 2 }
        ));
    }

    #[test]
    fn empty_slice_rejected() {
        let mut netlist = example_netlist(4);
        let driver = PinIdSequence {
            port: PortId {
                instance: netlist.instance_named("and").unwrap().id,
                port: "out".into(),
            },
            slice: Slice::new(0, 0, 1),
        };
        let sink = seq(&netlist, "not_out", "in", 4);
        let err = netlist.add_network(driver, vec![sink]).unwrap_err();
        assert!(matches!(err, NetlistError::EmptyPinSequence { .. }));
    }

    #[test]
    fn missing_sinks_rejected() {
        let mut netlist = example_netlist(4);
        let driver = seq(&netlist, "and", "out", 4);
        let err = netlist.add_network(driver, vec![]).unwrap_err();
        assert!(matches!(err, NetlistError::EmptyNetwork { .. }));
    }

    #[test]
    fn out_of_range_slice_rejected() {
        let mut netlist = example_netlist(4);
        let driver = PinIdSequence {
            port: PortId {
                instance: netlist.instance_named("and").unwrap().id,
                port: "out".into(),
            },
            slice: Slice::new(2, 6, 1),
        };
        let sink = seq(&netlist, "not_out", "in", 4);
        let err = netlist.add_network(driver, vec![sink]).unwrap_err();
        assert!(matches!(err, NetlistError::SliceOutOfRange { .. }));
    }

    #[test]
    fn unknown_port_rejected() {
        let mut netlist = example_netlist(4);
        let driver = seq(&netlist, "and", "carry", 4);
        let sink = seq(&netlist, "not_out", "in", 4);
        let err = netlist.add_network(driver, vec![sink]).unwrap_err();
        assert!(matches!(err, NetlistError::UnknownPort { .. }));
    }

    #[test]
    fn template_required_for_regular_instances() {
        let mut netlist = Netlist::new();
        let err = netlist
            .add_instance("adder", BTreeMap::new(), None)
            .unwrap_err();
        assert!(matches!(err, NetlistError::MissingTemplate { .. }));
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut netlist = Netlist::new();
        netlist
            .add_instance(INPUT_STUB, BTreeMap::new(), None)
            .unwrap();
        let err = netlist
            .add_instance(INPUT_STUB, BTreeMap::new(), None)
            .unwrap_err();
        assert!(matches!(err, NetlistError::DuplicateInstance { .. }));
    }

    #[test]
    fn serde_roundtrip_rebuilds_index() {
        let netlist = example_netlist(2);
        let json = serde_json::to_string(&netlist).unwrap();
        let mut back: Netlist = serde_json::from_str(&json).unwrap();
        back.rebuild_indices();
        assert_eq!(back.instance_count(), netlist.instance_count());
        assert_eq!(back.network_count(), netlist.network_count());
        assert!(back.instance_named("not_a").is_some());
    }
}
