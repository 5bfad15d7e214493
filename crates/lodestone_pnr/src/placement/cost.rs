//! Placement cost heuristics.
//!
//! Two weighted mixes guide the annealing placer: the unroutable mix is
//! evaluated on every candidate and approximates how wirable a placement
//! looks; the routable mix replaces it once actual wire paths exist.
//! Collisions dominate both mixes outright.

use crate::placement::{source_sink_pin_pairs, PinPair, Placement};
use crate::routing::{min_route_cost, RoutedWires};
use lodestone_netlist::Netlist;
use lodestone_voxel::{Pos, Prism, Region};
use std::collections::BTreeMap;

const MAX_PADDING: i32 = 5;

/// Factor weights for placements with no routing result.
pub(crate) const UNROUTABLE_WEIGHTS: [(&str, f64); 12] = [
    ("wiring_avg_min_length", 5.0),
    ("wiring_max_min_length", 5.0),
    ("placement_has_collisions", 10_000.0),
    ("placement_size", 20.0),
    ("interrupted_pin_lines_of_sight", 30.0),
    ("avg_missing_padding_blocks", 10.0),
    ("shift_misaligned_bus", 150.0),
    ("stride_misaligned_bus", 150.0),
    ("crossed_buses", 60.0),
    ("too_directly_above", 70.0),
    ("excessive_downwards", 80.0),
    ("min_route_cost", 20.0),
];

/// Factor weights once a routing result exists.
pub(crate) const ROUTABLE_WEIGHTS: [(&str, f64); 12] = [
    ("placement_has_collisions", 10_000.0),
    ("placement_size", 20.0),
    ("interrupted_pin_lines_of_sight", 10.0),
    ("avg_missing_padding_blocks", 10.0),
    ("shift_misaligned_bus", 50.0),
    ("stride_misaligned_bus", 35.0),
    ("crossed_buses", 20.0),
    ("too_directly_above", 20.0),
    ("excessive_downwards", 30.0),
    ("min_route_cost", 10.0),
    ("wiring_avg_length", 20.0),
    ("wiring_max_length", 20.0),
];

fn weighted_total(factors: &[(&'static str, f64)], weights: &[(&str, f64)]) -> f64 {
    factors
        .iter()
        .map(|(name, value)| {
            let weight = weights
                .iter()
                .find(|(weighted_name, _)| weighted_name == name)
                .map(|(_, weight)| *weight)
                .unwrap_or(0.0);
            value * weight
        })
        .sum()
}

/// Negated sum of the placement bounding-box extents; larger is tighter.
pub(crate) fn compactness_score(netlist: &Netlist, placement: &Placement) -> f64 {
    match placement.region(netlist).bounds() {
        Some((min, max)) => {
            let extent = max - min;
            -((extent.x + extent.y + extent.z) as f64)
        }
        None => 0.0,
    }
}

/// Average horizontal breathing room around each instance, capped so two
/// wires can pass between neighbors.
pub(crate) fn avg_instance_padding(netlist: &Netlist, placement: &Placement) -> f64 {
    let regions: Vec<Region> = placement
        .slots
        .keys()
        .map(|&id| placement.instance_region(netlist, id))
        .collect();
    if regions.is_empty() {
        return 0.0;
    }

    let mut total_room = 0;
    for (index, region) in regions.iter().enumerate() {
        let others = Region::Composite(
            regions
                .iter()
                .enumerate()
                .filter(|(other_index, _)| *other_index != index)
                .map(|(_, other)| other.clone())
                .collect(),
        );

        let mut room = MAX_PADDING - 1;
        for padding in 1..=MAX_PADDING {
            if region.xz_padded(padding).intersects(&others) {
                room = padding - 1;
                break;
            }
        }
        total_room += room;
    }

    total_room as f64 / regions.len() as f64
}

fn pair_fraction(pairs: &[PinPair], predicate: impl Fn(&PinPair) -> bool) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    pairs.iter().filter(|pair| predicate(pair)).count() as f64 / pairs.len() as f64
}

fn pair_bounding_prism(pair: &PinPair) -> Prism {
    Prism::new(
        pair.source_pos.elem_min(pair.sink_pos),
        pair.source_pos.elem_max(pair.sink_pos),
    )
}

fn interrupted_line_of_sight(netlist: &Netlist, placement: &Placement, pairs: &[PinPair]) -> f64 {
    let instance_regions = placement.region(netlist);
    pair_fraction(pairs, |pair| {
        Region::Prism(pair_bounding_prism(pair)).intersects(&instance_regions)
    })
}

fn excessive_downwards(pairs: &[PinPair]) -> f64 {
    pair_fraction(pairs, |pair| {
        let delta = pair.sink_pos - pair.source_pos;
        delta.y < 0 && delta.xz().l1() < delta.y.abs()
    })
}

fn too_directly_above(pairs: &[PinPair]) -> f64 {
    pair_fraction(pairs, |pair| {
        let delta = pair.sink_pos - pair.source_pos;
        delta.y > 0 && delta.xz().l1() == 0
    })
}

/// Mean shift misalignment over sequence pairs whose strides match.
///
/// Shifting a bus sideways mid-flight is expensive; when two pin rows
/// share a stride, reward placements that align them exactly along it.
fn shift_misalignment(netlist: &Netlist, placement: &Placement) -> f64 {
    let mut misalignment = 0.0;
    let mut pair_count = 0u32;

    for (source_seq, sink_seq) in netlist.source_sink_seq_pairs() {
        pair_count += 1;

        let source_points = placement.pin_seq_positions(netlist, source_seq);
        let sink_points = placement.pin_seq_positions(netlist, sink_seq);
        if source_points.step() != sink_points.step() {
            continue;
        }

        let delta = sink_points.index(0) - source_points.index(0);
        let stride_error = (delta * source_points.step()).l1() as f64;
        misalignment += ((stride_error + 1.0).log2().min(8.0)) / 8.0;
    }

    if pair_count == 0 {
        0.0
    } else {
        misalignment / pair_count as f64
    }
}

/// Fraction of sequence pairs whose pin-row strides differ.
fn stride_misalignment(netlist: &Netlist, placement: &Placement) -> f64 {
    let mut aligned = 0u32;
    let mut pair_count = 0u32;

    for (source_seq, sink_seq) in netlist.source_sink_seq_pairs() {
        pair_count += 1;
        let source_points = placement.pin_seq_positions(netlist, source_seq);
        let sink_points = placement.pin_seq_positions(netlist, sink_seq);
        if source_points.step() == sink_points.step() {
            aligned += 1;
        }
    }

    if pair_count == 0 {
        0.0
    } else {
        1.0 - aligned as f64 / pair_count as f64
    }
}

/// Fraction of port pairs whose line-of-sight box crosses another's.
fn crossed_buses(netlist: &Netlist, placement: &Placement) -> f64 {
    let mut boxes = BTreeMap::new();
    for (source_seq, sink_seq) in netlist.source_sink_seq_pairs() {
        let source_points = placement.pin_seq_positions(netlist, source_seq);
        let sink_points = placement.pin_seq_positions(netlist, sink_seq);

        let corners = [
            source_points.start(),
            source_points.stop(),
            sink_points.start(),
            sink_points.stop(),
        ];
        let min = corners.iter().copied().reduce(Pos::elem_min).unwrap_or(Pos::default());
        let max = corners.iter().copied().reduce(Pos::elem_max).unwrap_or(Pos::default());

        boxes.insert(
            (source_seq.port.clone(), sink_seq.port.clone()),
            Region::prism(min, max),
        );
    }

    if boxes.is_empty() {
        return 0.0;
    }

    let crossed = boxes
        .iter()
        .filter(|(pair_key, region)| {
            let others = Region::Composite(
                boxes
                    .iter()
                    .filter(|(other_key, _)| other_key != pair_key)
                    .map(|(_, other)| other.clone())
                    .collect(),
            );
            region.intersects(&others)
        })
        .count();

    crossed as f64 / boxes.len() as f64
}

/// Average router lower bound over pin pairs, squashed into [0, 1].
fn min_route_cost_score(pairs: &[PinPair]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    let total: f64 = pairs
        .iter()
        .map(|pair| {
            min_route_cost(
                pair.source_pos,
                pair.sink_pos,
                pair.source_facing,
                pair.sink_facing,
            )
        })
        .sum();
    let avg = total / pairs.len() as f64;
    ((avg + 1.0).log2() / 7.0).min(1.0)
}

fn common_factors(
    netlist: &Netlist,
    placement: &Placement,
    pairs: &[PinPair],
) -> Vec<(&'static str, f64)> {
    vec![
        (
            "placement_has_collisions",
            if placement.is_valid(netlist, 1) { 0.0 } else { 1.0 },
        ),
        (
            "placement_size",
            1.0 + 1.0 / (compactness_score(netlist, placement) + 10.0),
        ),
        (
            "interrupted_pin_lines_of_sight",
            interrupted_line_of_sight(netlist, placement, pairs),
        ),
        (
            "avg_missing_padding_blocks",
            1.0 - avg_instance_padding(netlist, placement) / MAX_PADDING as f64,
        ),
        ("shift_misaligned_bus", shift_misalignment(netlist, placement)),
        ("stride_misaligned_bus", stride_misalignment(netlist, placement)),
        ("crossed_buses", crossed_buses(netlist, placement)),
        ("too_directly_above", too_directly_above(pairs)),
        ("excessive_downwards", excessive_downwards(pairs)),
        ("min_route_cost", min_route_cost_score(pairs)),
    ]
}

/// Heuristic factors for a placement with no routing result.
pub(crate) fn unroutable_factors(
    netlist: &Netlist,
    placement: &Placement,
) -> Vec<(&'static str, f64)> {
    let pairs = source_sink_pin_pairs(netlist, placement);

    let lengths: Vec<f64> = pairs
        .iter()
        .map(|pair| (pair.sink_pos - pair.source_pos).l1() as f64)
        .collect();
    let avg_length = if lengths.is_empty() {
        0.0
    } else {
        lengths.iter().sum::<f64>() / lengths.len() as f64
    };
    let max_length = lengths.iter().copied().fold(0.0, f64::max);

    let mut factors = vec![
        ("wiring_avg_min_length", (avg_length + 1.0).log2()),
        ("wiring_max_min_length", (max_length + 1.0).log2()),
    ];
    factors.extend(common_factors(netlist, placement, &pairs));
    factors
}

/// Heuristic factors once wires have been routed.
pub(crate) fn routable_factors(
    netlist: &Netlist,
    placement: &Placement,
    wires: &RoutedWires,
) -> Vec<(&'static str, f64)> {
    let pairs = source_sink_pin_pairs(netlist, placement);

    let lengths: Vec<f64> = wires
        .values()
        .map(|path| path.element_strengths.len() as f64)
        .collect();
    let avg_length = if lengths.is_empty() {
        0.0
    } else {
        lengths.iter().sum::<f64>() / lengths.len() as f64
    };
    let max_length = lengths.iter().copied().fold(0.0, f64::max);

    let mut factors = common_factors(netlist, placement, &pairs);
    factors.push(("wiring_avg_length", avg_length));
    factors.push(("wiring_max_length", max_length));
    factors
}

/// The weighted placement cost when routing has not succeeded.
pub fn unroutable_cost(netlist: &Netlist, placement: &Placement) -> f64 {
    weighted_total(&unroutable_factors(netlist, placement), &UNROUTABLE_WEIGHTS)
}

/// The weighted placement cost for a successfully routed placement.
pub fn routable_cost(netlist: &Netlist, placement: &Placement, wires: &RoutedWires) -> f64 {
    weighted_total(
        &routable_factors(netlist, placement, wires),
        &ROUTABLE_WEIGHTS,
    )
}
