//! Shared rig scenes for rigspace test suites.
//!
//! Fixtures build small posed hierarchies in the reference host and hand
//! back the graph plus named node handles. Poses are deliberately
//! non-trivial (rotations everywhere) so continuity assertions mean
//! something.

use anyhow::{Context, Result};
use rigspace_graph_core::{NodeId, RigidPose, SceneGraph, TransformGraph};

/// A small biped-ish hierarchy with one control to put under space control.
///
/// root ─ pelvis ─ chest ─ head
///                   └ arm ─ hand_ctl
pub struct BipedRig {
    pub graph: SceneGraph,
    pub root: NodeId,
    pub pelvis: NodeId,
    pub chest: NodeId,
    pub head: NodeId,
    pub arm: NodeId,
    pub hand_ctl: NodeId,
}

pub fn biped_rig() -> Result<BipedRig> {
    let mut graph = SceneGraph::new();

    let root = graph.create_transform("root");
    let pelvis = child(&mut graph, "pelvis", root, [0.0, 9.0, 0.0], [0.0, 0.2, 0.0])?;
    let chest = child(&mut graph, "chest", pelvis, [0.0, 3.0, 0.3], [0.15, 0.0, 0.0])?;
    let head = child(&mut graph, "head", chest, [0.0, 2.0, 0.1], [-0.1, 0.3, 0.0])?;
    let arm = child(&mut graph, "arm", chest, [1.8, 0.5, 0.0], [0.0, 0.0, -0.6])?;
    let hand_ctl = child(
        &mut graph,
        "hand_ctl",
        arm,
        [2.4, -0.2, 0.1],
        [0.4, -0.2, 0.1],
    )?;

    Ok(BipedRig {
        graph,
        root,
        pelvis,
        chest,
        head,
        arm,
        hand_ctl,
    })
}

/// Three independent controls under one root, for batch scenarios.
pub struct TrioRig {
    pub graph: SceneGraph,
    pub root: NodeId,
    pub anchor: NodeId,
    pub ctls: [NodeId; 3],
}

pub fn trio_rig() -> Result<TrioRig> {
    let mut graph = SceneGraph::new();

    let root = graph.create_transform("root");
    let anchor = child(&mut graph, "anchor", root, [0.0, 5.0, 0.0], [0.0, 0.4, 0.0])?;

    let mut ctls = Vec::with_capacity(3);
    for (i, pose) in [
        ([2.0, 1.0, 0.0], [0.1, 0.0, 0.0]),
        ([-2.0, 1.5, 0.5], [0.0, 0.3, 0.0]),
        ([0.0, -1.0, 2.0], [0.0, 0.0, -0.2]),
    ]
    .iter()
    .enumerate()
    {
        let grp = child(&mut graph, &format!("grp_{i}"), root, pose.0, [0.0; 3])?;
        let ctl = child(&mut graph, &format!("ctl_{i}"), grp, [0.3, 0.3, 0.3], pose.1)?;
        ctls.push(ctl);
    }

    let ctls: [NodeId; 3] = [ctls[0], ctls[1], ctls[2]];
    Ok(TrioRig {
        graph,
        root,
        anchor,
        ctls,
    })
}

fn child(
    graph: &mut SceneGraph,
    name: &str,
    parent: NodeId,
    translation: [f32; 3],
    euler: [f32; 3],
) -> Result<NodeId> {
    let id = graph.create_transform(name);
    graph
        .reparent(id, Some(parent))
        .with_context(|| format!("parenting fixture node {name}"))?;
    graph
        .set_local_pose(id, RigidPose::from_offset_parts(translation, euler))
        .with_context(|| format!("posing fixture node {name}"))?;
    Ok(id)
}
