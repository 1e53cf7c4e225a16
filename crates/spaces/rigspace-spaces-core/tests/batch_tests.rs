use approx::assert_relative_eq;
use rigspace_graph_core::{Channel, RigidPose, TransformGraph};
use rigspace_spaces_core::{
    create, locate, switch_all_to, ScopeFilter, SpaceError, SwitchOptions,
};
use rigspace_test_fixtures::trio_rig;

fn assert_pose_eq(a: &RigidPose, b: &RigidPose) {
    assert_relative_eq!(a.translation, b.translation, epsilon = 1e-3);
    assert_relative_eq!(a.rotation.angle_to(&b.rotation), 0.0, epsilon = 1e-3);
}

#[test]
fn one_bad_node_does_not_abort_the_batch() {
    let mut rig = trio_rig().unwrap();
    let anchor = rig.anchor;

    // Two controls know "anchor"; the third only has the implicit spaces.
    create(&mut rig.graph, rig.ctls[0], &[anchor], &["anchor"], "a", None).unwrap();
    create(&mut rig.graph, rig.ctls[1], &[anchor], &["anchor"], "b", None).unwrap();
    create(&mut rig.graph, rig.ctls[2], &[], &[], "c", None).unwrap();

    let poses_before: Vec<RigidPose> = rig
        .ctls
        .iter()
        .map(|&c| rig.graph.world_pose(c).unwrap())
        .collect();

    let report = switch_all_to(
        &mut rig.graph,
        "anchor",
        &ScopeFilter::All,
        &SwitchOptions::default(),
    );

    assert_eq!(report.switched.len(), 2);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert!(matches!(failure.error, SpaceError::UnknownTarget { .. }));
    assert!(!failure.structural);

    // The switched controls landed on "anchor"; everyone kept their pose.
    for (i, &ctl) in rig.ctls.iter().enumerate() {
        let space = locate(&rig.graph, ctl).unwrap();
        let expected = if i < 2 { 2 } else { 0 };
        assert_eq!(space.current_index(&rig.graph).unwrap(), expected);
        assert_pose_eq(&poses_before[i], &rig.graph.world_pose(ctl).unwrap());
    }
}

#[test]
fn structural_corruption_is_reported_as_such() {
    let mut rig = trio_rig().unwrap();
    let anchor = rig.anchor;
    let space = create(&mut rig.graph, rig.ctls[0], &[anchor], &["anchor"], "a", None).unwrap();
    create(&mut rig.graph, rig.ctls[1], &[anchor], &["anchor"], "b", None).unwrap();

    // Sever one channel driver: translate and rotate now disagree.
    rig.graph
        .set_channel_driver(space.id(), Channel::Rotate, None)
        .unwrap();

    let report = switch_all_to(
        &mut rig.graph,
        "anchor",
        &ScopeFilter::All,
        &SwitchOptions::default(),
    );

    assert_eq!(report.switched.len(), 1);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert!(failure.structural);
    assert!(matches!(failure.error, SpaceError::ConstraintMismatch { .. }));
}

#[test]
fn under_scope_limits_the_batch_to_a_subtree() {
    let mut rig = trio_rig().unwrap();
    let anchor = rig.anchor;
    let s0 = create(&mut rig.graph, rig.ctls[0], &[anchor], &["anchor"], "a", None).unwrap();
    let s1 = create(&mut rig.graph, rig.ctls[1], &[anchor], &["anchor"], "b", None).unwrap();

    let grp0 = rig.graph.parent_of(s0.id()).unwrap().unwrap();
    let report = switch_all_to(
        &mut rig.graph,
        "anchor",
        &ScopeFilter::Under(grp0),
        &SwitchOptions::default(),
    );

    assert_eq!(report.switched.len(), 1);
    assert!(report.is_clean());
    assert_eq!(s0.current_index(&rig.graph).unwrap(), 2);
    // Out-of-scope node untouched.
    assert_eq!(s1.current_index(&rig.graph).unwrap(), 0);
}

#[test]
fn batch_report_roundtrips_json() {
    let mut rig = trio_rig().unwrap();
    create(&mut rig.graph, rig.ctls[0], &[], &[], "a", None).unwrap();

    let report = switch_all_to(
        &mut rig.graph,
        "nowhere",
        &ScopeFilter::All,
        &SwitchOptions::default(),
    );
    assert_eq!(report.failures.len(), 1);

    let s = serde_json::to_string(&report).unwrap();
    let parsed: rigspace_spaces_core::BatchReport = serde_json::from_str(&s).unwrap();
    assert_eq!(report, parsed);
}

#[test]
fn selection_scope_resolves_controls_and_reports_strays() {
    let mut rig = trio_rig().unwrap();
    let anchor = rig.anchor;
    create(&mut rig.graph, rig.ctls[0], &[anchor], &["anchor"], "a", None).unwrap();
    let s1 = create(&mut rig.graph, rig.ctls[1], &[anchor], &["anchor"], "b", None).unwrap();

    // A selection of one managed control and one stray node.
    let report = switch_all_to(
        &mut rig.graph,
        "anchor",
        &ScopeFilter::Nodes(vec![rig.ctls[1], rig.root]),
        &SwitchOptions::default(),
    );

    assert_eq!(report.switched.len(), 1);
    assert_eq!(s1.current_index(&rig.graph).unwrap(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].node, "root");
    assert!(matches!(
        report.failures[0].error,
        SpaceError::NotASpaceChild { .. }
    ));
}
