//! Property-based tests for the call tree and classifier.
//!
//! Samples are generated from a small frame vocabulary so that paths
//! collide often and merging is actually exercised.

use agentprof::aggregator::{
    analyze, AnalysisConfig, CallTree, ClassifierMode, FrameKey, FrameKeyFormatter, Node,
};
use agentprof::parser::{StackFrame, StackTrace};
use proptest::prelude::*;

const TYPES: &[&str] = &[
    "java.lang.Thread",
    "com.app.Servlet",
    "com.app.Dao",
    "org.glowroot.agent.impl.Transaction",
    "org.glowroot.agent.plugin.JdbcAdvice",
    "java.lang.ClassLoader",
];
const METHODS: &[&str] = &["run", "service", "query", "start", "onBefore", "loadClass"];

fn frame_strategy() -> impl Strategy<Value = StackFrame> {
    (0..TYPES.len(), 0..METHODS.len(), 0i32..3)
        .prop_map(|(t, m, line)| StackFrame::new(TYPES[t], METHODS[m], line))
}

fn sample_strategy() -> impl Strategy<Value = StackTrace> {
    (prop::collection::vec(frame_strategy(), 0..6), 1u64..5)
        .prop_map(|(frames, weight)| StackTrace::new(frames).with_weight(weight))
}

fn check_counts(node: &Node) {
    assert!(node.children_total() <= node.count());
    for child in node.ordered_children() {
        check_counts(child);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_total_equals_samples_fed(
        samples in prop::collection::vec(sample_strategy(), 0..40),
        exclude in any::<bool>(),
        simple in any::<bool>(),
    ) {
        let config = AnalysisConfig {
            exclude_class_loading: exclude,
            mode: if simple { ClassifierMode::Simple } else { ClassifierMode::Callers },
            ..Default::default()
        };
        let report = analyze(&samples, config).unwrap();

        let fed: u64 = samples.iter().map(|s| s.weight).sum();
        prop_assert_eq!(report.summary.total_samples, fed);
        prop_assert!(report.summary.attributed_samples <= report.summary.total_samples);
        prop_assert_eq!(report.summary.attributed_samples, report.stats.attributed);
    }

    #[test]
    fn prop_children_never_exceed_parent(
        samples in prop::collection::vec(sample_strategy(), 0..40),
    ) {
        let report = analyze(&samples, AnalysisConfig::default()).unwrap();
        for child in report.tree.root().ordered_children() {
            check_counts(child);
        }
        prop_assert!(report.tree.verify().is_ok());
    }

    #[test]
    fn prop_ordered_children_non_increasing(
        paths in prop::collection::vec(prop::collection::vec(0usize..4, 1..4), 0..30),
    ) {
        let mut tree = CallTree::new();
        for path in &paths {
            tree.insert(path.iter().map(|i| FrameKey::from(format!("k{}", i))));
        }

        let mut stack = vec![tree.root()];
        while let Some(node) = stack.pop() {
            let children = node.ordered_children();
            for pair in children.windows(2) {
                prop_assert!(pair[0].count() >= pair[1].count());
            }
            stack.extend(children);
        }
    }

    #[test]
    fn prop_repeated_path_adds_exactly_n(
        path in prop::collection::vec(0usize..5, 1..6),
        n in 1u64..20,
    ) {
        let mut tree = CallTree::new();
        for _ in 0..n {
            tree.insert(path.iter().map(|i| FrameKey::from(format!("k{}", i))));
        }

        let mut node = tree.root();
        for i in &path {
            prop_assert_eq!(node.child_count(), 1);
            let key = format!("k{}", i);
            node = node.child(&key).unwrap();
            prop_assert_eq!(node.count(), n);
        }
        prop_assert_eq!(node.child_count(), 0);
    }

    #[test]
    fn prop_frame_key_identity(
        a in frame_strategy(),
        b in frame_strategy(),
        with_line in any::<bool>(),
    ) {
        let formatter = FrameKeyFormatter::new(with_line);
        let (ra, rb) = (a.resolve().unwrap(), b.resolve().unwrap());

        prop_assert_eq!(formatter.format(&ra), formatter.format(&ra));

        let same_identity = ra.type_name == rb.type_name
            && ra.method_name == rb.method_name
            && (!with_line || ra.line == rb.line);
        prop_assert_eq!(formatter.format(&ra) == formatter.format(&rb), same_identity);
    }
}
