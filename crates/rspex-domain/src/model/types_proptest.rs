//! Property-based tests for subject data.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::model::{Context, ContextSet, SubjectDataStore, SubjectRef};

    /// Strategy to generate context sets of zero to three `key=value` tokens
    fn context_set_strategy() -> impl Strategy<Value = ContextSet> {
        prop::collection::vec(("[a-c]{1,2}", "[a-z]{1,4}"), 0..3)
            .prop_map(|pairs| {
                pairs
                    .into_iter()
                    .map(|(k, v)| Context::new(k, v).unwrap())
                    .collect::<ContextSet>()
            })
    }

    /// A single update applied to a store
    #[derive(Debug, Clone)]
    enum Op {
        SetPermission(ContextSet, String, i32),
        SetOption(ContextSet, String, Option<String>),
        AddParent(ContextSet, String, String),
        RemoveParent(ContextSet, String, String),
        SetDefault(ContextSet, i32),
        ClearOptions(ContextSet),
        ClearAllOptions,
        ClearPermissions(ContextSet),
        ClearAllPermissions,
        ClearParents(ContextSet),
        ClearAllParents,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (context_set_strategy(), "[a-d]", -2..3i32)
                .prop_map(|(c, n, v)| Op::SetPermission(c, n, v)),
            (context_set_strategy(), "[a-d]", prop::option::of("[a-z]{0,3}"))
                .prop_map(|(c, k, v)| Op::SetOption(c, k, v)),
            (context_set_strategy(), "group|user", "[a-c]")
                .prop_map(|(c, t, i)| Op::AddParent(c, t, i)),
            (context_set_strategy(), "group|user", "[a-c]")
                .prop_map(|(c, t, i)| Op::RemoveParent(c, t, i)),
            (context_set_strategy(), -2..3i32).prop_map(|(c, v)| Op::SetDefault(c, v)),
            context_set_strategy().prop_map(Op::ClearOptions),
            Just(Op::ClearAllOptions),
            context_set_strategy().prop_map(Op::ClearPermissions),
            Just(Op::ClearAllPermissions),
            context_set_strategy().prop_map(Op::ClearParents),
            Just(Op::ClearAllParents),
        ]
    }

    fn apply(store: &SubjectDataStore, op: &Op) -> SubjectDataStore {
        match op {
            Op::SetPermission(c, n, v) => store.set_permission(c, n, *v),
            Op::SetOption(c, k, v) => store.set_option(c, k, v.as_deref()),
            Op::AddParent(c, t, i) => store.add_parent(c, t, i),
            Op::RemoveParent(c, t, i) => store.remove_parent(c, t, i),
            Op::SetDefault(c, v) => store.set_default_value(c, *v),
            Op::ClearOptions(c) => store.clear_options(c),
            Op::ClearAllOptions => store.clear_all_options(),
            Op::ClearPermissions(c) => store.clear_permissions(c),
            Op::ClearAllPermissions => store.clear_all_permissions(),
            Op::ClearParents(c) => store.clear_parents(c),
            Op::ClearAllParents => store.clear_all_parents(),
        }
    }

    fn build(ops: &[Op]) -> SubjectDataStore {
        ops.iter().fold(SubjectDataStore::new(), |s, op| apply(&s, op))
    }

    proptest! {
        #[test]
        fn test_updates_never_change_the_receiver(
            setup in prop::collection::vec(op_strategy(), 0..12),
            op in op_strategy()
        ) {
            let before = build(&setup);
            let snapshot = before.get_all_permissions();
            let options = before.get_all_options();
            let parents = before.get_all_parents();
            let active = before.active_contexts().count();

            let _after = apply(&before, &op);

            prop_assert_eq!(before.get_all_permissions(), snapshot);
            prop_assert_eq!(before.get_all_options(), options);
            prop_assert_eq!(before.get_all_parents(), parents);
            prop_assert_eq!(before.active_contexts().count(), active);
        }

        #[test]
        fn test_zero_is_never_stored(ops in prop::collection::vec(op_strategy(), 0..20)) {
            let store = build(&ops);
            for permissions in store.get_all_permissions().values() {
                prop_assert!(permissions.values().all(|v| *v != 0));
            }
        }

        #[test]
        fn test_updates_match_context_sets_exactly(
            setup in prop::collection::vec(op_strategy(), 0..12),
            target in context_set_strategy(),
            other in context_set_strategy(),
            value in 1..5i32
        ) {
            prop_assume!(target != other);
            let before = build(&setup);
            let after = before.set_permission(&target, "marker", value);

            prop_assert_eq!(after.get_permissions(&other), before.get_permissions(&other));
            let granted = after.get_permissions(&target);
            prop_assert_eq!(granted.get("marker"), Some(&value));
        }

        #[test]
        fn test_parent_encode_decode_round_trip(
            subject_type in "[a-z]{1,8}",
            identifier in "[a-z0-9:]{1,12}"
        ) {
            let parent = SubjectRef::new(&subject_type, &identifier);
            prop_assert_eq!(SubjectRef::decode(&parent.encode()), parent);

            let store = SubjectDataStore::new()
                .add_parent(&ContextSet::empty(), &subject_type, &identifier);
            prop_assert_eq!(
                store.get_parents(&ContextSet::empty()),
                vec![SubjectRef::new(subject_type, identifier)]
            );
        }

        #[test]
        fn test_removing_unset_option_is_identity(
            setup in prop::collection::vec(op_strategy(), 0..12),
            contexts in context_set_strategy()
        ) {
            let store = build(&setup);
            // op_strategy only generates single-letter option keys
            let after = store.set_option(&contexts, "zzz", None);
            prop_assert!(after.ptr_eq(&store));
        }
    }
}
