use std::{
    panic::{self, AssertUnwindSafe},
    rc::Rc,
};

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use z3::{
    ast::{Ast, Bool, Int},
    Config, Context,
};
use z3rro::test::test_prove;

use super::{ArrayTuple, SliceCache, SliceSortError};
use crate::{
    smt::EncodingCtx,
    ty::{SortKind, TupleSort},
};

fn uint256_array(name: &str) -> SortKind {
    SortKind::named_array_tuple(name, SortKind::index())
}

fn int_pair() -> SortKind {
    SortKind::Tuple(TupleSort {
        name: "pair".to_owned(),
        components: vec![SortKind::index(), SortKind::index()],
    })
}

#[test]
fn test_first_request_creates_predicates() {
    let ctx = Context::new(&Config::default());
    let mut enc = EncodingCtx::new(&ctx);
    let mut cache = SliceCache::new();

    let (reused, data) = cache.obtain(&uint256_array("T"), &mut enc);
    assert!(!reused);
    assert_eq!(data.tuple_name(), "T");
    assert_eq!(data.predicates.slice.name(), "array_slice_T");
    assert_eq!(data.predicates.header.name(), "array_slice_header_T");
    assert_eq!(data.predicates.r#loop.name(), "array_slice_loop_T");
    assert_eq!(enc.predicates().len(), 3);
    // five variables and three predicates
    assert_eq!(enc.symbols().len(), 8);
}

#[test]
fn test_second_request_reuses_predicates() {
    let ctx = Context::new(&Config::default());
    let mut enc = EncodingCtx::new(&ctx);
    let mut cache = SliceCache::new();

    let (_, first) = cache.obtain(&uint256_array("T"), &mut enc);
    let (reused, second) = cache.obtain(&uint256_array("T"), &mut enc);
    assert!(reused);
    assert!(Rc::ptr_eq(&first, &second));
    assert!(Rc::ptr_eq(&first.predicates.slice, &second.predicates.slice));
    assert_eq!(enc.predicates().len(), 3);
    assert_eq!(enc.symbols().len(), 8);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_distinct_types_are_isolated() {
    let ctx = Context::new(&Config::default());
    let mut enc = EncodingCtx::new(&ctx);
    let mut cache = SliceCache::new();

    let (_, t) = cache.obtain(&uint256_array("T"), &mut enc);
    let (reused, u) = cache.obtain(
        &SortKind::named_array_tuple("U", SortKind::Bool),
        &mut enc,
    );
    assert!(!reused);
    for p in t.predicates.iter() {
        for q in u.predicates.iter() {
            assert_ne!(p.name(), q.name());
        }
    }
    assert_eq!(u.predicates.slice.name(), "array_slice_U");
    assert!(Rc::ptr_eq(cache.get("T").unwrap(), &t));
    assert_eq!(enc.predicates().len(), 6);

    let names: Vec<&str> = cache.iter().map(|data| data.tuple_name()).collect();
    assert_eq!(names, vec!["T", "U"]);
}

#[test]
fn test_shape() {
    let ctx = Context::new(&Config::default());
    let mut enc = EncodingCtx::new(&ctx);
    let mut cache = SliceCache::new();
    let (_, data) = cache.obtain(&SortKind::array_tuple(SortKind::UInt(8)), &mut enc);

    let arities: Vec<usize> = data.predicates.iter().map(|p| p.arity()).collect();
    assert_eq!(arities, vec![4, 5, 5]);

    let rules: Vec<(&str, usize)> = data
        .rules
        .iter()
        .map(|rule| (rule.name(), rule.body().len()))
        .collect();
    assert_eq!(
        rules,
        vec![("initiation", 1), ("exit", 2), ("guard", 3), ("step", 2)]
    );

    // a, b, start, end, i; the three index variables are range constrained
    assert_eq!(data.scope().get_bounds().count(), 5);
    assert_eq!(data.scope().get_constraints().count(), 3);
}

#[test]
fn test_rule_heads() {
    let ctx = Context::new(&Config::default());
    let mut enc = EncodingCtx::new(&ctx);
    let mut cache = SliceCache::new();
    let (_, data) = cache.obtain(&uint256_array("T"), &mut enc);
    let rules = &data.rules;

    assert_eq!(
        format!("{}", rules.initiation.head()),
        "(array_slice_header_T a_T_0 b_T_0 start_T_0 end_T_0 0)"
    );
    assert_eq!(
        format!("{}", rules.exit.head()),
        "(array_slice_T a_T_0 b_T_0 start_T_0 end_T_0)"
    );
    assert_eq!(
        format!("{}", rules.guard.head()),
        "(array_slice_loop_T a_T_0 b_T_0 start_T_0 end_T_0 i_T_0)"
    );
    assert_eq!(
        format!("{}", rules.step.head()),
        "(array_slice_header_T a_T_0 b_T_0 start_T_0 end_T_0 (+ i_T_0 1))"
    );

    let body_heads = |rule: &z3rro::horn::HornRule| format!("{}", rule.body()[0]);
    assert!(body_heads(&rules.exit).starts_with("(array_slice_header_T "));
    assert!(body_heads(&rules.guard).starts_with("(array_slice_header_T "));
    assert!(body_heads(&rules.step).starts_with("(array_slice_loop_T "));
}

#[test]
fn test_initiation_requires_nonempty_range() {
    test_prove(|ctx, _scope| {
        let mut enc = EncodingCtx::new(ctx);
        let mut cache = SliceCache::new();
        let (_, data) = cache.obtain(&uint256_array("T"), &mut enc);
        let vars = data.variables();
        data.rules.initiation.guard().iff(&vars.end.value().gt(&vars.start.value()))
    });
}

#[test]
fn test_step_compares_shifted_elements() {
    test_prove(|ctx, _scope| {
        let mut enc = EncodingCtx::new(ctx);
        let mut cache = SliceCache::new();
        let (_, data) = cache.obtain(&uint256_array("T"), &mut enc);
        let vars = data.variables();
        let i = vars.i.value();
        let shifted = Int::add(ctx, &[&vars.start.value(), &i]);
        let expected = vars.b.elements().select(&i)._eq(&vars.a.elements().select(&shifted));
        data.rules.step.body()[1].iff(&expected)
    });
}

#[test]
fn test_exit_and_guard_are_complementary() {
    // for every i >= 0, exactly one of the two rules applies to a header fact
    test_prove(|ctx, _scope| {
        let mut enc = EncodingCtx::new(ctx);
        let mut cache = SliceCache::new();
        let (_, data) = cache.obtain(&uint256_array("T"), &mut enc);
        let exit_condition = data.rules.exit.body()[1].clone();
        let guard_conditions: Vec<&Bool> = data.rules.guard.body()[1..].iter().collect();
        let guard_condition = Bool::and(ctx, &guard_conditions);
        let i = data.variables().i.value();
        i.ge(&Int::from_u64(ctx, 0))
            .implies(&exit_condition.xor(&guard_condition))
    });
}

#[test]
fn test_index_variables_are_bounded() {
    test_prove(|ctx, _scope| {
        let mut enc = EncodingCtx::new(ctx);
        let mut cache = SliceCache::new();
        let (_, data) = cache.obtain(&uint256_array("T"), &mut enc);
        let scope = data.scope();
        let start = data.variables().start.value();
        // no index is negative
        scope
            .exists(&[], &start.lt(&Int::from_u64(ctx, 0)))
            .not()
    });
}

#[test]
fn test_element_sorts() {
    let ctx = Context::new(&Config::default());
    let mut enc = EncodingCtx::new(&ctx);
    let mut cache = SliceCache::new();
    let point = SortKind::Tuple(TupleSort {
        name: "point".to_owned(),
        components: vec![SortKind::Int, SortKind::Int],
    });
    for element in [
        SortKind::Bool,
        SortKind::array(SortKind::UInt(8)),
        point,
    ] {
        let (reused, data) = cache.obtain(&SortKind::array_tuple(element.clone()), &mut enc);
        assert!(!reused);
        let array_sort = enc.sort(&SortKind::array(element));
        assert_eq!(&data.predicates.slice.domain()[0], &array_sort);
    }
    assert_eq!(cache.len(), 3);
}

#[test]
fn test_horn_system_export() {
    let ctx = Context::new(&Config::default());
    let mut enc = EncodingCtx::new(&ctx);
    let mut cache = SliceCache::new();
    cache.obtain(&uint256_array("T"), &mut enc);
    cache.obtain(&uint256_array("U"), &mut enc);

    let system = cache.to_horn_system(&enc);
    assert_eq!(system.len(), 8);
    assert_eq!(
        system.rule_names()[..4].to_vec(),
        vec!["initiation", "exit", "guard", "step"]
    );
    let text = system.to_smtlib().into_string();
    assert!(text.starts_with("(set-logic HORN)"));
    for name in ["array_slice_T", "array_slice_header_U", "array_slice_loop_U"] {
        assert!(text.contains(&format!("(declare-fun {} ", name)), "{}", name);
    }
}

#[test]
fn test_shape_errors() {
    assert_eq!(
        ArrayTuple::from_sort(&SortKind::Bool).unwrap_err(),
        SliceSortError::NotATuple(SortKind::Bool)
    );
    let empty = SortKind::Tuple(TupleSort {
        name: "empty".to_owned(),
        components: vec![],
    });
    assert_eq!(
        ArrayTuple::from_sort(&empty).unwrap_err(),
        SliceSortError::EmptyTuple("empty".to_owned())
    );
    assert_eq!(
        ArrayTuple::from_sort(&int_pair()).unwrap_err(),
        SliceSortError::NotAnArray {
            name: "pair".to_owned(),
            found: SortKind::index()
        }
    );
    let sort = uint256_array("T");
    let ok = ArrayTuple::from_sort(&sort).unwrap();
    assert_eq!(ok.name(), "T");
    assert_eq!(ok.array_sort(), &SortKind::array(SortKind::index()));
}

#[test]
#[should_panic(expected = "must be an array sort")]
fn test_tuple_of_ints_is_rejected() {
    let ctx = Context::new(&Config::default());
    let mut enc = EncodingCtx::new(&ctx);
    let mut cache = SliceCache::new();
    cache.obtain(&int_pair(), &mut enc);
}

#[test]
#[should_panic(expected = "expected a tuple sort")]
fn test_plain_array_is_rejected() {
    let ctx = Context::new(&Config::default());
    let mut enc = EncodingCtx::new(&ctx);
    let mut cache = SliceCache::new();
    cache.obtain(&SortKind::array(SortKind::index()), &mut enc);
}

#[test]
#[should_panic(expected = "refers to two different sorts")]
fn test_name_collision_is_detected() {
    let ctx = Context::new(&Config::default());
    let mut enc = EncodingCtx::new(&ctx);
    let mut cache = SliceCache::new();
    cache.obtain(&uint256_array("T"), &mut enc);
    cache.obtain(&SortKind::named_array_tuple("T", SortKind::Bool), &mut enc);
}

#[test]
#[should_panic(expected = "cannot encode array slices: a_T is already declared")]
fn test_taken_names_are_detected_before_declaring() {
    let ctx = Context::new(&Config::default());
    let mut enc = EncodingCtx::new(&ctx);
    enc.new_int_variable(&SortKind::Int, "a_T");
    let mut cache = SliceCache::new();
    cache.obtain(&uint256_array("T"), &mut enc);
}

/// Whether `obtain` panics for `sort`.
fn obtain_panics<'ctx>(
    cache: &mut SliceCache<'ctx>,
    enc: &mut EncodingCtx<'ctx>,
    sort: &SortKind,
) -> bool {
    panic::catch_unwind(AssertUnwindSafe(|| {
        cache.obtain(sort, enc);
    }))
    .is_err()
}

#[test]
fn test_rejected_requests_change_nothing() {
    let ctx = Context::new(&Config::default());
    let mut enc = EncodingCtx::new(&ctx);
    let mut cache = SliceCache::new();
    let (_, t) = cache.obtain(&uint256_array("T"), &mut enc);

    // the last name of `V` is taken, all others are free
    enc.new_int_variable(&SortKind::index(), "array_slice_loop_V");
    let symbols = enc.symbols().len();
    let predicates = enc.predicates().len();

    for sort in [
        int_pair(),
        SortKind::array(SortKind::index()),
        SortKind::named_array_tuple("T", SortKind::Bool),
        uint256_array("V"),
    ] {
        assert!(obtain_panics(&mut cache, &mut enc, &sort), "{}", sort);
        assert_eq!(enc.symbols().len(), symbols, "{}", sort);
        assert_eq!(enc.predicates().len(), predicates, "{}", sort);
        assert_eq!(cache.len(), 1, "{}", sort);
    }
    assert!(enc.symbols().kind("a_V").is_none());
    assert!(enc.predicates().get("array_slice_V").is_none());
    assert!(cache.get("V").is_none());

    // the existing entry still works
    let (reused, again) = cache.obtain(&uint256_array("T"), &mut enc);
    assert!(reused);
    assert!(Rc::ptr_eq(&t, &again));
}

/// Evaluate a quantifier-free condition over `start`, `end` and `i`.
fn eval_condition<'ctx>(
    ctx: &'ctx Context,
    condition: &Bool<'ctx>,
    vars: [(Int<'ctx>, u64); 3],
) -> bool {
    let values: Vec<(Int<'ctx>, Int<'ctx>)> = vars
        .iter()
        .map(|(var, value)| (var.clone(), Int::from_u64(ctx, *value)))
        .collect();
    let substitutions: Vec<(&Int<'ctx>, &Int<'ctx>)> =
        values.iter().map(|(var, value)| (var, value)).collect();
    condition
        .substitute(&substitutions)
        .simplify()
        .as_bool()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn exit_and_guard_partition_indices(start in 0u64..1000, end in 0u64..1000, i in 0u64..2000) {
        let ctx = Context::new(&Config::default());
        let mut enc = EncodingCtx::new(&ctx);
        let mut cache = SliceCache::new();
        let (_, data) = cache.obtain(&uint256_array("T"), &mut enc);
        let vars = data.variables();
        let assignment = || [
            (vars.start.value(), start),
            (vars.end.value(), end),
            (vars.i.value(), i),
        ];

        let exits = eval_condition(&ctx, &data.rules.exit.body()[1], assignment());
        let guard_conditions: Vec<&Bool> = data.rules.guard.body()[1..].iter().collect();
        let loops = eval_condition(&ctx, &Bool::and(&ctx, &guard_conditions), assignment());

        prop_assert_ne!(exits, loops);
        prop_assert_eq!(loops, (i as i128) < (end as i128) - (start as i128));
    }
}
