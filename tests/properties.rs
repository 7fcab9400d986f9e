use proptest::prelude::*;

use rust_data_masking::generators::{Generator, HashReducer, KeyedHash, RandomBytes};
use rust_data_masking::transformers::{Int64Limiter, Int64Transformer, IntWidth};

fn width() -> impl Strategy<Value = IntWidth> {
    prop_oneof![Just(IntWidth::Int2), Just(IntWidth::Int4), Just(IntWidth::Int8)]
}

/// A width together with an ordered pair of bounds inside it.
fn bounded() -> impl Strategy<Value = (IntWidth, i64, i64)> {
    width().prop_flat_map(|w| {
        let (lo, hi) = w.thresholds();
        let value = || -> BoxedStrategy<i64> {
            if w == IntWidth::Int8 { any::<i64>().boxed() } else { (lo..=hi).boxed() }
        };
        (Just(w), value(), value()).prop_map(|(w, a, b)| (w, a.min(b), a.max(b)))
    })
}

#[test]
fn default_bounds_are_exact_signed_ranges() {
    assert_eq!(IntWidth::Int2.thresholds(), (i16::MIN as i64, i16::MAX as i64));
    assert_eq!(IntWidth::Int4.thresholds(), (i32::MIN as i64, i32::MAX as i64));
    assert_eq!(IntWidth::Int8.thresholds(), (i64::MIN, i64::MAX));
}

proptest! {
    #[test]
    fn limit_always_lands_in_range((w, min, max) in bounded(), raw in any::<u64>()) {
        let l = Int64Limiter::new(min, max, w).unwrap();
        let v = l.limit(raw);
        prop_assert!(v >= min && v <= max, "{v} outside [{min}, {max}]");
    }

    #[test]
    fn full_range_limiter_stays_inside_width(w in width(), raw in any::<u64>()) {
        let (lo, hi) = w.thresholds();
        let v = Int64Limiter::full_range(w).limit(raw);
        prop_assert!(v >= lo && v <= hi);
    }

    #[test]
    fn reducer_output_has_exact_size(size in 1usize..=32, input in proptest::collection::vec(any::<u8>(), 0..64)) {
        let r = HashReducer::new(KeyedHash::new(b"salt".to_vec()), size).unwrap();
        prop_assert_eq!(r.size(), size);
        prop_assert_eq!(r.generate(&input).unwrap().len(), size);
    }

    #[test]
    fn reducer_rejects_sizes_beyond_inner(size in 33usize..1024) {
        prop_assert!(HashReducer::new(KeyedHash::new(Vec::new()), size).is_err());
    }

    #[test]
    fn keyed_integers_are_deterministic((w, min, max) in bounded(), input in "[0-9]{1,12}") {
        let gen_a = HashReducer::new(KeyedHash::new(b"k".to_vec()), 8).unwrap();
        let gen_b = HashReducer::new(KeyedHash::new(b"k".to_vec()), 8).unwrap();
        let a = Int64Transformer::new(Box::new(gen_a)).unwrap();
        let b = Int64Transformer::new(Box::new(gen_b)).unwrap();
        let l = Int64Limiter::new(min, max, w).unwrap();

        let va = a.generate(input.as_bytes(), &l).unwrap();
        prop_assert_eq!(va, b.generate(input.as_bytes(), &l).unwrap());
        prop_assert!(va >= min && va <= max);
    }

    #[test]
    fn seeded_random_integers_respect_bounds((w, min, max) in bounded(), seed in any::<u64>()) {
        let t = Int64Transformer::new(Box::new(RandomBytes::new(seed, 8))).unwrap();
        let l = Int64Limiter::new(min, max, w).unwrap();
        for _ in 0..16 {
            let v = t.generate(b"ignored", &l).unwrap();
            prop_assert!(v >= min && v <= max);
        }
    }
}
