//! Property tests for watermark semantics

use proptest::prelude::*;

use gerritpoll_core::{MemoryWatermarkStore, Watermark};

proptest! {
    /// Property: the watermark never regresses, whatever order candidates
    /// arrive in
    #[test]
    fn advance_is_monotonic(start in any::<i64>(), candidates in prop::collection::vec(any::<i64>(), 0..20)) {
        let mut mark = Watermark::from_millis(start);
        let mut highest = start;

        for candidate in candidates {
            let advanced = mark.advanced_by(candidate);
            prop_assert!(advanced >= mark);
            mark = advanced;
            highest = highest.max(candidate);
        }

        prop_assert_eq!(mark.as_millis(), highest);
    }

    /// Property: strict admission excludes the watermark itself and
    /// everything older
    #[test]
    fn admission_is_strictly_newer(mark_ms in any::<i64>(), record_ms in any::<i64>()) {
        let mark = Watermark::from_millis(mark_ms);
        prop_assert_eq!(mark.admits(record_ms), record_ms > mark_ms);
    }

    /// Property: the decimal store encoding round-trips every value
    #[test]
    fn store_encoding_roundtrips(ms in any::<i64>()) {
        let mark = Watermark::from_millis(ms);
        prop_assert_eq!(Watermark::decode(&mark.encode()).unwrap(), mark);
    }

    /// Property: save-then-load through a store is lossless
    #[test]
    fn store_roundtrip_is_lossless(ms in any::<i64>()) {
        let mut store = MemoryWatermarkStore::new();
        let mark = Watermark::from_millis(ms);
        mark.save(&mut store).unwrap();
        prop_assert_eq!(Watermark::load(&store).unwrap(), Some(mark));
    }
}
