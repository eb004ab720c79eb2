//! Behavioural tests for [`BTBPredictor`].
//!
//! Covers cold misses, training, tag-miss resets, table sharing, statistics
//! and long randomized traces.

use btbsim::*;
use rand::prelude::*;
use rand::rngs::StdRng;
use btbsim::PredictionState::*;

fn build(
    size: usize,
    history_bits: u32,
    tag_bits: u32,
    initial_state: PredictionState,
    history: Scope,
    table: Scope,
    sharing: SharingMode,
) -> BTBPredictor {
    BTBConfig {
        size,
        history_bits,
        tag_bits,
        initial_state,
        history,
        table,
        sharing,
    }.build().unwrap()
}

fn scenario_a() -> BTBPredictor {
    build(8, 2, 4, WeaklyNotTaken, Scope::Local, Scope::Local, SharingMode::None)
}

fn state_at(btb: &BTBPredictor, pc: u32, fsm_idx: usize) -> PredictionState {
    let entry = btb.get_entry(btb.get_index(pc));
    *btb.table(entry.table()).get_entry(fsm_idx)
}

// ══════════════════════════════════════════════════════════
// 1. Cold misses and counters
// ══════════════════════════════════════════════════════════

#[test]
fn cold_predict_falls_through() {
    let mut btb = scenario_a();
    for pc in (0x4000..0x4100).step_by(4) {
        let p = btb.predict(pc);
        assert_eq!(p, BTBPrediction { taken: false, target: pc + 4 });
    }
    assert_eq!(btb.stats().branches, 64);
    assert_eq!(btb.stats().flushes, 0);
}

#[test]
fn fallthrough_wraps_at_top_of_address_space() {
    let mut btb = scenario_a();
    assert_eq!(btb.predict(0xffff_fffc).target, 0);
}

#[test]
fn flush_counting() {
    let mut btb = scenario_a();
    // Not taken, predicted fall-through
    btb.update(0x1000, 0x2000, false, 0x1004);
    assert_eq!(btb.stats().flushes, 0);
    // Not taken, predicted taken
    btb.update(0x1000, 0x2000, false, 0x2000);
    assert_eq!(btb.stats().flushes, 1);
    // Taken, predicted the right target
    btb.update(0x1000, 0x2000, true, 0x2000);
    assert_eq!(btb.stats().flushes, 1);
    // Taken, predicted the wrong target
    btb.update(0x1000, 0x2000, true, 0x3000);
    assert_eq!(btb.stats().flushes, 2);
    // Update never counts branches
    assert_eq!(btb.stats().branches, 0);
}

// ══════════════════════════════════════════════════════════
// 2. Training
// ══════════════════════════════════════════════════════════

#[test]
fn first_update_allocates_entry() {
    let mut btb = scenario_a();
    let p = btb.predict(0x1000);
    assert_eq!(p, BTBPrediction { taken: false, target: 0x1004 });
    assert_eq!(btb.stats().branches, 1);

    btb.update(0x1000, 0x2000, true, p.target);
    assert_eq!(btb.stats().flushes, 1);

    let entry = *btb.get_entry(btb.get_index(0x1000));
    assert!(entry.is_valid());
    assert_eq!(entry.tag(), btb.get_tag(0x1000));
    assert_eq!(entry.target(), 0x2000);
    assert_eq!(btb.history(entry.history()).value(), 1);
}

#[test]
fn repeated_taken_saturates_slot() {
    let mut btb = scenario_a();

    // Warm the history up to 0b11 so that every later update of this
    // branch selects the same slot.
    btb.update(0x1000, 0x2000, true, 0x1004);
    btb.update(0x1000, 0x2000, true, 0x1004);
    let entry = *btb.get_entry(btb.get_index(0x1000));
    assert_eq!(btb.history(entry.history()).value(), 0b11);
    assert_eq!(state_at(&btb, 0x1000, 0b11), WeaklyNotTaken);

    btb.update(0x1000, 0x2000, true, 0x1004);
    assert_eq!(state_at(&btb, 0x1000, 0b11), WeaklyTaken);
    btb.update(0x1000, 0x2000, true, 0x2000);
    assert_eq!(state_at(&btb, 0x1000, 0b11), StronglyTaken);

    assert_eq!(
        btb.predict(0x1000),
        BTBPrediction { taken: true, target: 0x2000 }
    );
}

#[test]
fn not_taken_state_predicts_fallthrough_on_hit() {
    let mut btb = scenario_a();
    btb.update(0x1000, 0x2000, false, 0x1004);
    let entry = *btb.get_entry(btb.get_index(0x1000));
    assert!(entry.hits(btb.get_tag(0x1000)));
    assert_eq!(
        btb.predict(0x1000),
        BTBPrediction { taken: false, target: 0x1004 }
    );
}

#[test]
fn aliasing_branch_relearns_from_scratch() {
    let mut btb = scenario_a();
    for _ in 0..4 {
        btb.update(0x1000, 0x2000, true, 0x2000);
    }
    assert!(btb.predict(0x1000).taken);

    // Same index, different tag
    let alias = 0x1000 + (8 << ALIGN_BITS);
    assert_eq!(btb.get_index(alias), btb.get_index(0x1000));
    assert!(!btb.predict(alias).taken);

    // The reset happens before learning: slot 0 of a fresh table is
    // trained, and the history holds only this outcome.
    btb.update(alias, 0x5000, true, alias + 4);
    let entry = *btb.get_entry(btb.get_index(alias));
    assert_eq!(btb.history(entry.history()).value(), 1);
    assert_eq!(state_at(&btb, alias, 0), WeaklyTaken);
    assert_eq!(state_at(&btb, alias, 1), WeaklyNotTaken);
    assert_eq!(state_at(&btb, alias, 3), WeaklyNotTaken);

    // The original branch now misses
    assert!(!btb.predict(0x1000).taken);
}

// ══════════════════════════════════════════════════════════
// 3. Sharing
// ══════════════════════════════════════════════════════════

#[test]
fn share_low_separates_branches_with_equal_history() {
    let mut btb = build(8, 2, 4, WeaklyNotTaken,
        Scope::Local, Scope::Global, SharingMode::ShareLow
    );

    // Both branches have zero history but differ in their low share bits
    let (a, b) = (0x1000, 0x1004);
    let ea = *btb.get_entry(btb.get_index(a));
    let eb = *btb.get_entry(btb.get_index(b));
    assert_eq!(btb.fsm_index(&ea, a), 0);
    assert_eq!(btb.fsm_index(&eb, b), 1);

    btb.update(a, 0x2000, true, a + 4);
    btb.update(b, 0x3000, false, b + 4);

    let table = btb.table(ea.table());
    assert_eq!(*table.get_entry(0), WeaklyTaken);
    assert_eq!(*table.get_entry(1), StronglyNotTaken);
}

#[test]
fn without_sharing_branches_collide() {
    let mut btb = build(8, 2, 4, WeaklyNotTaken,
        Scope::Local, Scope::Global, SharingMode::None
    );
    btb.update(0x1000, 0x2000, true, 0x1004);
    btb.update(0x1004, 0x3000, false, 0x1008);

    // Both outcomes landed in slot 0 and cancelled out
    let table = btb.table(btb.get_entry(0).table());
    assert_eq!(*table.get_entry(0), WeaklyNotTaken);
    assert!(table.iter().all(|s| *s == WeaklyNotTaken));
}

#[test]
fn share_mid_uses_upper_address_bits() {
    let btb = build(8, 2, 4, WeaklyNotTaken,
        Scope::Global, Scope::Global, SharingMode::ShareMid
    );
    let entry = *btb.get_entry(0);
    assert_eq!(btb.fsm_index(&entry, 0x0000_1000), 0);
    assert_eq!(btb.fsm_index(&entry, 0x0001_1000), 1);
    assert_eq!(btb.fsm_index(&entry, 0x0002_1000), 2);
    assert_eq!(btb.fsm_index(&entry, 0x0004_1000), 0);
}

#[test]
fn sharing_ignored_for_private_tables() {
    let btb = build(8, 2, 4, WeaklyNotTaken,
        Scope::Global, Scope::Local, SharingMode::ShareLow
    );
    let entry = *btb.get_entry(1);
    assert_eq!(btb.fsm_index(&entry, 0x1004), 0);
}

#[test]
fn global_history_is_shared_by_all_entries() {
    let mut btb = build(8, 3, 4, WeaklyNotTaken,
        Scope::Global, Scope::Local, SharingMode::None
    );
    btb.update(0x1000, 0x2000, true, 0x1004);
    btb.update(0x1004, 0x2000, false, 0x1008);
    btb.update(0x1008, 0x2000, true, 0x1004);
    for entry in btb.entries() {
        assert_eq!(btb.history(entry.history()).value(), 0b101);
    }
}

// ══════════════════════════════════════════════════════════
// 4. Statistics
// ══════════════════════════════════════════════════════════

#[test]
fn fresh_stats_match_formula() {
    let scopes = [Scope::Local, Scope::Global];
    for size in [1usize, 2, 4, 8, 16, 32] {
        for history_bits in 1..=8u32 {
            for history in scopes {
                for table in scopes {
                    let tag_bits = 30 - size.ilog2();
                    let btb = build(size, history_bits, tag_bits,
                        StronglyNotTaken, history, table, SharingMode::ShareLow
                    );
                    let tables = table.pool_size(size) as u64;
                    let histories = history.pool_size(size) as u64;
                    let expected = size as u64 * (1 + tag_bits as u64 + 30)
                        + 2 * tables * (1u64 << history_bits)
                        + histories * history_bits as u64;

                    let stats = btb.stats();
                    assert_eq!(stats.storage_bits, expected);
                    assert_eq!(stats.branches, 0);
                    assert_eq!(stats.flushes, 0);
                }
            }
        }
    }
}

#[test]
fn independent_predictors() {
    let mut a = scenario_a();
    let b = scenario_a();
    a.update(0x1000, 0x2000, true, 0x1004);
    let _ = a.predict(0x1000);
    assert_eq!(a.stats().branches, 1);
    assert_eq!(b.stats().branches, 0);
    assert!(!b.get_entry(0).is_valid());
}

// ══════════════════════════════════════════════════════════
// 5. Randomized traces
// ══════════════════════════════════════════════════════════

#[test]
fn random_traces_keep_invariants() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let scopes = [Scope::Local, Scope::Global];
    let modes = [SharingMode::None, SharingMode::ShareLow, SharingMode::ShareMid];

    for _ in 0..32 {
        let size = 1usize << rng.gen_range(0..6);
        let history_bits = rng.gen_range(1..=8);
        let tag_bits = rng.gen_range(0..=(30 - size.ilog2()));
        let initial = PredictionState::ALL[rng.gen_range(0..4)];
        let mut btb = build(size, history_bits, tag_bits, initial,
            *scopes.choose(&mut rng).unwrap(),
            *scopes.choose(&mut rng).unwrap(),
            *modes.choose(&mut rng).unwrap(),
        );

        let pcs: Vec<u32> = (0..16)
            .map(|_| rng.gen::<u32>() & !(INSTRUCTION_BYTES - 1))
            .collect();
        let mut expected_flushes = 0;
        for _ in 0..2000 {
            let pc = *pcs.choose(&mut rng).unwrap();
            let record = BranchRecord::new(pc, pc ^ 0x40, rng.gen::<bool>().into());
            let p = btb.simulate(&record);
            if p.target != record.next_pc() {
                expected_flushes += 1;
            }
        }

        let stats = btb.stats();
        assert_eq!(stats.branches, 2000);
        assert_eq!(stats.flushes, expected_flushes);
        assert_eq!(stats.storage_bits, btb.config().storage_bits());
        for h in btb.histories() {
            assert!(h.value() < (1 << history_bits));
            assert_eq!(h.len(), history_bits as usize);
        }
        for t in btb.tables() {
            assert_eq!(t.size(), 1 << history_bits);
        }
    }
}
