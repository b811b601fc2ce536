//! Seeded random operation sequences: invariants hold after every step and
//! replaying the same journal reproduces the same ledger.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use staking_core::*;

const ACCOUNTS: u8 = 6;
const STEPS: usize = 2_000;

fn owner() -> Address {
    Address::repeat_byte(0)
}

fn random_entry(rng: &mut ChaCha8Rng, ledger: &StakingLedger) -> JournalEntry {
    let caller = Address::repeat_byte(rng.random_range(0..ACCOUNTS));
    let operation = match rng.random_range(0..10) {
        0..=2 => {
            let balance = ledger.balance_of(&caller);
            Operation::Transfer {
                to: Address::repeat_byte(rng.random_range(0..ACCOUNTS)),
                amount: rng.random_range(0..=balance + 5),
            }
        }
        3..=5 => Operation::CreateStake {
            amount: rng.random_range(0..=ledger.balance_of(&caller) + 5),
        },
        6..=7 => Operation::RemoveStake {
            amount: rng.random_range(0..=ledger.stake_of(&caller) + 5),
        },
        8 => Operation::DistributeRewards,
        _ => Operation::WithdrawReward,
    };
    JournalEntry::new(caller, operation)
}

fn assert_invariants(ledger: &StakingLedger) {
    ledger.check_invariants().unwrap();

    let mut balances: Amount = 0;
    let mut stakes: Amount = 0;
    let mut rewards: Amount = 0;
    for byte in 0..ACCOUNTS {
        let account = Address::repeat_byte(byte);
        balances += ledger.balance_of(&account);
        stakes += ledger.stake_of(&account);
        rewards += ledger.reward_of(&account);
        assert_eq!(
            ledger.is_stakeholder(&account).0,
            ledger.stake_of(&account) > 0
        );
    }
    assert_eq!(balances, ledger.total_supply());
    assert_eq!(stakes, ledger.total_stakes());
    assert_eq!(rewards, ledger.total_rewards());
}

fn run(seed: u64) -> (StakingLedger, Vec<JournalEntry>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut ledger = StakingLedger::new(owner(), 100_000);
    let mut journal = Vec::with_capacity(STEPS);

    for _ in 0..STEPS {
        let entry = random_entry(&mut rng, &ledger);
        let before = ledger.clone();
        let result = ledger.apply(&entry.caller, &entry.operation);
        if result.is_err() {
            assert_eq!(ledger, before, "failed {:?} mutated state", entry);
        }
        assert_invariants(&ledger);
        journal.push(entry);
    }
    (ledger, journal)
}

#[test]
fn test_invariants_hold_on_random_walks() {
    for seed in 0..8 {
        run(seed);
    }
}

#[test]
fn test_replay_reproduces_random_walk() {
    let (ledger, journal) = run(42);

    let mut replayed = StakingLedger::new(owner(), 100_000);
    let outcomes = replay(&mut replayed, &journal);

    assert_eq!(outcomes.len(), STEPS);
    assert_eq!(replayed, ledger);
    assert_eq!(replayed.stakeholders(), ledger.stakeholders());
}
