//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Offline catch-up, replays and save migration all assume that the same
//! state and the same inputs produce bit-identical results. Sources of
//! non-determinism include:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   State maps are `BTreeMap`s and catalogs are ordered `Vec`s.
//!
//! - **Ambient randomness**: Every roll draws from the seed stored in
//!   [`GameState`]; nothing reads a system RNG.
//!
//! - **Clocks**: Callers pass `now_ms` and `dt_ms` explicitly.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual subsystem determinism (forging, expeditions)
//! 2. **Property tests**: Random scripts must still produce deterministic outputs
//! 3. **Snapshot tests**: Restoring a snapshot mid-script changes nothing
//! 4. **Parallel tests**: Running N scripts on separate threads all match

use std::thread;

use sect_core::error::Result;
use sect_core::replay::ReplayInput;
use sect_core::state::GameState;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps applied per run.
    pub steps: u64,
}

impl DeterminismResult {
    fn from_hashes(hashes: Vec<u64>, steps: u64) -> Self {
        Self {
            is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
            hashes,
            steps,
        }
    }

    /// Get all unique hashes (should be 1 for a deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `steps` - Number of steps to apply per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```
/// use sect_test_utils::determinism::verify_determinism;
/// use sect_core::state::GameState;
/// use sect_core::tick::tick;
///
/// let result = verify_determinism(
///     3,
///     50,
///     || GameState::new(7),
///     |state| *state = tick(state, 1_000.0).unwrap().into_state(),
///     GameState::state_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..steps {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    DeterminismResult::from_hashes(hashes, steps)
}

/// Apply every input of `script` in order.
///
/// # Errors
///
/// Returns the first fatal error raised by an input.
pub fn run_script(initial: &GameState, script: &[ReplayInput]) -> Result<GameState> {
    script
        .iter()
        .try_fold(initial.clone(), |state, input| input.apply(&state))
}

/// Run `script` from the same setup `runs` times and compare final hashes.
///
/// # Errors
///
/// Returns the first fatal error raised by the script.
pub fn verify_script_determinism<F>(
    setup_fn: F,
    script: &[ReplayInput],
    runs: usize,
) -> Result<DeterminismResult>
where
    F: Fn() -> GameState,
{
    let hashes = (0..runs)
        .map(|_| run_script(&setup_fn(), script).map(|s| s.state_hash()))
        .collect::<Result<Vec<_>>>()?;
    Ok(DeterminismResult::from_hashes(hashes, script.len() as u64))
}

/// Run `script` on `num_runs` threads at once and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
///
/// # Errors
///
/// Returns the first fatal error raised by the script.
pub fn run_parallel_scripts<F>(
    setup_fn: F,
    script: &[ReplayInput],
    num_runs: usize,
) -> Result<DeterminismResult>
where
    F: Fn() -> GameState + Sync,
{
    let results: Vec<Result<u64>> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_runs)
            .map(|_| s.spawn(|| run_script(&setup_fn(), script).map(|st| st.state_hash())))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    });
    let hashes = results.into_iter().collect::<Result<Vec<_>>>()?;
    Ok(DeterminismResult::from_hashes(hashes, script.len() as u64))
}

/// Compare two runs input by input, finding the first divergence.
///
/// Useful for debugging non-determinism by finding exactly which input
/// makes runs differ.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(n)` if they differ after `n`
/// inputs (0 meaning the setups already differ).
///
/// # Errors
///
/// Returns the first fatal error raised by the script.
pub fn find_first_divergence<F>(setup_fn: F, script: &[ReplayInput]) -> Result<Option<usize>>
where
    F: Fn() -> GameState,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Ok(Some(0));
    }

    for (index, input) in script.iter().enumerate() {
        first = input.apply(&first)?;
        second = input.apply(&second)?;
        if first.state_hash() != second.state_hash() {
            tracing::debug!(index, ?input, "Runs diverged");
            return Ok(Some(index + 1));
        }
    }

    Ok(None)
}

/// Verify that a binary snapshot taken between every input changes nothing.
///
/// Runs the script once directly and once restoring a snapshot before each
/// input; both must finish in the same state.
///
/// # Errors
///
/// Returns an error if a snapshot fails or an input fails fatally.
pub fn verify_snapshot_determinism<F>(setup_fn: F, script: &[ReplayInput]) -> Result<bool>
where
    F: Fn() -> GameState,
{
    let direct = run_script(&setup_fn(), script)?;

    let mut restored = setup_fn();
    for input in script {
        let bytes = restored.to_bytes()?;
        restored = input.apply(&GameState::from_bytes(&bytes)?)?;
    }

    Ok(direct == restored && direct.state_hash() == restored.state_hash())
}

/// Proptest strategies for generating simulation inputs.
pub mod strategies {
    use proptest::prelude::*;
    use proptest::sample::select;

    use sect_core::actions::Action;
    use sect_core::automation::{AutoAcceptMode, AutomationSettings};
    use sect_core::catalog::{catalog, DiscipleRole, EquipSlot};
    use sect_core::replay::ReplayInput;

    fn ids<T>(defs: &[T], id: impl Fn(&T) -> &String) -> Vec<String> {
        defs.iter().map(|d| id(d).clone()).collect()
    }

    /// Generate a time step between 1 ms and 10 minutes, in whole ms.
    pub fn arb_dt() -> impl Strategy<Value = f64> {
        (1u32..600_000u32).prop_map(f64::from)
    }

    /// Generate a wall-clock timestamp within the first day.
    pub fn arb_now_ms() -> impl Strategy<Value = u64> {
        0u64..86_400_000u64
    }

    /// Generate a disciple role.
    pub fn arb_role() -> impl Strategy<Value = DiscipleRole> {
        select(vec![
            DiscipleRole::Gatherer,
            DiscipleRole::Miner,
            DiscipleRole::Scholar,
            DiscipleRole::ContractClerk,
            DiscipleRole::Smith,
            DiscipleRole::Alchemist,
        ])
    }

    /// Generate automation settings.
    pub fn arb_automation() -> impl Strategy<Value = AutomationSettings> {
        let blueprints = ids(&catalog().blueprints, |b| &b.id);
        (
            any::<bool>(),
            select(vec![
                AutoAcceptMode::Off,
                AutoAcceptMode::Recommended,
                AutoAcceptMode::HighestScore,
            ]),
            proptest::option::of(select(blueprints)),
        )
            .prop_map(|(auto_claim, auto_accept, auto_forge)| AutomationSettings {
                auto_claim,
                auto_accept,
                auto_forge,
            })
    }

    /// Generate a progression action: purchases, contracts and realm moves.
    pub fn arb_progression_action() -> impl Strategy<Value = Action> {
        let catalog = catalog();
        let upgrades = ids(&catalog.upgrades, |d| &d.id);
        let research = ids(&catalog.research, |d| &d.id);
        let contracts = ids(&catalog.contracts, |d| &d.id);
        let facilities = ids(&catalog.facilities, |d| &d.id);

        prop_oneof![
            Just(Action::Focus),
            select(upgrades).prop_map(|upgrade_id| Action::BuyUpgrade { upgrade_id }),
            select(research).prop_map(|research_id| Action::BuyResearch { research_id }),
            select(contracts.clone())
                .prop_map(|contract_id| Action::AcceptContract { contract_id }),
            select(contracts).prop_map(|contract_id| Action::CompleteContract { contract_id }),
            select(facilities).prop_map(|facility_id| Action::UpgradeFacility { facility_id }),
            Just(Action::Ascend),
            Just(Action::Breakthrough),
        ]
    }

    /// Generate a crafting action: forge, alchemy, equipment and expeditions.
    ///
    /// Instance ids are drawn from a small range so some refer to real
    /// inventory items and some do not.
    pub fn arb_crafting_action() -> impl Strategy<Value = Action> {
        let catalog = catalog();
        let blueprints = ids(&catalog.blueprints, |d| &d.id);
        let recipes = ids(&catalog.recipes, |d| &d.id);
        let consumables = ids(&catalog.consumables, |d| &d.id);
        let expeditions = ids(&catalog.expeditions, |d| &d.id);
        let instance_id = (1u64..6u64).prop_map(|n| n.to_string());

        prop_oneof![
            instance_id
                .clone()
                .prop_map(|instance_id| Action::Equip { instance_id }),
            select(EquipSlot::ALL.to_vec()).prop_map(|slot| Action::Unequip { slot }),
            instance_id.prop_map(|instance_id| Action::Disassemble { instance_id }),
            select(blueprints).prop_map(|blueprint_id| Action::StartForge { blueprint_id }),
            select(recipes).prop_map(|recipe_id| Action::StartAlchemy { recipe_id }),
            select(consumables)
                .prop_map(|consumable_id| Action::UseConsumable { consumable_id }),
            select(expeditions)
                .prop_map(|expedition_id| Action::StartExpedition { expedition_id }),
        ]
    }

    /// Generate a disciple or automation action.
    pub fn arb_sect_action() -> impl Strategy<Value = Action> {
        prop_oneof![
            Just(Action::RecruitDisciple),
            (1u32..5u32, proptest::option::of(arb_role()))
                .prop_map(|(disciple_id, role)| Action::AssignDisciple { disciple_id, role }),
            arb_automation().prop_map(|settings| Action::SetAutomation { settings }),
            Just(Action::Unknown),
        ]
    }

    /// Generate any action whose definition ids exist in the catalog.
    pub fn arb_action() -> impl Strategy<Value = Action> {
        prop_oneof![
            arb_progression_action(),
            arb_crafting_action(),
            arb_sect_action(),
        ]
    }

    /// Generate a single replay input.
    pub fn arb_input() -> impl Strategy<Value = ReplayInput> {
        prop_oneof![
            arb_dt().prop_map(|dt_ms| ReplayInput::Tick { dt_ms }),
            (arb_action(), arb_now_ms())
                .prop_map(|(action, now_ms)| ReplayInput::Action { action, now_ms }),
        ]
    }

    /// Generate a script of up to `max_len` inputs.
    pub fn arb_script(max_len: usize) -> impl Strategy<Value = Vec<ReplayInput>> {
        proptest::collection::vec(arb_input(), 0..max_len)
    }

    /// Generate a run's essence total at or above the ascension threshold.
    pub fn arb_ascendable_essence() -> impl Strategy<Value = f64> {
        let threshold = catalog().balance.ascension.essence_threshold;
        (0u32..1_000_000_000u32).prop_map(move |extra| threshold + f64::from(extra))
    }

    /// Generate a completed-contract count.
    pub fn arb_contracts_completed() -> impl Strategy<Value = u64> {
        0u64..100_000u64
    }
}
