pub mod balance;
pub mod policy;
pub mod reports;
pub mod scenarios;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use balance::{
    BalanceAggregate, BalanceRecord, aggregate_balance, run_balance_sweep, validate_balance_targets,
};
pub use policy::GameplayStrategy;
pub use scenarios::{all_keys, get_scenario, list_scenarios};
pub use seeds::{SeedInfo, resolve_seed_inputs};
pub use tester::{LogicTester, ScenarioResult};
