//! Centralized balance and tuning constants for the simulation.
//!
//! Data files describe the world (nations, research, events); everything
//! that decides how the world evolves lives here so balance changes go
//! through code review.

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_TRUCE_EXPIRED: &str = "log.treaty.truce-expired";
pub(crate) const LOG_NATION_ELIMINATED: &str = "log.nation.eliminated";
pub(crate) const LOG_RESOURCE_SHORTAGE: &str = "log.economy.shortage";
pub(crate) const LOG_INFRASTRUCTURE_BUILT: &str = "log.economy.infrastructure";

// Nation defaults ----------------------------------------------------------
pub(crate) const DEFAULT_PRODUCTION: i32 = 50;
pub(crate) const DEFAULT_POPULATION: f32 = 50.0;
pub(crate) const DEFAULT_CITIES: u32 = 10;
pub(crate) const DEFAULT_MORALE: f32 = 60.0;
pub(crate) const DEFAULT_PUBLIC_OPINION: f32 = 55.0;
pub(crate) const DEFAULT_INSTABILITY: f32 = 20.0;
/// Below this many millions a nation is considered destroyed.
pub(crate) const ELIMINATION_POPULATION: f32 = 1.0;

// Campaign -----------------------------------------------------------------
pub(crate) const DEFAULT_MAX_TURNS: u32 = 60;
pub(crate) const NUCLEAR_WINTER_RADIATION: f32 = 400.0;
pub(crate) const COLLAPSE_INSTABILITY: f32 = 100.0;
pub(crate) const DIPLOMATIC_VICTORY_MIN_TURN: u32 = 20;
/// Fraction of surviving nations the player must be allied with.
pub(crate) const DIPLOMATIC_VICTORY_SHARE: f32 = 0.6;

// Economy ------------------------------------------------------------------
pub(crate) const PRODUCTION_PER_CITY: f32 = 2.0;
pub(crate) const BASE_INTEL_INCOME: i32 = 2;
pub(crate) const DEFAULT_STOCKPILE_CAPACITY: f32 = 200.0;
pub(crate) const INFRASTRUCTURE_MAX: u8 = 5;
pub(crate) const INFRASTRUCTURE_YIELD_STEP: f32 = 0.2;
pub(crate) const INFRASTRUCTURE_COST_PER_LEVEL: i32 = 20;
pub(crate) const FOOD_PER_MILLION: f32 = 0.05;
pub(crate) const OIL_PER_DELIVERY_SYSTEM: f32 = 0.2;
pub(crate) const OIL_PER_FORMATION: f32 = 0.1;
pub(crate) const FOOD_SHORTAGE_MORALE: f32 = 10.0;
pub(crate) const FOOD_SHORTAGE_INSTABILITY: f32 = 8.0;
pub(crate) const OIL_SHORTAGE_PRODUCTION: f32 = 10.0;
pub(crate) const RARE_EARTH_PRODUCTION_BONUS: f32 = 2.0;

// Relations ----------------------------------------------------------------
pub(crate) const RELATIONSHIP_MIN: i32 = -100;
pub(crate) const RELATIONSHIP_MAX: i32 = 100;
pub(crate) const BASELINE_TRUST: f32 = 50.0;
pub(crate) const TRUST_DRIFT_PER_TURN: f32 = 1.0;
pub(crate) const THREAT_DECAY_RATE: f32 = 0.05;
pub(crate) const THREAT_FLOOR: f32 = 0.5;
pub(crate) const BETRAYAL_TRUST_PENALTY: f32 = 20.0;
pub(crate) const BETRAYAL_RELATIONSHIP_PENALTY: i32 = 25;

// Diplomatic influence -----------------------------------------------------
pub(crate) const STARTING_DIP: i32 = 10;
pub(crate) const BASE_DIP_INCOME: i32 = 2;
pub(crate) const MAX_DIP_INCOME: i32 = 10;
pub(crate) const MAX_DIP_POINTS: i32 = 200;
pub(crate) const DIP_FRIENDLY_RELATIONSHIP: i32 = 25;
/// One extra DIP per this many friendly nations.
pub(crate) const DIP_PER_FRIENDS: usize = 3;
pub(crate) const DIP_HISTORY_LIMIT: usize = 20;

// Proposal evaluation ------------------------------------------------------
pub(crate) const RELATIONSHIP_WEIGHT: f32 = 0.5;
pub(crate) const TRUST_WEIGHT: f32 = 0.4;
pub(crate) const THREAT_WEIGHT: f32 = 0.3;
pub(crate) const FAVOR_WEIGHT: f32 = 2.0;
pub(crate) const FAVOR_SCORE_CAP: f32 = 20.0;
pub(crate) const TREATY_ALLIANCE_BONUS: f32 = 20.0;
pub(crate) const TREATY_MINOR_BONUS: f32 = 5.0;
pub(crate) const SANCTION_SCORE_PENALTY: f32 = 15.0;
pub(crate) const DIP_OFFER_WEIGHT: f32 = 0.5;
pub(crate) const DESPERATION_INSTABILITY: f32 = 60.0;
pub(crate) const DESPERATION_MORALE: f32 = 30.0;
pub(crate) const DESPERATION_BONUS: f32 = 10.0;
pub(crate) const INTIMIDATION_RATIO: f32 = 2.0;
pub(crate) const INTIMIDATION_BONUS: f32 = 10.0;
pub(crate) const CHAOTIC_NOISE: f32 = 15.0;
/// Largest shortfall that still earns a counter-offer.
pub(crate) const COUNTER_OFFER_WINDOW: f32 = 15.0;
pub(crate) const ACCEPT_RELATIONSHIP_BONUS: i32 = 5;
pub(crate) const ACCEPT_TRUST_BONUS: f32 = 3.0;
pub(crate) const REJECT_RELATIONSHIP_PENALTY: i32 = 3;
pub(crate) const PROPOSAL_HISTORY_LIMIT: usize = 50;

// Sanctions ----------------------------------------------------------------
pub(crate) const SANCTION_PENALTY_PER_IMPOSER: f32 = 0.1;
pub(crate) const SANCTION_PENALTY_CAP: f32 = 0.5;
pub(crate) const SANCTION_RELATIONSHIP_PENALTY: i32 = 15;
pub(crate) const SANCTION_LIFT_RELATIONSHIP: i32 = 10;
pub(crate) const SANCTION_INSTABILITY: f32 = 2.0;

// Governance ---------------------------------------------------------------
pub(crate) const STARTING_LEGITIMACY: f32 = 60.0;
pub(crate) const GOVERNMENT_CHANGE_LEGITIMACY: f32 = 40.0;
pub(crate) const GOVERNMENT_CHANGE_INSTABILITY: f32 = 15.0;
pub(crate) const OPINION_DRIFT_RATE: f32 = 0.1;
pub(crate) const LEGITIMACY_DRIFT_RATE: f32 = 0.1;
pub(crate) const LEGITIMACY_INSTABILITY_WEIGHT: f32 = 0.05;
pub(crate) const UNREST_FLOOR: f32 = 30.0;
pub(crate) const UNREST_WEIGHT: f32 = 0.1;
pub(crate) const ELECTION_MIN_OPINION: f32 = 40.0;
pub(crate) const ELECTION_WIN_LEGITIMACY: f32 = 10.0;
pub(crate) const ELECTION_LOSS_INSTABILITY: f32 = 10.0;
pub(crate) const COUP_THRESHOLD: f32 = 80.0;
pub(crate) const AI_GOV_JUNTA_INSTABILITY: f32 = 75.0;
pub(crate) const AI_GOV_HAWK_INSTABILITY: f32 = 50.0;
pub(crate) const AI_GOV_LOW_MORALE: f32 = 30.0;
pub(crate) const AI_GOV_TECH_MIN_RESEARCH: usize = 8;
pub(crate) const AI_GOV_TECH_MAX_INSTABILITY: f32 = 40.0;
pub(crate) const AI_GOV_DEMOCRACY_MIN_OPINION: f32 = 60.0;
pub(crate) const AI_GOV_DEMOCRACY_MAX_INSTABILITY: f32 = 35.0;

// Political events ---------------------------------------------------------
pub(crate) const EVENT_BASE_CHANCE: f32 = 0.08;
pub(crate) const EVENT_INSTABILITY_DIVISOR: f32 = 250.0;

// Covert operations --------------------------------------------------------
pub(crate) const MIN_CHANCE: f32 = 0.05;
pub(crate) const MAX_CHANCE: f32 = 0.95;
pub(crate) const ESPIONAGE_FAILURE_DETECTION_BONUS: f32 = 0.2;
pub(crate) const ESPIONAGE_DETECTED_RELATIONSHIP: i32 = 10;
pub(crate) const ESPIONAGE_DETECTED_TRUST: f32 = 8.0;
pub(crate) const ESPIONAGE_DETECTED_THREAT: f32 = 5.0;
pub(crate) const SABOTAGE_PRODUCTION: i32 = 15;
pub(crate) const INCITE_INSTABILITY: f32 = 8.0;
pub(crate) const INCITE_OPINION: f32 = 5.0;
pub(crate) const PLANT_EVIDENCE_RELATIONSHIP: i32 = 15;
pub(crate) const PLANT_EVIDENCE_TRUST: f32 = 10.0;
pub(crate) const STOLEN_DOCUMENTS_INTEL: i32 = 10;

// Cyber warfare ------------------------------------------------------------
pub(crate) const CYBER_READINESS_MAX: f32 = 100.0;
pub(crate) const CYBER_READINESS_REGEN: f32 = 5.0;
pub(crate) const CYBER_SKILL_SCALE: f32 = 100.0;
pub(crate) const CYBER_ATTRIBUTION_BASE: f32 = 0.3;
pub(crate) const CYBER_ATTRIBUTION_FAILURE_BONUS: f32 = 0.2;
pub(crate) const CYBER_ATTRIBUTION_RELATIONSHIP: i32 = 10;
pub(crate) const CYBER_ATTRIBUTION_THREAT: f32 = 8.0;
pub(crate) const INTRUSION_INTEL_STOLEN: i32 = 8;
pub(crate) const GRID_DISRUPTION_PRODUCTION: i32 = 10;
pub(crate) const GRID_DISRUPTION_MORALE: f32 = 5.0;
pub(crate) const FALSE_FLAG_RELATIONSHIP: i32 = 20;
pub(crate) const FALSE_FLAG_THREAT: f32 = 10.0;

// Bio laboratories ---------------------------------------------------------
pub(crate) const BIOLAB_MAX_TIER: u8 = 4;
pub(crate) const BIOLAB_DEFAULT_TIER_CAP: u8 = 2;
pub(crate) const BIOLAB_PRODUCTION_COST_PER_TIER: i32 = 25;
pub(crate) const BIOLAB_INTEL_COST_PER_TIER: i32 = 5;
pub(crate) const BIOLAB_BASE_TURNS: u32 = 2;
pub(crate) const BIOLAB_INTEL_YIELD: i32 = 1;
pub(crate) const PATHOGEN_MIN_TIER: u8 = 3;
pub(crate) const PATHOGEN_POPULATION_PER_TIER: f32 = 0.01;
pub(crate) const PATHOGEN_MORALE: f32 = 10.0;
pub(crate) const PATHOGEN_DETECTION_BASE: f32 = 0.5;
pub(crate) const PATHOGEN_DETECTION_STEP: f32 = 0.15;
pub(crate) const PATHOGEN_TARGET_RELATIONSHIP: i32 = 40;
pub(crate) const PATHOGEN_DETECTED_RELATIONSHIP: i32 = 15;
pub(crate) const PATHOGEN_DETECTED_THREAT: f32 = 15.0;

// Military -----------------------------------------------------------------
pub(crate) const MAX_TEMPLATE_UNITS: u32 = 20;
pub(crate) const STANDARD_TEMPLATE_NAME: &str = "line_division";
pub(crate) const MISSILE_PRODUCTION_COST: i32 = 25;
pub(crate) const BOMBER_PRODUCTION_COST: i32 = 20;
pub(crate) const SUBMARINE_PRODUCTION_COST: i32 = 40;
pub(crate) const DEFENSE_PRODUCTION_COST: i32 = 15;
pub(crate) const WARHEAD_PRODUCTION_COST: i32 = 15;

// Nuclear warfare ----------------------------------------------------------
pub(crate) const DEFCON_MAX: u8 = 5;
pub(crate) const DEFCON_MIN: u8 = 1;
/// Launches are only authorized at or below this level.
pub(crate) const DEFCON_STRIKE_THRESHOLD: u8 = 2;
/// Highest threat anywhere in the world mapped to the DEFCON it pulls toward.
pub(crate) const DEFCON_TENSION_BANDS: &[(f32, u8)] = &[(90.0, 2), (70.0, 3), (40.0, 4)];
pub(crate) const ESCALATION_THREAT: f32 = 5.0;
pub(crate) const INTERCEPT_PER_DEFENSE: f32 = 0.05;
pub(crate) const INTERCEPT_CAP: f32 = 0.75;
pub(crate) const CASUALTIES_PER_MEGATON: f32 = 2.0;
pub(crate) const MAX_CASUALTY_FRACTION: f32 = 0.3;
pub(crate) const MEGATONS_PER_CITY: u32 = 10;
pub(crate) const RADIATION_PER_MEGATON: f32 = 1.0;
pub(crate) const STRIKE_MORALE: f32 = 20.0;
pub(crate) const STRIKE_INSTABILITY: f32 = 15.0;
pub(crate) const STRIKE_TARGET_RELATIONSHIP: i32 = 60;
pub(crate) const STRIKE_WORLD_RELATIONSHIP: i32 = 25;
pub(crate) const STRIKE_THREAT: f32 = 30.0;

// AI -----------------------------------------------------------------------
pub(crate) const AI_IDLE_WEIGHT: f32 = 1.0;
pub(crate) const AI_ALLIANCE_SCORE: f32 = 30.0;
pub(crate) const AI_TRUCE_THREAT: f32 = 30.0;
pub(crate) const AI_SANCTION_RELATIONSHIP: i32 = -40;
pub(crate) const AI_PATHOGEN_RELATIONSHIP: i32 = -60;
pub(crate) const AI_ESCALATION_THREAT: f32 = 40.0;
pub(crate) const AI_STRIKE_THREAT: f32 = 70.0;
pub(crate) const AI_GOVERNMENT_REVIEW_TURNS: u32 = 10;
/// Multiplier on hostile weights in brinkmanship mode.
pub(crate) const AI_BRINKMANSHIP_HOSTILITY: f32 = 1.5;
