// src/config/consts.rs

// Prediction service
pub const API_BASE: &str = "https://romulus.tail8ddf.ts.net/";
pub const SUPPORT_CONTACT: &str = "derek@fulton.consulting";
pub const REQUEST_TIMEOUT_SECS: u64 = 15;
pub const NO_WAYPOINT: &str = "nowhere";
pub const NO_LAYOVER: &str = "nolayover";

// Local store
pub const STORE_DIR: &str = ".store";
pub const LOG_FILE: &str = "debug.log";
pub const OPTIONS_FILE: &str = "options.json";
pub const COUNTER_FILE: &str = "counter.json";

// Usage accounting (logged, never enforced)
pub const FREE_TIER_LIMIT: u64 = 100;

// Page watcher
pub const DEBOUNCE_MS: u64 = 250;

// Concurrency
pub const WORKERS: usize = 4;

// Host page shape: which <ul>s carry results, and where the card body sits under each <li>
pub const RESULT_LIST_INDICES: [usize; 2] = [4, 5];
pub const CARD_BODY_PATH: [usize; 5] = [0, 1, 0, 1, 0];
