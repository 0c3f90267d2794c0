// Frame budgets written into every method block. These are deliberately
// generous instead of computed per method.
pub const DEFAULT_STACK_LIMIT: u32 = 99;
pub const DEFAULT_LOCALS_LIMIT: u32 = 99;

// Root of the target class hierarchy, used when no superclass is declared
pub const ROOT_OBJECT_CLASS: &str = "java/lang/Object";
pub const STRING_CLASS: &str = "java/lang/String";

// Name of the entry method emitted as the platform's static entry point
pub const ENTRY_METHOD_NAME: &str = "main";

// Optimizer: upper bound on fold/propagate alternations
pub const OPTIMIZE_MAX_ROUNDS: usize = 32;
// Optimizer: maximum iterations simulated when proving a loop converges
pub const LOOP_SIMULATION_LIMIT: usize = 1_000;

// Configuration map keys
pub const CONFIG_INPUT_FILE: &str = "inputFile";
pub const CONFIG_OPTIMIZE: &str = "optimize";
pub const CONFIG_REGISTER_ALLOCATION: &str = "registerAllocation";
pub const CONFIG_DEBUG: &str = "debug";
