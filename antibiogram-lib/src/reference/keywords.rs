pub const ANTIBIOTIC: &str = "antibiotic";
pub const BACTERIA: &str = "bacteria";
pub const FORMAT: &str = "format";
pub const INTERMEDIATE: &str = "intermediate";
pub const NAME: &str = "name";
pub const REACTION: &str = "reaction";
pub const RESISTANT: &str = "resistant";
pub const SUSCEPTIBLE: &str = "susceptible";
pub const THRESHOLD: &str = "threshold";
pub const VERSION: &str = "version";

pub const REFERENCE_FORMAT_NAME: &str = "antibiogram-reference";
