pub const API_PREFIX: &str = "/api";

// Pagination defaults
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

// Accounts
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 7 * 24;

// Request metadata
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
pub const REAL_IP_HEADER: &str = "x-real-ip";

pub fn survey_export_filename(survey_id: &str) -> String {
    format!("survey-{survey_id}-responses.csv")
}
