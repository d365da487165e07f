pub const APP_NAME: &str = "Chirp";

// Limits
pub const MAX_CHIRP_LENGTH: usize = 280;
pub const MAX_BIO_LENGTH: usize = 160;
pub const MAX_HANDLE_LENGTH: usize = 24;
pub const MIN_HANDLE_LENGTH: usize = 3;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_EMOJI_LENGTH: usize = 16;
pub const MAX_SHOWCASE_CARDS: i64 = 3;

// Pagination
pub const FEED_PAGE_SIZE: i64 = 20;
pub const MAX_FEED_PAGE_SIZE: i64 = 50;
pub const NOTIFICATION_PAGE_SIZE: i64 = 50;

// Feed cache TTLs: the first page is kept fresher than deep pages
pub const FIRST_PAGE_TTL_SECS: u64 = 300;
pub const DEEP_PAGE_TTL_SECS: u64 = 600;
pub const AGGREGATE_TIMEOUT_SECS: u64 = 4;

// Crystals
pub const WELCOME_BONUS_CRYSTALS: i64 = 100;
pub const CRYSTALS_PER_LIKE: i64 = 2;
pub const CRYSTALS_PER_REPLY: i64 = 5;
pub const CAPSULE_COST_CRYSTALS: i64 = 100;
