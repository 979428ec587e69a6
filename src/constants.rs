/// Column names of the source catalogue. These are a hard contract with the input file.
pub const COL_APP: &str = "App";
pub const COL_CATEGORY: &str = "Category";
pub const COL_RATING: &str = "Rating";
pub const COL_REVIEWS: &str = "Reviews";
pub const COL_SIZE: &str = "Size";
pub const COL_INSTALLS: &str = "Installs";
pub const COL_TYPE: &str = "Type";
pub const COL_PRICE: &str = "Price";
pub const COL_CONTENT_RATING: &str = "Content Rating";
pub const COL_GENRES: &str = "Genres";
pub const COL_LAST_UPDATED: &str = "Last Updated";
pub const COL_ANDROID_VER: &str = "Android Ver";

/// Columns every analysis needs after pruning.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    COL_APP,
    COL_CATEGORY,
    COL_RATING,
    COL_REVIEWS,
    COL_SIZE,
    COL_INSTALLS,
    COL_TYPE,
    COL_PRICE,
    COL_CONTENT_RATING,
    COL_GENRES,
];

/// Columns discarded before sanitizing, unless overridden in config
pub const DEFAULT_DROPPED_COLUMNS: [&str; 2] = [COL_LAST_UPDATED, COL_ANDROID_VER];

// Derived column labels used in listings and chart tables
pub const COL_SIZE_MB: &str = "Size_MB";
pub const COL_REVENUE: &str = "Revenue_Estimate";
pub const COL_COUNT: &str = "Count";
pub const COL_NUMBER_OF_APPS: &str = "Number of Apps";
pub const COL_TOTAL_INSTALLS: &str = "Total Installs";
pub const COL_GENRE: &str = "Genre";

/// Size values that mean "no numeric size", compared case-insensitively
pub const DEFAULT_SIZE_SENTINELS: [&str; 1] = ["Varies with device"];

/// Cell contents treated as a missing value at load time
pub const DEFAULT_MISSING_MARKERS: [&str; 6] = ["", "NaN", "nan", "NA", "N/A", "null"];

pub const DEFAULT_GENRE_DELIMITER: char = ';';

/// Paid apps above this price are excluded from revenue analysis and later views
pub const DEFAULT_PRICE_CEILING: f64 = 250.0;
/// Paid apps above this price are left out of the price box view
pub const DEFAULT_PRICE_PLOT_CAP: f64 = 100.0;
/// Categories with fewer paid, revenue-earning apps are left out of the revenue box view
pub const DEFAULT_MIN_PAID_APPS_PER_CATEGORY: usize = 5;

pub const BILLION_INSTALLS: u64 = 1_000_000_000;

/// Category label fragment that marks an app as a game
pub const GAME_CATEGORY_MARKER: &str = "GAME";

pub const DEFAULT_INPUT_PATH: &str = "googleplaystore.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
