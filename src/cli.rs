//! Command-line interface for the RunRepeat bridge.
//!
//! All options map to the bridge parameters the aggregation host used to
//! supply: shoe category, query limit, and the backend/output choices.

use crate::collector::detail::LabSectionPolicy;
use crate::models::{ShoeType, DEFAULT_QUERY_LIMIT};
use clap::Parser;

/// Command-line arguments for the RunRepeat bridge.
///
/// # Examples
///
/// ```sh
/// # Three newest running shoe reviews, printed as JSON Feed
/// runrepeat_bridge
///
/// # Ten hiking boot reviews as an Atom feed, without a browser
/// runrepeat_bridge -s hiking-boots -n 10 --static-fetch -a feed.xml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Shoe category to query
    #[arg(short, long, value_enum, default_value_t = ShoeType::RunningShoes)]
    pub shoe_type: ShoeType,

    /// Number of articles to collect (clamped to 30)
    #[arg(short = 'n', long, default_value_t = DEFAULT_QUERY_LIMIT)]
    pub limit: usize,

    /// Fetch static HTML instead of driving a browser session
    #[arg(long)]
    pub static_fetch: bool,

    /// Inclusion rule for the "who should (not) buy" sections
    #[arg(long, value_enum, default_value_t = LabSectionPolicy::ListsAlways)]
    pub lab_sections: LabSectionPolicy,

    /// Article cache file persisted across runs (7-day TTL)
    #[arg(long, env = "RUNREPEAT_CACHE_FILE")]
    pub cache_file: Option<String>,

    /// Write the collection as a JSON Feed document to this path
    #[arg(short, long)]
    pub json_output: Option<String>,

    /// Write the collection as an Atom feed to this path
    #[arg(short, long)]
    pub atom_output: Option<String>,
}
