use clap::Parser;
use std::path::PathBuf;
use strum_macros::Display;
use strum_macros::EnumString;

/// Looks up stock fundamentals and Twitter account statistics.
#[derive(Parser, Debug)]
pub struct Cli {
    /// Stock tickers to look up.
    #[arg(short, long, num_args = 1..)]
    pub stock: Vec<String>,

    /// Connects to Twitter and retrieves user info.
    #[arg(short, long)]
    pub twitter: bool,

    /// Twitter user IDs or usernames to look up.
    #[arg(
        short = 'i',
        long = "twitter-id",
        visible_alias = "tid",
        alias = "twitter_id",
        num_args = 1..
    )]
    pub twitter_id: Vec<String>,

    /// Saves the results in a database. Not supported yet.
    #[arg(short, long)]
    pub archive: bool,

    /// INI file holding the Twitter credentials.
    #[arg(short, long, default_value = "palmtree.ini")]
    pub config: PathBuf,

    #[arg(long, default_value_t = Format::Pretty)]
    pub format: Format,
}

#[derive(EnumString, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    Pretty,
    Compact,
}
