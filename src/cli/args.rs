use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "hotdeals",
    version,
    about = "hot-deal aggregation client",
    long_about = "hotdeals lists aggregated hot deals from a hotdeals backend, page by page and per source, and asks its AI search for summaries.\n\nExamples:\n  hotdeals -u http://localhost:8000/\n  hotdeals -u http://localhost:8000/ -s ppomppu -p 2\n  hotdeals -u http://localhost:8000/ --ask \"best SSD deal this week\"\n  hotdeals -u http://localhost:8000/ -o deals.html\n  hotdeals --interactive\n\nTip: Use --config to persist the backend URL and source labels."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        long = "no-color",
        visible_alias = "nc",
        help_heading = "Output",
        help = "Disable colored terminal output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'u',
        long = "url",
        visible_alias = "backend",
        value_name = "URL",
        help_heading = "Backend",
        help = "Base URL of the hotdeals backend."
    )]
    pub url: Option<String>,

    #[arg(
        long = "timeout",
        visible_alias = "to",
        value_name = "SECONDS",
        help_heading = "Backend",
        help = "Request timeout in seconds (default: none)."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'C',
        long = "config",
        visible_alias = "cfg",
        value_name = "FILE",
        help_heading = "Backend",
        help = "Path to config file (defaults to ~/.hotdeals/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Backend",
        help = "Write a commented default config file (at --config or ~/.hotdeals/config.yml) if none exists."
    )]
    pub init_config: bool,

    #[arg(
        short = 's',
        long = "source",
        value_name = "TAG",
        help_heading = "Listing",
        help = "Source tag to list, or 'all'."
    )]
    pub source: Option<String>,

    #[arg(
        short = 'p',
        long = "page",
        value_name = "N",
        help_heading = "Listing",
        help = "Page to load (starting at 1)."
    )]
    pub page: Option<u32>,

    #[arg(
        long = "per-page",
        visible_alias = "pp",
        value_name = "N",
        help_heading = "Listing",
        help = "Deals per page."
    )]
    pub per_page: Option<u32>,

    #[arg(
        long = "compact",
        help_heading = "Listing",
        help = "Compact cards (long titles are shortened)."
    )]
    pub compact: bool,

    #[arg(
        short = 'a',
        long = "ask",
        visible_alias = "search",
        value_name = "QUERY",
        help_heading = "AI Search",
        help = "Run an AI search for QUERY instead of listing deals."
    )]
    pub ask: Option<String>,

    #[arg(
        short = 'i',
        long = "interactive",
        help_heading = "Session",
        help = "Keep a session open and navigate with commands on stdin."
    )]
    pub interactive: bool,

    #[arg(
        short = 'o',
        long = "output",
        visible_alias = "out",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the rendered view to FILE."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'f',
        long = "format",
        visible_alias = "of",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: text, json, html (inferred from --output when omitted)."
    )]
    pub output_format: Option<String>,
}
