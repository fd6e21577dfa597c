use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "blueprint-pools",
    version,
    about = "browse weapon blueprint pools",
    long_about = "Blueprint Pools loads a blueprint catalogue, filters a weapon's blueprints by pool, status and name, preloads their images and prints the matches.\n\nExamples:\n  blueprint-pools --list weapons\n  blueprint-pools -w Rifle --pool 2\n  blueprint-pools -w Rifle -q dragon -o rifle.html --theme neon\n  blueprint-pools -c https://example.com/blueprints.json -i https://example.com/images -w Rifle\n\nTip: Use --config to persist catalogue and image locations."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'c',
        long = "cat",
        visible_aliases = ["catalogue", "catalog"],
        value_name = "PATH|URL|-",
        help_heading = "Input",
        help = "Catalogue JSON file, URL, or - for stdin (defaults to ./blueprints.json)."
    )]
    pub catalogue: Option<String>,

    #[arg(
        short = 'i',
        long = "img",
        visible_alias = "images",
        value_name = "DIR|URL",
        help_heading = "Input",
        help = "Image root directory or base URL (defaults to ./images)."
    )]
    pub images: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.blueprint-pools/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a default config file (at --config or the default path) and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'l',
        long = "ls",
        visible_alias = "list",
        value_name = "KIND",
        help_heading = "Browse",
        help = "Print one of the catalogue indexes and exit: weapons, pools or statuses."
    )]
    pub list: Option<String>,

    #[arg(
        short = 'w',
        long = "wp",
        visible_alias = "weapon",
        value_name = "NAME",
        help_heading = "Filter",
        help = "Weapon whose blueprints to show."
    )]
    pub weapon: Option<String>,

    #[arg(
        short = 'p',
        long = "pl",
        visible_alias = "pool",
        value_name = "ID",
        help_heading = "Filter",
        help = "Only blueprints in this pool."
    )]
    pub pool: Option<String>,

    #[arg(
        short = 's',
        long = "st",
        visible_alias = "status",
        value_name = "STATUS",
        help_heading = "Filter",
        help = "Only blueprints with this status."
    )]
    pub status: Option<String>,

    #[arg(
        short = 'q',
        long = "sr",
        visible_alias = "search",
        value_name = "TEXT",
        help_heading = "Filter",
        help = "Only blueprints whose name contains TEXT (case-insensitive)."
    )]
    pub search: Option<String>,

    #[arg(
        long = "sh",
        visible_alias = "show",
        value_name = "BLUEPRINT",
        help_heading = "Browse",
        help = "Resolve and print the image location of one blueprint of --weapon."
    )]
    pub show: Option<String>,

    #[arg(
        long = "pf",
        visible_alias = "primary-format",
        value_name = "EXT",
        help_heading = "Images",
        help = "Image format tried first (default png)."
    )]
    pub primary_format: Option<String>,

    #[arg(
        long = "ff",
        visible_alias = "fallback-format",
        value_name = "EXT",
        help_heading = "Images",
        help = "Image format tried when the primary one fails (default jpg)."
    )]
    pub fallback_format: Option<String>,

    #[arg(
        short = 't',
        long = "th",
        visible_alias = "theme",
        value_name = "NAME",
        help_heading = "Output",
        help = "Theme: dark, light, classic or neon."
    )]
    pub theme: Option<String>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write results to FILE instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'f',
        long = "fmt",
        visible_alias = "format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: text, json or html (inferred from --output when omitted)."
    )]
    pub format: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'x',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[arg(
        long = "wrk",
        visible_alias = "workers",
        value_name = "N",
        help_heading = "Performance",
        help = "Number of runtime worker threads."
    )]
    pub workers: Option<usize>,
}
