//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use ag_core::user::{Role, Tier};

#[derive(Debug, Parser)]
#[command(name = "agrilink")]
#[command(about = "AgriLink marketplace client", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to the platform config dir)
    #[arg(short, long, env = "AGRILINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// REST base URL including `/api`
    #[arg(long)]
    pub api_url: Option<String>,

    /// Socket.IO base URL; empty disables live updates
    #[arg(long)]
    pub socket_url: Option<String>,

    /// Bearer token of the signed-in user
    #[arg(long, env = "AGRILINK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the role gate for a path and print the resulting frames
    Gate {
        #[arg(default_value = "/")]
        path: String,
    },

    /// Complete the onboarding wizard
    Onboard(OnboardArgs),

    /// Choose a subscription plan
    Plan {
        #[arg(value_parser = parse_tier)]
        tier: Tier,
    },

    /// List a collection with filters
    Browse {
        resource: Collection,

        /// Filter as `key=value`; repeat for more
        #[arg(short, long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,

        /// Keep the list open and apply live updates
        #[arg(short, long)]
        watch: bool,
    },

    /// Post a produce listing
    CreateProduce(CreateProduceArgs),

    /// Post a buyer demand
    CreateDemand(CreateDemandArgs),

    /// Expand a card: counts a view and shows its match chat
    Card(CardArgs),

    /// Match actions
    Matches {
        #[command(subcommand)]
        command: MatchCommands,
    },

    /// Open a match thread, optionally sending a message
    Messages {
        match_id: String,

        #[arg(short, long)]
        send: Option<String>,
    },

    /// Driver transport offers and suggestions
    Transport {
        #[command(subcommand)]
        command: TransportCommands,
    },

    /// Reviews
    Review {
        #[command(subcommand)]
        command: ReviewCommands,
    },

    /// Send an SMS through the backend
    Sms {
        #[arg(long)]
        to: String,

        #[arg(short, long)]
        message: String,
    },

    /// Verification review (administrators)
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Print realtime events until interrupted
    Watch,

    /// Show the effective configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Collection {
    Produce,
    Demand,
    Transport,
    Matches,
}

#[derive(Debug, Args)]
pub struct OnboardArgs {
    #[arg(long, value_parser = parse_role)]
    pub role: Role,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub county: String,

    #[arg(long)]
    pub subcounty: Option<String>,

    #[arg(long)]
    pub town: Option<String>,

    #[arg(long)]
    pub national_id: Option<String>,

    /// Photo of the national ID
    #[arg(long)]
    pub id_image: Option<PathBuf>,

    /// Wait for the verification decision after submitting
    #[arg(long)]
    pub wait: bool,
}

#[derive(Debug, Args)]
pub struct CreateProduceArgs {
    #[arg(long)]
    pub crop: String,

    #[arg(long)]
    pub variety: Option<String>,

    #[arg(long)]
    pub quantity: f64,

    #[arg(long, default_value = "kg")]
    pub unit: String,

    #[arg(long)]
    pub price: f64,

    #[arg(long)]
    pub county: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Harvest date, `YYYY-MM-DD`
    #[arg(long)]
    pub harvest_date: Option<chrono::NaiveDate>,

    /// Listing photo; repeat for more
    #[arg(long = "image", value_name = "PATH")]
    pub images: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CreateDemandArgs {
    #[arg(long)]
    pub crop: String,

    #[arg(long)]
    pub quantity: f64,

    #[arg(long, default_value = "kg")]
    pub unit: String,

    #[arg(long)]
    pub max_price: Option<f64>,

    #[arg(long)]
    pub county: String,

    /// Needed-by date, `YYYY-MM-DD`
    #[arg(long)]
    pub needed_by: Option<chrono::NaiveDate>,

    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct CardTarget {
    /// Demand card (opening it counts a view)
    #[arg(long)]
    pub demand: Option<String>,

    /// Transport card (opening it counts a view)
    #[arg(long)]
    pub transport: Option<String>,

    /// Match card with inline chat
    #[arg(long = "match")]
    pub match_id: Option<String>,
}

#[derive(Debug, Args)]
pub struct CardArgs {
    #[command(flatten)]
    pub target: CardTarget,

    /// Message to post in the match chat
    #[arg(short, long, requires = "match_id")]
    pub send: Option<String>,

    /// Stay open and print pushed messages until interrupted
    #[arg(short, long)]
    pub follow: bool,
}

#[derive(Debug, Subcommand)]
pub enum MatchCommands {
    /// Propose a match between a listing and a demand
    Propose {
        #[arg(long)]
        listing: String,

        #[arg(long)]
        demand: String,

        #[arg(long)]
        quantity: Option<f64>,

        #[arg(long)]
        price: Option<f64>,
    },
    Accept {
        id: String,
    },
    Cancel {
        id: String,
    },
    AssignDriver {
        id: String,

        #[arg(long)]
        driver: String,

        #[arg(long)]
        transport: Option<String>,
    },
    Complete {
        id: String,
    },
    /// Scored candidates for a demand or a listing
    Suggest {
        #[arg(long, conflicts_with = "listing", required_unless_present = "listing")]
        demand: Option<String>,

        #[arg(long)]
        listing: Option<String>,

        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Debug, Subcommand)]
pub enum TransportCommands {
    /// Offers posted by a driver
    Offers { driver: String },
    /// Drivers ranked for a match
    Suggest { match_id: String },
}

#[derive(Debug, Subcommand)]
pub enum ReviewCommands {
    Submit {
        #[arg(long = "match")]
        match_id: String,

        #[arg(long)]
        reviewee: String,

        #[arg(long)]
        rating: u8,

        #[arg(long)]
        comment: Option<String>,
    },
    /// Public reviews page of a user
    User { id: String },
    /// Reviews left on a match
    Match { id: String },
}

#[derive(Debug, Subcommand)]
pub enum AdminCommands {
    /// Users waiting for verification
    Pending,
    /// Approve or reject a user
    Verify {
        user: String,

        #[arg(long, conflicts_with = "reject", required_unless_present = "reject")]
        approve: bool,

        #[arg(long, value_name = "REASON")]
        reject: Option<String>,
    },
}

fn parse_role(value: &str) -> Result<Role, String> {
    value.parse().map_err(|err: ag_core::user::UnknownRole| err.to_string())
}

fn parse_tier(value: &str) -> Result<Tier, String> {
    value.parse::<Tier>().map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn browse_collects_repeated_filters() {
        let cli = Cli::try_parse_from([
            "agrilink", "browse", "demand", "-f", "crop=maize", "--filter", "county=Nakuru", "--watch",
        ])
        .unwrap();

        match cli.command {
            Commands::Browse {
                resource,
                filters,
                watch,
            } => {
                assert_eq!(resource, Collection::Demand);
                assert_eq!(filters, ["crop=maize", "county=Nakuru"]);
                assert!(watch);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn card_needs_exactly_one_target() {
        assert!(Cli::try_parse_from(["agrilink", "card"]).is_err());
        assert!(Cli::try_parse_from(["agrilink", "card", "--demand", "d1", "--transport", "t1"]).is_err());
        assert!(Cli::try_parse_from(["agrilink", "card", "--transport", "t1"]).is_ok());
    }

    #[test]
    fn verify_takes_approve_or_reason() {
        assert!(Cli::try_parse_from(["agrilink", "admin", "verify", "u1"]).is_err());
        assert!(Cli::try_parse_from(["agrilink", "admin", "verify", "u1", "--approve"]).is_ok());
        assert!(
            Cli::try_parse_from(["agrilink", "admin", "verify", "u1", "--reject", "blurry ID"]).is_ok()
        );
    }

    #[test]
    fn plan_parses_tier() {
        let cli = Cli::try_parse_from(["agrilink", "plan", "pro"]).unwrap();

        assert!(matches!(cli.command, Commands::Plan { tier: Tier::Pro }));
    }
}
