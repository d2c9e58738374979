use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "pomup",
    about = "pomup - automated dependency version upgrades for Maven POMs",
    version,
    author
)]
pub struct Cli {
    /// Path to the POM file (defaults to ./pom.xml)
    #[arg(short, long, default_value = "pom.xml")]
    pub pom: String,

    /// Additional repository URL to query (repeatable, Maven Central by default)
    #[arg(long = "repo", value_name = "URL", global = true)]
    pub repos: Vec<String>,

    /// Version comparison strategy: maven (default), numeric or mercury
    #[arg(long, value_name = "STRATEGY", default_value = "maven", global = true)]
    pub comparison_method: String,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace -SNAPSHOT dependency versions with their released counterparts
    UseReleases {
        /// When no exact release exists, accept a qualified pre-release
        /// (alpha, beta, ...) of the approached version
        #[arg(long)]
        accept_qualified: bool,

        /// Comma separated qualifier patterns to accept (e.g. "alpha|beta,rc")
        #[arg(long, value_name = "PATTERNS")]
        qualifier_includes: Option<String>,

        /// Comma separated qualifier patterns to discard
        #[arg(long, value_name = "PATTERNS")]
        qualifier_excludes: Option<String>,
    },

    /// Report available updates without touching the POM
    Check {
        /// Only consider candidates inside this range, e.g. "[1.0,2.0)"
        #[arg(long, value_name = "RANGE")]
        range: Option<String>,

        /// Include snapshot candidates
        #[arg(long)]
        snapshots: bool,

        /// Emit the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Set one dependency to an explicit version
    Set {
        /// Coordinate to rewrite (group:artifact)
        #[arg(value_name = "COORDINATE")]
        coordinate: String,

        /// The version to write
        #[arg(long, value_name = "VERSION")]
        version: String,

        /// Require the new version to lie inside this range
        #[arg(long, value_name = "RANGE")]
        range: Option<String>,

        /// Require the new version to exist in the remote candidate set
        #[arg(long)]
        verify_remote: bool,
    },
}
