use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use immo_price::SpreadPolicy;

/// Real-estate price estimates from a trained artifact.
#[derive(Parser, Debug)]
#[command(name = "immo-price", version, about)]
pub struct Cli {
    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve predictions over HTTP
    Serve(ServeArgs),
    /// Predict every row of a CSV file
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Artifact bundle (`.json` or bincode)
    #[arg(long, env = "ARTIFACT_PATH")]
    pub artifact: PathBuf,

    /// Zip code table CSV used to fill in location fields
    #[arg(long, env = "ZIP_CODES_PATH")]
    pub zip_codes: Option<PathBuf>,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// `percentage:<fraction>` or `absolute:<amount>`
    #[arg(long, env = "PRICE_SPREAD", default_value = "percentage:0.05")]
    pub spread: SpreadPolicy,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Artifact bundle (`.json` or bincode)
    #[arg(long, env = "ARTIFACT_PATH")]
    pub artifact: PathBuf,

    /// Zip code table CSV used to fill in location fields
    #[arg(long, env = "ZIP_CODES_PATH")]
    pub zip_codes: Option<PathBuf>,

    /// Input CSV with a header row
    #[arg(long)]
    pub input: PathBuf,

    /// Output CSV; stdout when omitted
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// `percentage:<fraction>` or `absolute:<amount>`
    #[arg(long, env = "PRICE_SPREAD", default_value = "percentage:0.05")]
    pub spread: SpreadPolicy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["immo-price", "serve", "--artifact", "model.bin"]).unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, 8080);
        assert_eq!(args.host.to_string(), "0.0.0.0");
        assert_eq!(args.spread, SpreadPolicy::Percentage(0.05));
        assert!(args.zip_codes.is_none());
    }

    #[test]
    fn test_predict_args() {
        let cli = Cli::try_parse_from([
            "immo-price",
            "--log-format",
            "json",
            "predict",
            "--artifact",
            "model.json",
            "--input",
            "houses.csv",
            "--spread",
            "absolute:10000",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        let Commands::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.spread, SpreadPolicy::AbsoluteOffset(10_000.0));
        assert!(args.output.is_none());
    }

    #[test]
    fn test_invalid_spread_rejected() {
        let result = Cli::try_parse_from([
            "immo-price",
            "serve",
            "--artifact",
            "model.bin",
            "--spread",
            "percentage:7",
        ]);
        assert!(result.is_err());
    }
}
