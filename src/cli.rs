use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lbryio")]
#[command(about = "Authenticate this installation against the LBRY internal API")]
#[command(version)]
pub struct Cli {
    /// Print the configuration JSON schema and exit
    #[arg(long)]
    pub schema: bool,

    /// YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Auth token to start from instead of registering a new installation
    #[arg(long)]
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let cli =
            Cli::try_parse_from(["lbryio", "--config", "app.yaml", "--token", "abc"]).unwrap();
        assert!(!cli.schema);
        assert_eq!(cli.config, Some(PathBuf::from("app.yaml")));
        assert_eq!(cli.token.as_deref(), Some("abc"));
    }

    #[test]
    fn rejects_unknown_flags_and_missing_values() {
        assert!(Cli::try_parse_from(["lbryio", "--verbose"]).is_err());
        assert!(Cli::try_parse_from(["lbryio", "--token"]).is_err());
    }
}
