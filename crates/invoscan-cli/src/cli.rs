use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "invoscan", version, about = "Scan invoice documents for blacklisted IBANs")]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "INVOSCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch documents, extract and validate IBANs, check the blacklist
    Scan {
        /// Document URLs, processed in the given order
        #[arg(required = true)]
        urls: Vec<String>,
        /// Override `scanning.max_concurrent_pipelines` (at least 1)
        #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
        max_concurrent: Option<usize>,
    },
    /// Manage the IBAN blacklist
    Blacklist {
        #[command(subcommand)]
        cmd: BlacklistCmd,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

#[derive(Debug, Subcommand)]
pub enum BlacklistCmd {
    /// Validate an IBAN and add it to the blacklist
    Add {
        /// IBAN, grouped or contiguous
        iban: String,
        /// Why the IBAN is blocked
        #[arg(long)]
        reason: String,
    },
    /// Print all blacklist entries as JSON
    List,
    /// Remove an IBAN from the blacklist
    Remove {
        /// IBAN to unblock
        iban: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration as TOML
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_with_urls() {
        let cli = Cli::try_parse_from([
            "invoscan",
            "scan",
            "https://example.com/a.pdf",
            "https://example.com/b.pdf",
            "--max-concurrent",
            "4",
        ])
        .expect("parse");

        match cli.cmd {
            Command::Scan {
                urls,
                max_concurrent,
            } => {
                assert_eq!(urls.len(), 2);
                assert_eq!(max_concurrent, Some(4));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_scan_requires_a_url() {
        assert!(Cli::try_parse_from(["invoscan", "scan"]).is_err());
    }

    #[test]
    fn test_max_concurrent_must_be_positive() {
        let parse = |value: &str| {
            Cli::try_parse_from([
                "invoscan",
                "scan",
                "https://example.com/a.pdf",
                "--max-concurrent",
                value,
            ])
        };

        assert!(parse("0").is_err());
        assert!(parse("-1").is_err());
        assert!(parse("1").is_ok());
    }

    #[test]
    fn test_blacklist_subcommands_have_help() {
        use clap::CommandFactory;

        let command = Cli::command();
        let blacklist = command
            .find_subcommand("blacklist")
            .expect("blacklist subcommand");
        for name in ["add", "list", "remove"] {
            let sub = blacklist.find_subcommand(name).expect("subcommand");
            assert!(sub.get_about().is_some(), "{name} has no help text");
        }
    }

    #[test]
    fn test_parse_blacklist_add() {
        let cli = Cli::try_parse_from([
            "invoscan",
            "--json-logs",
            "blacklist",
            "add",
            "FR7630006000011234567890189",
            "--reason",
            "fraud report",
        ])
        .expect("parse");

        assert!(cli.json_logs);
        match cli.cmd {
            Command::Blacklist {
                cmd: BlacklistCmd::Add { iban, reason },
            } => {
                assert_eq!(iban, "FR7630006000011234567890189");
                assert_eq!(reason, "fraud report");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_blacklist_add_requires_reason() {
        assert!(Cli::try_parse_from(["invoscan", "blacklist", "add", "DE44500105175407324931"]).is_err());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["invoscan", "config", "show", "--config", "/tmp/x.toml"])
            .expect("parse");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.toml")));
        assert!(matches!(cli.cmd, Command::Config { cmd: ConfigCmd::Show }));
    }
}
