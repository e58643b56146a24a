// file: src/cli/args.rs
// version: 2.0.0
// guid: f6g7h8i9-j0k1-2345-6789-012345fghijk

//! Command line argument definitions

use crate::config::ResponseFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tenancy")]
#[command(about = "Provision tenants of a multi-tenant web application")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (YAML or TOML)
    #[arg(short, long, global = true, env = "TENANCY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the tenant folders
    #[arg(long, global = true)]
    pub tenants_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List existing tenants
    #[command(visible_alias = "show")]
    List,

    /// Create a tenant from the template
    Add {
        name: String,

        /// Database password; generated when omitted
        password: Option<String>,
    },

    /// Remove one or more tenants with their databases
    Remove {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Set a tenant's database password
    Update { name: String, password: String },

    /// Replace a tenant's database password with a generated one
    Reset { name: String },

    /// Call a panel API function and print the reply
    Query {
        function: String,

        /// Request parameter, repeatable
        #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Output format; defaults to panel.output
        #[arg(short, long)]
        format: Option<ResponseFormat>,
    },
}

fn parse_param(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_show_alias() {
        let cli = Cli::try_parse_from(["tenancy", "show"]).unwrap();
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_add_password_is_optional() {
        let cli = Cli::try_parse_from(["tenancy", "add", "acme"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Add { ref name, password: None } if name == "acme"
        ));
    }

    #[test]
    fn test_remove_requires_a_name() {
        assert!(Cli::try_parse_from(["tenancy", "remove"]).is_err());

        let cli = Cli::try_parse_from(["tenancy", "remove", "a", "b"]).unwrap();
        assert!(matches!(cli.command, Commands::Remove { ref names } if names.len() == 2));
    }

    #[test]
    fn test_query_params_and_format() {
        let cli = Cli::try_parse_from([
            "tenancy",
            "query",
            "listaccts",
            "--param",
            "search=acme",
            "-p",
            "searchtype=user",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Query {
                function,
                params,
                format,
            } => {
                assert_eq!(function, "listaccts");
                assert_eq!(
                    params,
                    vec![
                        ("search".to_string(), "acme".to_string()),
                        ("searchtype".to_string(), "user".to_string()),
                    ]
                );
                assert_eq!(format, Some(ResponseFormat::Json));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_param_rejects_missing_equals() {
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
        assert_eq!(
            parse_param("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
    }
}
