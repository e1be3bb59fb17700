//! A small operator tool that mints auth tokens accepted by the election server.
//! It reads the same `Rocket.toml` and `ROCKET_*` environment as the server, so
//! the tokens it prints are signed with the server's secret.

use chrono::Duration;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use rocket::figment::Figment;

use elections_backend::model::{auth::AuthToken, common::identity::Identity};
use elections_backend::Config;

const PROGRAM_NAME: &str = "token-cli";

const ABOUT_TEXT: &str = "Mint a signed auth token for an identity.

The signing secret and default lifetime are read from Rocket.toml and
ROCKET_* environment variables, exactly as the server reads them.";

const IDENTITY: &str = "IDENTITY";
const TTL: &str = "ttl";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .arg(
            Arg::new(IDENTITY)
                .help("The identity the token vouches for, e.g. the election authority")
                .action(ArgAction::Set)
                .required(true),
        )
        .arg(
            Arg::new(TTL)
                .long(TTL)
                .help("Token lifetime in seconds; defaults to `auth_ttl`")
                .action(ArgAction::Set)
                .value_parser(value_parser!(u32)),
        )
}

/// Mint the token described by `args`, or explain why not.
fn mint(args: &ArgMatches, figment: &Figment) -> Result<String, String> {
    let identity = args
        .get_one::<String>(IDENTITY)
        .ok_or("No identity given")?
        .parse::<Identity>()
        .map_err(|e| e.to_string())?;
    let config = figment
        .extract::<Config>()
        .map_err(|e| format!("Invalid config: {e}"))?;
    let ttl = match args.get_one::<u32>(TTL) {
        Some(seconds) => Duration::seconds((*seconds).into()),
        None => config.auth_ttl(),
    };

    AuthToken::new(identity)
        .encode(config.jwt_secret(), ttl)
        .map_err(|e| format!("Failed to sign token: {e}"))
}

fn main() {
    let args = cli().get_matches();
    match mint(&args, &rocket::Config::figment()) {
        Ok(jwt) => println!("{jwt}"),
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}
