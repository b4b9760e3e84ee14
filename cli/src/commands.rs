use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("email-otp")
        .about("Issue and verify one-time passcodes sent by email")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("TOML configuration file, defaults to config.<environment>.toml")
                .env("EO_CONFIG_FILE")
                .global(true),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .help("OTP store to use, overriding the configuration")
                .value_parser(["redis", "sqlite"])
                .global(true),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("request")
                .about("Generate a code, store it and email it")
                .arg(Arg::new("email").help("Recipient address").required(true))
                .arg(
                    Arg::new("log-only")
                        .long("log-only")
                        .help("Log the code instead of sending mail")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("verify")
                .about("Check a code; exits non-zero unless it is verified")
                .arg(Arg::new("email").help("Address the code was sent to").required(true))
                .arg(Arg::new("code").help("The code to check").required(true)),
        )
        .subcommand(
            Command::new("purge")
                .about("Delete expired codes")
                .arg(
                    Arg::new("watch")
                        .long("watch")
                        .help("Keep purging until interrupted")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .help("Seconds between purges with --watch, defaults to otp.purge_interval_seconds")
                        .requires("watch")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                ),
        )
        .subcommand(Command::new("init-db").about("Create the SQLite table if it does not exist"))
}
