use std::env;
use std::net::SocketAddr;
use std::process;

use getopts::Options;
use vacation_ics::Branding;

pub const ADDRESS_ENV: &str = "VACATION_ICS_ADDR";

const DEFAULT_LOG: &str = "info";

pub struct Args {
    pub address: SocketAddr,
    pub branding: Branding,
    pub log: String,
}

pub enum Parsed {
    Help(String),
    Run(Args),
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "a",
        "address",
        concat!(
            "Socket address (IP and port) to listen on, falls back to $VACATION_ICS_ADDR ",
            "[Default: 127.0.0.1:8080]"
        ),
        "SOCKET_ADDRESS",
    );
    opts.optopt(
        "p",
        "product-name",
        "Name used as calendar category and organizer [Default: PGV Planning]",
        "NAME",
    );
    opts.optopt(
        "",
        "product-id",
        "PRODID of generated calendars [Default: PGV Planning V9]",
        "PRODID",
    );
    opts.optopt(
        "",
        "organizer-email",
        "Organizer address of generated events [Default: noreply@pgvplanning.fr]",
        "EMAIL",
    );
    opts.optopt(
        "u",
        "uid-domain",
        "Domain suffix of event UIDs [Default: pgvplanning.fr]",
        "DOMAIN",
    );
    opts.optopt(
        "l",
        "log",
        "Log filter used when RUST_LOG is unset [Default: info]",
        "FILTER",
    );
    opts
}

pub fn parse_from(args: &[String], env_address: Option<String>) -> Result<Parsed, String> {
    let opts = opts();

    let matches = opts
        .parse(args.iter().skip(1))
        .map_err(|fail| fail.to_string())?;

    if matches.opt_present("help") {
        return Ok(Parsed::Help(
            opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))),
        ));
    }

    let address = match matches.opt_str("address").or(env_address) {
        Some(raw) => raw
            .parse()
            .map_err(|err| format!("Provided value for option 'address' is invalid: {err}"))?,
        None => SocketAddr::from(([127, 0, 0, 1], 8080)),
    };

    let defaults = Branding::default();
    let branding = Branding {
        product_name: matches
            .opt_str("product-name")
            .unwrap_or(defaults.product_name),
        product_id: matches.opt_str("product-id").unwrap_or(defaults.product_id),
        organizer_email: matches
            .opt_str("organizer-email")
            .unwrap_or(defaults.organizer_email),
        uid_domain: matches.opt_str("uid-domain").unwrap_or(defaults.uid_domain),
    };

    let log = matches
        .opt_str("log")
        .unwrap_or_else(|| DEFAULT_LOG.to_string());

    Ok(Parsed::Run(Args {
        address,
        branding,
        log,
    }))
}

pub fn parse(args: Vec<String>) -> Args {
    match parse_from(&args, env::var(ADDRESS_ENV).ok()) {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Help(usage)) => {
            println!("{usage}");
            process::exit(0);
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(rest: &[&str]) -> Vec<String> {
        std::iter::once("vacation-ics-server")
            .chain(rest.iter().copied())
            .map(String::from)
            .collect()
    }

    fn run(rest: &[&str], env_address: Option<&str>) -> Args {
        match parse_from(&argv(rest), env_address.map(String::from)) {
            Ok(Parsed::Run(args)) => args,
            Ok(Parsed::Help(_)) => panic!("unexpected help"),
            Err(err) => panic!("{err}"),
        }
    }

    #[test]
    fn defaults() {
        let args = run(&[], None);

        assert_eq!(args.address, SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert_eq!(args.branding, Branding::default());
        assert_eq!(args.log, "info");
    }

    #[test]
    fn flag_beats_environment() {
        assert_eq!(
            run(&[], Some("0.0.0.0:9000")).address,
            SocketAddr::from(([0, 0, 0, 0], 9000))
        );
        assert_eq!(
            run(&["--address", "127.0.0.1:7000"], Some("0.0.0.0:9000")).address,
            SocketAddr::from(([127, 0, 0, 1], 7000))
        );
    }

    #[test]
    fn branding_options() {
        let args = run(
            &["-p", "Team Leave", "--uid-domain", "example.org", "-l", "debug"],
            None,
        );

        assert_eq!(args.branding.product_name, "Team Leave");
        assert_eq!(args.branding.uid_domain, "example.org");
        assert_eq!(args.branding.product_id, Branding::default().product_id);
        assert_eq!(args.log, "debug");
    }

    #[test]
    fn bad_address_is_an_error() {
        assert!(parse_from(&argv(&["-a", "nowhere"]), None).is_err());
        assert!(parse_from(&argv(&[]), Some("nowhere".into())).is_err());
    }

    #[test]
    fn help() {
        assert!(matches!(
            parse_from(&argv(&["--help"]), None),
            Ok(Parsed::Help(_))
        ));
    }
}
