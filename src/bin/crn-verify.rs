//! Command-line front-end: verifies an implementation CRN against a formal CRN.
//!
//! Exit code is `0` if all methods say `true`, `1` if some method says `false`, `2` if some
//! method is indeterminate and none says `false`, `3` on input errors.

use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crn_verify::{
    prelude::*,
    verify::{Method, Verdict},
};

/// Verifies that an implementation CRN implements a formal CRN.
#[derive(Debug, Parser)]
#[command(name = "crn-verify", version, about)]
struct Cli {
    /// File containing the formal CRN.
    #[arg(long, value_name = "FILE")]
    formal_crn: PathBuf,
    /// File containing the implementation CRN.
    #[arg(long, value_name = "FILE")]
    implementation_crn: PathBuf,
    /// File containing a partial interpretation, lines of the form `x -> A + B`.
    #[arg(long, value_name = "FILE")]
    interpretation: Option<PathBuf>,
    /// Formal species, defaults to the species of the formal CRN.
    #[arg(long, value_name = "SPECIES")]
    formal_species: Option<String>,
    /// Verification method, can be repeated.
    #[arg(long, short, default_value = "crn-bisimulation")]
    method: Vec<String>,
    /// Species removed from the implementation CRN.
    #[arg(long, value_name = "SPECIES")]
    fuels: Option<String>,
    /// Also remove the species producible from fuels only.
    #[arg(long)]
    absorb_fuels: bool,
    /// Timeout in seconds, per method.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
    /// Depth of the depth-first permissive check.
    #[arg(long, value_name = "DEPTH")]
    permissive_depth: Option<usize>,
    /// Enumerates the formal basis of the whole implementation at once.
    #[arg(long)]
    no_modules: bool,
    /// Verbosity, `-v` for info, `-vv` for debug, `-vvv` for trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn read(path: &PathBuf) -> Res<String> {
    std::fs::read_to_string(path).chain_err(|| format!("while reading `{}`", path.display()))
}

fn run(cli: &Cli) -> Res<Verdict> {
    let fcrn = parse::crn(&read(&cli.formal_crn)?)
        .chain_err(|| format!("in formal CRN `{}`", cli.formal_crn.display()))?;
    let icrn = parse::crn(&read(&cli.implementation_crn)?)
        .chain_err(|| format!("in implementation CRN `{}`", cli.implementation_crn.display()))?;
    let interpretation = match &cli.interpretation {
        Some(path) => Some(
            parse::interpretation(&read(path)?)
                .chain_err(|| format!("in interpretation `{}`", path.display()))?,
        ),
        None => None,
    };
    let formals = match &cli.formal_species {
        Some(list) => parse::species_list(list).chain_err(|| "in formal species")?,
        None => fcrn.species(),
    };
    let methods = cli
        .method
        .iter()
        .map(|method| method.parse::<Method>())
        .collect::<Res<Vec<_>>>()?;

    let mut conf = Conf::new()
        .absorb_fuels(cli.absorb_fuels)
        .modular(!cli.no_modules);
    if let Some(fuels) = &cli.fuels {
        conf = conf.fuels(parse::species_list(fuels).chain_err(|| "in fuels")?)
    }
    if let Some(secs) = cli.timeout {
        conf = conf.timeout(Duration::from_secs(secs))
    }
    if let Some(depth) = cli.permissive_depth {
        conf = conf.permissive_depth(depth)
    }

    let mut res = Verdict::True;
    for method in methods {
        let (verdict, m) =
            verify::verify(&fcrn, &icrn, &formals, interpretation.as_ref(), method, &conf)?;
        println!("{}: {}", method, verdict);
        if let Some(m) = m {
            println!("{}", m)
        }
        res = match (res, verdict) {
            (Verdict::False, _) | (_, Verdict::False) => Verdict::False,
            (Verdict::Indeterminate, _) | (_, Verdict::Indeterminate) => Verdict::Indeterminate,
            _ => Verdict::True,
        };
    }
    Ok(res)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let res = run(&cli);
    if let Err(e) = &res {
        eprintln!("error: {}", e);
        for e in e.iter().skip(1) {
            eprintln!("  {}", e)
        }
    }
    ExitCode::from(exit_code(&res))
}

/// Exit code of an overall verdict.
fn exit_code(res: &Res<Verdict>) -> u8 {
    match res {
        Ok(Verdict::True) => 0,
        Ok(Verdict::False) => 1,
        Ok(Verdict::Indeterminate) => 2,
        Err(_) => 3,
    }
}

#[cfg(test)]
mod test {
    use crn_verify::{prelude::*, verify::Verdict};

    use super::exit_code;

    #[test]
    fn exit_codes() {
        let cases: Vec<(Res<Verdict>, u8)> = vec![
            (Ok(Verdict::True), 0),
            (Ok(Verdict::False), 1),
            (Ok(Verdict::Indeterminate), 2),
            (Err(malformed("no formal CRN")), 3),
            (parse::crn("A + -> B").map(|_| Verdict::True), 3),
        ];
        for (res, code) in cases {
            println!("{:?} => {}", res, exit_code(&res));
            assert_eq!(exit_code(&res), code);
        }
    }
}
