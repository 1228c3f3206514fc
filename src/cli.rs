use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tabled::{Table, Tabled};

use logjail::ipaddr;
use logjail::pattern::{compile_ignore, FailRegex};

/// Offline pattern tester: run `<HOST>` failure patterns over a log
/// file and report what would match. Owns no ban state and makes no
/// ban decisions.
#[derive(Parser)]
#[command(name = "logjail")]
#[command(author, version, about = "offline <HOST> pattern tester for log files")]
pub struct Cli {
    /// Failure pattern containing a <HOST> placeholder (repeatable)
    #[arg(short = 'e', long = "pattern", required = true)]
    pub patterns: Vec<String>,

    /// Skip lines matching this pattern (repeatable)
    #[arg(short = 'i', long = "ignore")]
    pub ignores: Vec<String>,

    /// Log file to read; stdin when omitted
    pub file: Option<PathBuf>,

    /// Print every line's result, not just matches
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

#[derive(Tabled)]
struct AddressRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Matches")]
    matches: usize,
    #[tabled(rename = "Valid IP")]
    valid_ip: bool,
}

pub fn run(cli: Cli) -> Result<()> {
    let patterns = cli
        .patterns
        .iter()
        .map(|p| FailRegex::compile(p))
        .collect::<Result<Vec<_>, _>>()
        .context("failed to compile failure pattern")?;
    let ignores = cli
        .ignores
        .iter()
        .map(|p| compile_ignore(p))
        .collect::<Result<Vec<_>, _>>()
        .context("failed to compile ignore pattern")?;

    let reader: Box<dyn BufRead> = match &cli.file {
        Some(path) => Box::new(BufReader::new(File::open(path).with_context(|| {
            format!("failed to open log file {}", path.display())
        })?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut total = 0usize;
    let mut matched = 0usize;
    let mut ignored = 0usize;
    let mut per_address: BTreeMap<String, usize> = BTreeMap::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("failed to read input")?;
        let lineno = index + 1;
        total += 1;

        if ignores.iter().any(|r| r.is_match(&line)) {
            ignored += 1;
            if cli.verbose {
                println!("{lineno:>6}  {}", "ignored".yellow());
            }
            continue;
        }

        match patterns
            .iter()
            .enumerate()
            .find_map(|(i, p)| p.match_line(&line).map(|m| (i, m)))
        {
            Some((pattern_index, m)) => {
                matched += 1;
                *per_address.entry(m.address.clone()).or_insert(0) += 1;
                println!(
                    "{lineno:>6}  {}  {}  (pattern {})",
                    "MATCH".green().bold(),
                    m.address,
                    pattern_index + 1
                );
            }
            None => {
                if cli.verbose {
                    println!("{lineno:>6}  {}", "no match".dimmed());
                }
            }
        }
    }

    println!();
    println!("{total} lines, {matched} matched, {ignored} ignored");

    if !per_address.is_empty() {
        let rows: Vec<AddressRow> = per_address
            .into_iter()
            .map(|(address, matches)| AddressRow {
                valid_ip: ipaddr::is_valid_ip(&address),
                address,
                matches,
            })
            .collect();
        println!("{}", Table::new(rows));
    }

    Ok(())
}
