//! Command-line word counter.
//!
//! Tallies word frequencies in a text file with a chosen counter structure
//! and prints a ranked report.
//!
//! ```text
//! bookcount <input> <structure> [output]
//! ```

use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;
use std::process;
use std::time::Instant;

use tallykit::ingest::tally_words;
use tallykit::map::{
    AvlCounterMap, ChainedCounterMap, OpenAddressingCounterMap, RedBlackCounterMap,
};
use tallykit::report::RunReport;
use tallykit::traits::InstrumentedMap;

const USAGE: &str = "\
usage: bookcount <input> <structure> [output]

  input      path to a UTF-8 text file
  structure  avl | rbt | cht | oht
               avl  AVL tree
               rbt  red-black tree
               cht  chained hash table
               oht  open-addressing hash table
  output     report destination (defaults to stdout)
";

fn main() {
    if let Err(err) = run() {
        eprintln!("bookcount: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print!("{USAGE}");
        return Ok(());
    }
    let (input, structure, output) = match args.as_slice() {
        [input, structure] => (input, structure, None),
        [input, structure, output] => (input, structure, Some(output)),
        _ => {
            eprint!("{USAGE}");
            process::exit(2);
        }
    };

    let input = Path::new(input);
    let report = match structure.as_str() {
        "avl" => tally(input, "avl", AvlCounterMap::new())?,
        "rbt" => tally(input, "rbt", RedBlackCounterMap::new())?,
        "cht" => tally(input, "cht", ChainedCounterMap::new())?,
        "oht" => tally(input, "oht", OpenAddressingCounterMap::new())?,
        other => {
            eprintln!("bookcount: unknown structure '{other}' (expected avl, rbt, cht or oht)");
            process::exit(2);
        }
    };

    match output {
        Some(path) => {
            let mut file = File::create(path)?;
            report.write_to(&mut file)?;
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            report.write_to(&mut lock)?;
            lock.flush()?;
        }
    }
    Ok(())
}

fn tally<M>(input: &Path, label: &str, mut map: M) -> Result<RunReport, Box<dyn Error>>
where
    M: InstrumentedMap<String>,
{
    let file = File::open(input)
        .map_err(|e| format!("cannot open {}: {e}", input.display()))?;
    let reader = BufReader::new(file);

    let start = Instant::now();
    let occurrences = tally_words(reader, &mut map)?;
    let elapsed = start.elapsed();

    Ok(RunReport::from_map(label, occurrences, elapsed, &map))
}
