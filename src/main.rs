//! Command-line front end: encode array types as Horn clauses over the array
//! slice relation and print the resulting benchmark.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
    str::FromStr,
};

use structopt::StructOpt;
use thiserror::Error;
use tracing::{info, info_span};
use z3::{Config, Context};
use z3rro::smtlib::Smtlib;

use crate::{
    array_slice::{rules::SliceNames, SliceCache},
    logging::DispatchBuilder,
    smt::EncodingCtx,
    ty::{SortKind, SortParseError},
};

pub mod array_slice;
mod logging;
pub mod smt;
pub mod ty;

#[derive(StructOpt, Debug, Default)]
#[structopt(
    name = "hornslice",
    about = "Encodes the array slice relation as constrained Horn clauses."
)]
pub struct Options {
    /// Array types to encode. Either `elem[]`, or `name=elem[]` to choose the
    /// name of the array tuple sort. Element sorts are `bool`, `int`,
    /// `uint<N>` and arrays thereof.
    #[structopt(name = "TYPE", required = true)]
    pub types: Vec<ArrayType>,

    /// Emit tracing events as json instead of (ANSI) text.
    #[structopt(long)]
    pub json: bool,

    /// Write the SMT-LIB benchmark to this file instead of standard output.
    #[structopt(long, parse(from_os_str))]
    pub smt_out: Option<PathBuf>,

    /// Do not pretty-print the SMT-LIB benchmark with `raco read`.
    #[structopt(long)]
    pub no_pretty_smtlib: bool,

    /// Print the four rules of every array type instead of the benchmark.
    #[structopt(long)]
    pub print_rules: bool,
}

/// An array tuple sort given on the command-line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayType(SortKind);

impl ArrayType {
    pub fn sort(&self) -> &SortKind {
        &self.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArrayTypeParseError {
    #[error("{0}")]
    Sort(#[from] SortParseError),
    #[error("`{0}` is not an array sort, add `[]` to the element sort")]
    NotAnArray(String),
    #[error("invalid tuple name `{0}`, only letters, digits and `_` are allowed")]
    InvalidName(String),
}

impl FromStr for ArrayType {
    type Err = ArrayTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, sort) = match s.split_once('=') {
            Some((name, sort)) => (Some(name.trim()), sort),
            None => (None, s),
        };
        let element = match sort.parse::<SortKind>()? {
            SortKind::Array(element) => *element,
            _ => return Err(ArrayTypeParseError::NotAnArray(sort.trim().to_owned())),
        };
        let tuple = match name {
            Some(name) => {
                let valid = !name.is_empty()
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
                if !valid {
                    return Err(ArrayTypeParseError::InvalidName(name.to_owned()));
                }
                SortKind::named_array_tuple(name, element)
            }
            None => SortKind::array_tuple(element),
        };
        Ok(ArrayType(tuple))
    }
}

/// Errors that can occur while writing the encoding.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("array types {first} and {second} are both named {name}")]
    ConflictingNames {
        name: String,
        first: String,
        second: String,
    },
    #[error("array types {first} and {second} both declare the symbol {symbol}")]
    CollidingSymbols {
        symbol: String,
        first: String,
        second: String,
    },
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
}

fn main() -> ExitCode {
    let options = Options::from_args();

    // install global collector configured based on RUST_LOG env var.
    logging::init_tracing(DispatchBuilder::default().json(options.json));

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(1)
        }
    }
}

/// Encode all array types of `options` in a fresh session and write the
/// output.
pub fn run(options: &Options) -> Result<(), CliError> {
    check_names(&options.types)?;

    let ctx = Context::new(&Config::default());
    let mut enc = EncodingCtx::new(&ctx);
    let mut cache = SliceCache::new();

    {
        let _entered = info_span!("encode array types").entered();
        for ty in &options.types {
            let (reused, data) = cache.obtain(ty.sort(), &mut enc);
            info!(tuple = data.tuple_name(), reused, "encoded array type");
        }
    }

    match &options.smt_out {
        Some(path) => {
            let file = File::create(path)?;
            write_output(options, &cache, &enc, file)?;
            info!(?path, "SMT-LIB benchmark written to file");
        }
        None => {
            let stdout = io::stdout();
            write_output(options, &cache, &enc, stdout.lock())?;
        }
    }
    Ok(())
}

/// Different array types must not share a tuple name, and the symbols
/// declared for them must be distinct. The latter can fail for distinct names
/// since `array_slice_header_T` is both the header predicate of `T` and the
/// slice predicate of `header_T`.
fn check_names(types: &[ArrayType]) -> Result<(), CliError> {
    let mut seen: HashMap<&str, &SortKind> = HashMap::new();
    let mut symbols: HashMap<String, String> = HashMap::new();
    for ty in types {
        let Some(tuple) = ty.sort().as_tuple() else {
            continue;
        };
        match seen.get(tuple.name.as_str()) {
            Some(first) if *first != ty.sort() => {
                return Err(CliError::ConflictingNames {
                    name: tuple.name.clone(),
                    first: first.to_string(),
                    second: ty.sort().to_string(),
                });
            }
            Some(_) => {}
            None => {
                seen.insert(&tuple.name, ty.sort());
                for symbol in SliceNames::new(&tuple.name).all() {
                    if let Some(first) = symbols.insert(symbol.to_owned(), tuple.name.clone()) {
                        return Err(CliError::CollidingSymbols {
                            symbol: symbol.to_owned(),
                            first,
                            second: tuple.name.clone(),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

fn write_output<'ctx>(
    options: &Options,
    cache: &SliceCache<'ctx>,
    enc: &EncodingCtx<'ctx>,
    mut out: impl Write,
) -> io::Result<()> {
    if options.print_rules {
        for data in cache.iter() {
            writeln!(out, "; {}", data.tuple_name())?;
            for rule in data.rules.iter() {
                writeln!(out, "{}", rule)?;
            }
        }
        return out.flush();
    }

    let mut smtlib = cache.to_horn_system(enc).to_smtlib();
    if !options.no_pretty_smtlib {
        smtlib.try_pretty();
    }
    {
        let mut comment_writer = Smtlib::comment_writer(&mut out);
        writeln!(
            comment_writer,
            "{} {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )?;
        let names: Vec<&str> = cache.iter().map(|data| data.tuple_name()).collect();
        writeln!(comment_writer, "Array types: {}", names.join(", "))?;
    }
    out.write_all(smtlib.as_str().as_bytes())?;
    out.flush()
}
