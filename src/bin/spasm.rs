//! Thin CLI driver: read an SMS matrix from a file or stdin, run pivot
//! discovery and/or PLUQ factorization, and write either an SMS dump of
//! U/L, a PBM/PGM/PPM sparsity plot, or rank statistics. A `clap`-derive
//! `Args`, a per-stage `Instant`-based timing breakdown on stderr, and
//! distinct exit codes for I/O vs. contract failures.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;

use spasm::config::SolverConfig;
use spasm::field::Field;
use spasm::io::image::{write_pbm, write_pgm, write_ppm};
use spasm::io::sms::{load_sms, save_sms};
use spasm::lu::factor;
use spasm::pivots::find_pivots;
use spasm::workspace::Workspace;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DumpFormat {
    Pbm,
    Pgm,
    Ppm,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Emit {
    /// Print rank/dimension/nnz statistics (default).
    Stats,
    /// Write U as an SMS stream.
    U,
    /// Write L as an SMS stream (requires `--keep-l`).
    L,
}

#[derive(Parser, Debug)]
#[command(
    about = "Sparse GF(p) pivot discovery and PLUQ/LU factorization over an SMS matrix.",
    version
)]
struct Args {
    /// SMS input file (default: stdin).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Field modulus p.
    #[arg(short, long)]
    prime: u64,

    /// Retain L alongside U (disables the early-abort shortcut).
    #[arg(long)]
    keep_l: bool,

    /// What to write to the output.
    #[arg(long, value_enum, default_value_t = EmitArg::Stats)]
    emit: EmitArg,

    /// Emit a sparsity-plot image instead of factoring.
    #[arg(long, value_enum)]
    dump: Option<DumpFormat>,

    /// PGM downsample width (only with `--dump pgm`).
    #[arg(long, default_value_t = 200)]
    dump_width: usize,

    /// PGM downsample height (only with `--dump pgm`).
    #[arg(long, default_value_t = 200)]
    dump_height: usize,

    /// Run pivot discovery only; skip the full factorization.
    #[arg(long)]
    pivots_only: bool,

    /// RNG seed for the probabilistic early-abort probe.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

// clap's ValueEnum derive wants a type distinct from the one used in help
// text above; alias so the two line up without repeating the variant list.
type EmitArg = Emit;

fn fmt_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs >= 1.0 {
        format!("{secs:.3}s")
    } else if secs >= 1e-3 {
        format!("{:.3}ms", secs * 1e3)
    } else {
        format!("{:.3}us", secs * 1e6)
    }
}

fn print_timing_breakdown(stages: &[(&str, Duration)], total: Duration) {
    eprintln!();
    eprintln!("timing breakdown (total {}):", fmt_duration(total));
    for (name, dur) in stages {
        let pct = if total.as_secs_f64() > 0.0 {
            dur.as_secs_f64() / total.as_secs_f64() * 100.0
        } else {
            0.0
        };
        eprintln!("  {name:<18} {:>10} ({pct:>6.2}%)", fmt_duration(*dur));
    }
}

fn open_input(path: &Option<PathBuf>) -> io::Result<Box<dyn Read>> {
    match path {
        Some(p) => Ok(Box::new(BufReader::new(File::open(p)?))),
        None => Ok(Box::new(io::stdin())),
    }
}

fn open_output(path: &Option<PathBuf>) -> io::Result<Box<dyn Write>> {
    match path {
        Some(p) => Ok(Box::new(BufWriter::new(File::create(p)?))),
        None => Ok(Box::new(io::stdout())),
    }
}

const EXIT_OK: u8 = 0;
const EXIT_IO_ERROR: u8 = 1;
const EXIT_CONTRACT_ERROR: u8 = 2;

fn run() -> Result<(), (u8, String)> {
    let args = Args::parse();
    let total_start = Instant::now();

    if matches!(args.emit, Emit::L) && !args.keep_l {
        return Err((EXIT_CONTRACT_ERROR, "--emit l requires --keep-l".to_string()));
    }

    let field = Field::new(args.prime).map_err(|e| (EXIT_CONTRACT_ERROR, e.to_string()))?;

    let t0 = Instant::now();
    let reader = open_input(&args.input).map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
    let triplet = load_sms(BufReader::new(reader), Some(args.prime))
        .map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
    let mut a = triplet.compress();
    let load_time = t0.elapsed();

    if let Some(format) = args.dump {
        let mut out = open_output(&args.output).map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
        let result = match format {
            DumpFormat::Pbm => write_pbm(&mut out, &a),
            DumpFormat::Pgm => write_pgm(&mut out, args.dump_width, args.dump_height, &a),
            DumpFormat::Ppm => write_ppm(&mut out, &a, None),
        };
        result.map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
        print_timing_breakdown(&[("load", load_time)], total_start.elapsed());
        return Ok(());
    }

    let mut ws = Workspace::new(a.dim.ncols);

    let t1 = Instant::now();
    let search = find_pivots(&mut a, &mut ws);
    let pivots_time = t1.elapsed();

    if args.pivots_only {
        let mut out = open_output(&args.output).map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
        writeln!(out, "rows: {}", a.dim.nrows).map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
        writeln!(out, "cols: {}", a.dim.ncols).map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
        writeln!(out, "npiv: {}", search.npiv).map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
        print_timing_breakdown(
            &[("load", load_time), ("pivots", pivots_time)],
            total_start.elapsed(),
        );
        return Ok(());
    }

    let config = SolverConfig {
        modulus: args.prime,
        keep_l: args.keep_l,
        ..Default::default()
    };
    let order: Vec<usize> = search.p.iter().map(|&x| x as usize).collect();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let t2 = Instant::now();
    let bundle = factor(&a, Some(&order), &config, &field, &mut ws, &mut rng);
    let factor_time = t2.elapsed();

    let mut out = open_output(&args.output).map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
    match args.emit {
        Emit::Stats => {
            writeln!(out, "rows: {}", a.dim.nrows).map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
            writeln!(out, "cols: {}", a.dim.ncols).map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
            writeln!(out, "rank: {}", bundle.rank).map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
            writeln!(out, "nnz(U): {}", bundle.u.nnz()).map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
            if let Some(l) = &bundle.l {
                writeln!(out, "nnz(L): {}", l.nnz()).map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
            }
            writeln!(out, "early_abort_fired: {}", bundle.metrics.early_abort_fired)
                .map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
        }
        Emit::U => {
            save_sms(&mut out, &bundle.u).map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
        }
        Emit::L => {
            let l = bundle.l.as_ref().expect("checked above");
            save_sms(&mut out, l).map_err(|e| (EXIT_IO_ERROR, e.to_string()))?;
        }
    }

    print_timing_breakdown(
        &[("load", load_time), ("pivots", pivots_time), ("factor", factor_time)],
        total_start.elapsed(),
    );
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err((code, msg)) => {
            eprintln!("spasm: {msg}");
            ExitCode::from(code)
        }
    }
}
