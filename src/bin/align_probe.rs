use std::env;
use std::time::Instant;

use ctc_forced_align::dispatch::{forced_align_dyn, FloatDType, LogProbs, Targets};
use ctc_forced_align::spans::collapse;
use ctc_forced_align::{AlignEngineBuilder, LogProb};
use half::f16;
use ndarray::{Array1, Array2};
use sysinfo::{get_current_pid, ProcessRefreshKind, System};

const NUM_CLASSES: usize = 32;
const BLANK: usize = 0;

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("align_probe: {err}");
            eprintln!("usage: align_probe [--dtype float16|float32|float64] [--verify-limit N]");
            std::process::exit(2);
        }
    };

    let mut sys = System::new();
    let mut measurements = Vec::new();

    eprintln!("sparse targets (L = T / 4), dtype {}", options.dtype);
    measurements.extend(run_engine_scenario(
        "sparse_targets",
        &options,
        &mut sys,
        |len| (0..len / 4).map(|i| 1 + (i * 7) % (NUM_CLASSES - 1)).collect(),
    ));

    eprintln!("tight targets with repeats (L + R = T), dtype {}", options.dtype);
    measurements.extend(run_engine_scenario(
        "tight_repeats",
        &options,
        &mut sys,
        tight_targets,
    ));

    eprintln!("runtime dispatch, dtype {}", options.dtype);
    measurements.extend(run_dispatch(&options, &mut sys));

    write_csv(&measurements);

    let failed = measurements
        .iter()
        .filter(|m| matches!(m.verdict, Verdict::Failed(_)))
        .count();
    if failed > 0 {
        eprintln!("{failed} run(s) failed");
        std::process::exit(1);
    }
}

struct Options {
    verify_limit: usize,
    dtype: FloatDType,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut verify_limit = 4096usize;
        let mut dtype = FloatDType::F32;

        while let Some(arg) = args.next() {
            let arg = arg.into();
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
                None => (arg, None),
            };
            let mut value = || {
                inline
                    .clone()
                    .or_else(|| args.next().map(Into::into))
                    .ok_or_else(|| format!("missing value after {flag}"))
            };
            match flag.as_str() {
                "--verify-limit" => {
                    verify_limit = value()?
                        .parse()
                        .map_err(|_| "verify limit must be a non-negative integer".to_string())?;
                }
                "--dtype" => dtype = value()?.parse().map_err(|e| format!("{e}"))?,
                other => return Err(format!("unrecognized argument '{other}'")),
            }
        }

        Ok(Self {
            verify_limit,
            dtype,
        })
    }
}

struct Measurement {
    scenario: &'static str,
    frames: usize,
    labels: usize,
    wall_s: f64,
    rss_delta_kib: u64,
    verdict: Verdict,
}

enum Verdict {
    /// Too long for the full-lattice comparison.
    Skipped,
    Passed,
    Failed(String),
}

const LENGTHS: &[usize] = &[64, 256, 1024, 4096, 16384];

fn run_engine_scenario(
    scenario: &'static str,
    options: &Options,
    sys: &mut System,
    make_targets: fn(usize) -> Vec<usize>,
) -> Vec<Measurement> {
    LENGTHS
        .iter()
        .map(|&len| {
            let targets = to_labels(&make_targets(len));
            measure(scenario, len, targets.len(), sys, || match options.dtype {
                FloatDType::F16 => verify_engine(&synthetic_log_probs::<f16>(len), &targets, len, options),
                FloatDType::F32 => verify_engine(&synthetic_log_probs::<f32>(len), &targets, len, options),
                FloatDType::F64 => verify_engine(&synthetic_log_probs::<f64>(len), &targets, len, options),
            })
        })
        .collect()
}

fn verify_engine<F: LogProb>(
    log_probs: &Array2<F>,
    targets: &[i64],
    len: usize,
    options: &Options,
) -> Verdict {
    let windowed = match AlignEngineBuilder::new(log_probs.view(), targets)
        .with_blank(BLANK)
        .build()
    {
        Ok(engine) => engine.run(),
        Err(err) => return Verdict::Failed(err.to_string()),
    };

    if collapse(windowed.labels(), BLANK as i64) != targets {
        return Verdict::Failed("collapsed path differs from targets".to_string());
    }
    if len > options.verify_limit {
        return Verdict::Skipped;
    }

    let full = match AlignEngineBuilder::new(log_probs.view(), targets)
        .with_blank(BLANK)
        .with_pruning(false)
        .build()
    {
        Ok(engine) => engine.run(),
        Err(err) => return Verdict::Failed(err.to_string()),
    };
    if full.states() == windowed.states() && full.score() == windowed.score() {
        Verdict::Passed
    } else {
        Verdict::Failed(format!(
            "windowed score={:.6}, full score={:.6}",
            windowed.score().to_f64_lossy(),
            full.score().to_f64_lossy()
        ))
    }
}

fn run_dispatch(options: &Options, sys: &mut System) -> Vec<Measurement> {
    LENGTHS
        .iter()
        .map(|&len| {
            let labels = tight_targets(len / 2);
            let targets = Targets::from(Array1::from(to_labels(&labels)).into_dyn());
            let log_probs = match options.dtype {
                FloatDType::F16 => LogProbs::from(synthetic_log_probs::<f16>(len).into_dyn()),
                FloatDType::F32 => LogProbs::from(synthetic_log_probs::<f32>(len).into_dyn()),
                FloatDType::F64 => LogProbs::from(synthetic_log_probs::<f64>(len).into_dyn()),
            };
            measure("dispatch", len, labels.len(), sys, || {
                match forced_align_dyn(&log_probs, &targets, len, labels.len(), BLANK) {
                    Ok((path, scores)) if path.len() == len && scores.len() == len => Verdict::Passed,
                    Ok((path, scores)) => Verdict::Failed(format!(
                        "path_len={}, scores_len={}",
                        path.len(),
                        scores.len()
                    )),
                    Err(err) => Verdict::Failed(err.to_string()),
                }
            })
        })
        .collect()
}

fn measure<C>(
    scenario: &'static str,
    frames: usize,
    labels: usize,
    sys: &mut System,
    compute: C,
) -> Measurement
where
    C: FnOnce() -> Verdict,
{
    let before = rss_kib(sys);
    let start = Instant::now();
    let verdict = compute();
    let wall_s = start.elapsed().as_secs_f64();
    let after = rss_kib(sys);

    let status = match &verdict {
        Verdict::Skipped => "skipped".to_string(),
        Verdict::Passed => "ok".to_string(),
        Verdict::Failed(reason) => format!("FAILED: {reason}"),
    };
    eprintln!("  frames={frames:<6} labels={labels:<6} {wall_s:.3}s {status}");

    Measurement {
        scenario,
        frames,
        labels,
        wall_s,
        rss_delta_kib: after.saturating_sub(before),
        verdict,
    }
}

fn write_csv(measurements: &[Measurement]) {
    println!("scenario,frames,labels,wall_s,rss_delta_kib,verdict");
    for m in measurements {
        let verdict = match &m.verdict {
            Verdict::Skipped => "skipped".to_string(),
            Verdict::Passed => "passed".to_string(),
            Verdict::Failed(reason) => format!("\"failed: {}\"", reason.replace('"', "'")),
        };
        println!(
            "{},{},{},{:.3},{},{}",
            m.scenario, m.frames, m.labels, m.wall_s, m.rss_delta_kib, verdict
        );
    }
}

fn rss_kib(sys: &mut System) -> u64 {
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    if let Some(process) = get_current_pid().ok().and_then(|pid| sys.process(pid)) {
        process.memory() / 1024
    } else {
        0
    }
}

/// Deterministic, slightly irregular log-softmax rows of shape (len, NUM_CLASSES).
fn synthetic_log_probs<F: LogProb>(len: usize) -> Array2<F> {
    let mut out = Array2::from_elem((len, NUM_CLASSES), F::zero());
    for (t, mut row) in out.rows_mut().into_iter().enumerate() {
        let logits: Vec<f64> = (0..NUM_CLASSES)
            .map(|c| (((t * 31 + c * 17) % 97) as f64 / 13.0).sin() * 3.0)
            .collect();
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let norm = logits.iter().map(|l| (l - max).exp()).sum::<f64>().ln() + max;
        for (cell, logit) in row.iter_mut().zip(&logits) {
            *cell = F::from(logit - norm).unwrap_or_else(F::neg_infinity);
        }
    }
    out
}

/// Targets of exactly `len` frames once repeats are counted: runs of pairs.
fn tight_targets(len: usize) -> Vec<usize> {
    let mut labels = Vec::new();
    let mut budget = len;
    let mut label = 1;
    while budget > 0 {
        if budget >= 3 {
            labels.extend([label, label]);
            budget -= 3;
        } else {
            labels.push(label);
            budget -= 1;
        }
        label = 1 + label % (NUM_CLASSES - 1);
    }
    labels
}

fn to_labels(classes: &[usize]) -> Vec<i64> {
    classes
        .iter()
        .map(|&c| i64::try_from(c).unwrap_or(i64::MAX))
        .collect()
}
