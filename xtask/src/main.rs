use anyhow::{anyhow, bail, Context, Result};
use ndarray::{Array, Ix3};
use rustfft::{num_complex::Complex, FftPlanner};
use sci_rfft::fft::traits::{Irfft1D, Rfft1D};
use sci_rfft::fft::{
    irfft1, irfft1_to_shape, rfft1, rfft_bins, IrfftConfig, IrfftKernel, RfftConfig, RfftKernel,
};
use sci_rfft::kernel::KernelLifecycle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const PYTHON_ENV_VAR: &str = "SCI_RFFT_PYTHON";
const DEFAULT_PYTHON_BIN: &str = "python";

const PY_FFT_SCRIPT: &str = r#"
import json
import sys
import time
import numpy as np

env = json.loads(sys.stdin.read())
op = env["op"]
iters = int(env["iters"])
p = env["payload"]

def _compute():
    if op == "rfft":
        x = np.asarray(p["signal"], dtype=float).reshape(p["shape"])
        y = np.fft.rfft(x, axis=-1)
        return np.stack([y.real, y.imag], axis=-1)
    if op == "irfft":
        packed = np.asarray(p["spectrum"], dtype=float).reshape(p["shape"])
        y = packed[..., 0] + 1j * packed[..., 1]
        n = p.get("n")
        return np.fft.irfft(y, n=None if n is None else int(n), axis=-1)
    raise ValueError(f"unsupported op: {op}")

y = np.asarray(_compute(), dtype=float).reshape(-1)

t0 = time.perf_counter_ns()
for _ in range(iters):
    _compute()
t1 = time.perf_counter_ns()

print(json.dumps({
    "output": y.tolist(),
    "avg_ns": (t1 - t0) / max(iters, 1),
    "python_version": sys.version.split()[0],
    "numpy_version": np.__version__,
    "matplotlib_version": None
}))
"#;

#[derive(Debug, Serialize, Deserialize, Clone)]
struct PythonEval {
    output: Vec<f64>,
    avg_ns: f64,
    python_version: String,
    numpy_version: String,
    matplotlib_version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ContractRow {
    case_id: String,
    shape: Vec<usize>,
    pearson_r: f64,
    mae: f64,
    rmse: f64,
    max_abs: f64,
    baseline_max_abs: f64,
    rust_candidate_ns: f64,
    rust_baseline_ns: f64,
    python_ns: f64,
    speedup_vs_baseline: f64,
    speedup_vs_python: f64,
    overlay_plot: String,
    residual_plot: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContractBundle {
    generated_epoch_seconds: u64,
    python_executable: String,
    python_version: String,
    numpy_version: String,
    matplotlib_version: String,
    rows: Vec<ContractRow>,
}

/// One evaluated contract case before metrics are attached.
struct CaseOutcome<'a> {
    case_id: &'a str,
    shape: &'a [usize],
    candidate: Vec<f64>,
    baseline: Vec<f64>,
    py: PythonEval,
    candidate_ns: f64,
    baseline_ns: f64,
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("contracts") => run_contracts(),
        _ => {
            eprintln!("Usage:");
            eprintln!("  cargo run -p xtask -- contracts");
            eprintln!();
            eprintln!(
                "Set {PYTHON_ENV_VAR} to choose the interpreter (default: {DEFAULT_PYTHON_BIN})."
            );
            Ok(())
        }
    }
}

fn run_contracts() -> Result<()> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let out_dir = PathBuf::from(format!("target/contracts/{ts}"));
    let plots_dir = out_dir.join("plots");
    fs::create_dir_all(&plots_dir).context("creating contract output directories")?;

    let python_bin = detect_python_bin();

    let mut rows = Vec::new();
    let mut case_plot_payload = Vec::new();

    // 1-D forward, even and odd lengths, through the checked kernel.
    for len in [512usize, 511] {
        let case_id = format!("rfft_kernel_1d_len{len}");
        let shape = [len];
        let signal = synthetic_signal(len, 0.0);
        let kernel = RfftKernel::try_new(RfftConfig { len })?;

        let candidate: Vec<f64> = kernel
            .run_alloc(&signal)
            .map_err(|e| anyhow!("{case_id} candidate execution failed: {e}"))?;
        let baseline = reference_rfft(&signal);
        let py = python_fft_eval(
            &python_bin,
            "rfft",
            json!({ "signal": signal, "shape": shape }),
            200,
        )?;

        let candidate_ns = benchmark_avg_ns(200, || {
            kernel
                .run_alloc(&signal)
                .map(|_: Vec<f64>| ())
                .map_err(|e| anyhow!("{case_id} candidate benchmark failed: {e}"))
        })?;
        let baseline_ns = benchmark_avg_ns(200, || {
            let _ = reference_rfft(&signal);
            Ok(())
        })?;

        record_case(
            &mut rows,
            &mut case_plot_payload,
            &plots_dir,
            CaseOutcome {
                case_id: &case_id,
                shape: &shape,
                candidate,
                baseline,
                py,
                candidate_ns,
                baseline_ns,
            },
        )?;
    }

    // Batched forward over a rank-3 array.
    {
        let case_id = "rfft1_batched_4x3x96";
        let shape = [4usize, 3, 96];
        let x = batched_signal(shape);
        let flat = x.iter().copied().collect::<Vec<_>>();

        let candidate = rfft1(&x)
            .map_err(|e| anyhow!("{case_id} candidate execution failed: {e}"))?
            .iter()
            .copied()
            .collect::<Vec<_>>();
        let baseline = reference_rfft_rows(&flat, shape[2]);
        let py = python_fft_eval(
            &python_bin,
            "rfft",
            json!({ "signal": flat, "shape": shape }),
            120,
        )?;

        let candidate_ns = benchmark_avg_ns(120, || {
            rfft1(&x)
                .map(|_| ())
                .map_err(|e| anyhow!("{case_id} candidate benchmark failed: {e}"))
        })?;
        let baseline_ns = benchmark_avg_ns(120, || {
            let _ = reference_rfft_rows(&flat, shape[2]);
            Ok(())
        })?;

        record_case(
            &mut rows,
            &mut case_plot_payload,
            &plots_dir,
            CaseOutcome {
                case_id,
                shape: &shape,
                candidate,
                baseline,
                py,
                candidate_ns,
                baseline_ns,
            },
        )?;
    }

    // Inverse with the signal length inferred from the bin count.
    {
        let case_id = "irfft1_round_trip_8x256";
        let shape = [8usize, 256];
        let x = batched_signal([1, shape[0], shape[1]]);
        let spectrum = rfft1(&x).map_err(|e| anyhow!("{case_id} forward failed: {e}"))?;
        let packed = spectrum.iter().copied().collect::<Vec<_>>();

        let candidate = irfft1(&spectrum)
            .map_err(|e| anyhow!("{case_id} candidate execution failed: {e}"))?
            .iter()
            .copied()
            .collect::<Vec<_>>();
        let baseline = reference_irfft_rows(&packed, rfft_bins(shape[1]), shape[1]);
        let py = python_fft_eval(
            &python_bin,
            "irfft",
            json!({ "spectrum": packed, "shape": spectrum.shape(), "n": null }),
            120,
        )?;

        let candidate_ns = benchmark_avg_ns(120, || {
            irfft1(&spectrum)
                .map(|_| ())
                .map_err(|e| anyhow!("{case_id} candidate benchmark failed: {e}"))
        })?;
        let baseline_ns = benchmark_avg_ns(120, || {
            let _ = reference_irfft_rows(&packed, rfft_bins(shape[1]), shape[1]);
            Ok(())
        })?;

        record_case(
            &mut rows,
            &mut case_plot_payload,
            &plots_dir,
            CaseOutcome {
                case_id,
                shape: &shape,
                candidate,
                baseline,
                py,
                candidate_ns,
                baseline_ns,
            },
        )?;
    }

    // Inverse with an explicit odd output size, batched and single-sequence.
    {
        let case_id = "irfft1_to_shape_6x201";
        let shape = [6usize, 201];
        let x = batched_signal([1, shape[0], shape[1]])
            .into_shape_with_order((shape[0], shape[1]))
            .context("flattening batched signal")?;
        let spectrum = rfft1(&x).map_err(|e| anyhow!("{case_id} forward failed: {e}"))?;
        let packed = spectrum.iter().copied().collect::<Vec<_>>();

        let candidate = irfft1_to_shape(&spectrum, shape)
            .map_err(|e| anyhow!("{case_id} candidate execution failed: {e}"))?
            .iter()
            .copied()
            .collect::<Vec<_>>();
        let baseline = reference_irfft_rows(&packed, rfft_bins(shape[1]), shape[1]);
        let py = python_fft_eval(
            &python_bin,
            "irfft",
            json!({ "spectrum": packed, "shape": spectrum.shape(), "n": shape[1] }),
            120,
        )?;

        let candidate_ns = benchmark_avg_ns(120, || {
            irfft1_to_shape(&spectrum, shape)
                .map(|_| ())
                .map_err(|e| anyhow!("{case_id} candidate benchmark failed: {e}"))
        })?;
        let baseline_ns = benchmark_avg_ns(120, || {
            let _ = reference_irfft_rows(&packed, rfft_bins(shape[1]), shape[1]);
            Ok(())
        })?;

        record_case(
            &mut rows,
            &mut case_plot_payload,
            &plots_dir,
            CaseOutcome {
                case_id,
                shape: &shape,
                candidate,
                baseline,
                py,
                candidate_ns,
                baseline_ns,
            },
        )?;
    }

    {
        let case_id = "irfft_kernel_1d_len127";
        let len = 127usize;
        let shape = [len];
        let signal = synthetic_signal(len, 0.4);
        let packed = reference_rfft(&signal);
        let kernel = IrfftKernel::try_new(IrfftConfig { len })?;

        let candidate: Vec<f64> = kernel
            .run_alloc(&packed)
            .map_err(|e| anyhow!("{case_id} candidate execution failed: {e}"))?;
        let baseline = reference_irfft_rows(&packed, rfft_bins(len), len);
        let py = python_fft_eval(
            &python_bin,
            "irfft",
            json!({ "spectrum": packed, "shape": [rfft_bins(len), 2], "n": len }),
            200,
        )?;

        let candidate_ns = benchmark_avg_ns(200, || {
            kernel
                .run_alloc(&packed)
                .map(|_: Vec<f64>| ())
                .map_err(|e| anyhow!("{case_id} candidate benchmark failed: {e}"))
        })?;
        let baseline_ns = benchmark_avg_ns(200, || {
            let _ = reference_irfft_rows(&packed, rfft_bins(len), len);
            Ok(())
        })?;

        record_case(
            &mut rows,
            &mut case_plot_payload,
            &plots_dir,
            CaseOutcome {
                case_id,
                shape: &shape,
                candidate,
                baseline,
                py,
                candidate_ns,
                baseline_ns,
            },
        )?;
    }

    let version_probe = python_versions(&python_bin)?;
    let report_pdf = out_dir.join("report.pdf");
    generate_plots_and_pdf(&python_bin, &case_plot_payload, &report_pdf)?;

    let bundle = ContractBundle {
        generated_epoch_seconds: ts,
        python_executable: python_bin.to_string_lossy().into_owned(),
        python_version: version_probe.python_version,
        numpy_version: version_probe.numpy_version,
        matplotlib_version: version_probe
            .matplotlib_version
            .unwrap_or_else(|| "unknown".to_string()),
        rows,
    };

    write_summary_csv(&out_dir.join("summary.csv"), &bundle.rows)?;
    fs::write(
        out_dir.join("summary.json"),
        serde_json::to_vec_pretty(&bundle).context("serializing summary bundle")?,
    )
    .context("writing summary.json")?;

    println!("Contract artifacts generated in: {}", out_dir.display());
    println!("  - {}", out_dir.join("summary.csv").display());
    println!("  - {}", out_dir.join("summary.json").display());
    println!("  - {}", report_pdf.display());
    println!("  - {}", plots_dir.display());
    println!("  - cases: {}", bundle.rows.len());

    Ok(())
}

fn synthetic_signal(len: usize, phase: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let x = i as f64 / 27.0 + phase;
            x.sin() + 0.35 * (2.3 * x).cos() + 0.1 * (7.0 * x).sin() + 0.05
        })
        .collect()
}

fn batched_signal(shape: [usize; 3]) -> Array<f64, Ix3> {
    Array::from_shape_fn(shape, |(i, j, k)| {
        let x = k as f64 / 19.0;
        (x * (1.0 + i as f64)).sin() + 0.5 * (x * (2.0 + j as f64) + 0.3).cos()
    })
}

/// Packed half-spectrum of `signal` through a full complex FFT in `f64`.
fn reference_rfft(signal: &[f64]) -> Vec<f64> {
    let len = signal.len();
    let mut buf: Vec<Complex<f64>> = signal.iter().map(|&v| Complex::new(v, 0.0)).collect();
    FftPlanner::<f64>::new()
        .plan_fft_forward(len)
        .process(&mut buf);
    buf.iter()
        .take(rfft_bins(len))
        .flat_map(|c| [c.re, c.im])
        .collect()
}

fn reference_rfft_rows(flat: &[f64], len: usize) -> Vec<f64> {
    flat.chunks_exact(len).flat_map(reference_rfft).collect()
}

/// Rebuild the Hermitian spectrum of each packed row and invert it in `f64`.
fn reference_irfft_rows(packed: &[f64], bins: usize, len: usize) -> Vec<f64> {
    let fft = FftPlanner::<f64>::new().plan_fft_inverse(len);
    let mut out = Vec::with_capacity(packed.len() / (2 * bins) * len);
    for row in packed.chunks_exact(2 * bins) {
        let mut full: Vec<Complex<f64>> = (0..len)
            .map(|k| {
                let (bin, sign) = if k < bins { (k, 1.0) } else { (len - k, -1.0) };
                Complex::new(row[2 * bin], sign * row[2 * bin + 1])
            })
            .collect();
        full[0].im = 0.0;
        if len % 2 == 0 {
            full[len / 2].im = 0.0;
        }
        fft.process(&mut full);
        out.extend(full.iter().map(|c| c.re / len as f64));
    }
    out
}

fn detect_python_bin() -> PathBuf {
    std::env::var_os(PYTHON_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON_BIN))
}

fn python_versions(python_bin: &Path) -> Result<PythonEval> {
    run_python_eval(
        python_bin,
        r#"
import json, sys
import numpy
import matplotlib
payload = json.loads(sys.stdin.read())
print(json.dumps({
    "output": [],
    "avg_ns": 0.0,
    "python_version": sys.version.split()[0],
    "numpy_version": numpy.__version__,
    "matplotlib_version": matplotlib.__version__
}))
"#,
        json!({}),
    )
}

fn python_fft_eval(
    python_bin: &Path,
    op: &str,
    payload: serde_json::Value,
    iters: usize,
) -> Result<PythonEval> {
    run_python_eval(
        python_bin,
        PY_FFT_SCRIPT,
        json!({
            "op": op,
            "iters": iters,
            "payload": payload
        }),
    )
}

fn spawn_python(python_bin: &Path, script: &str, payload: &serde_json::Value) -> Result<Vec<u8>> {
    let mut child = Command::new(python_bin)
        .arg("-c")
        .arg(script)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning python interpreter at {}", python_bin.display()))?;

    {
        let stdin = child.stdin.as_mut().context("opening python stdin")?;
        let payload_bytes = serde_json::to_vec(payload).context("serializing python payload")?;
        stdin
            .write_all(&payload_bytes)
            .context("writing payload to python stdin")?;
    }

    let output = child
        .wait_with_output()
        .context("waiting for python process")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("python execution failed: {stderr}");
    }
    Ok(output.stdout)
}

fn run_python_eval(
    python_bin: &Path,
    script: &str,
    payload: serde_json::Value,
) -> Result<PythonEval> {
    let stdout = spawn_python(python_bin, script, &payload)?;
    let stdout = String::from_utf8(stdout).context("parsing python stdout utf8")?;
    serde_json::from_str(stdout.trim()).context("parsing python json")
}

fn record_case(
    rows: &mut Vec<ContractRow>,
    case_plot_payload: &mut Vec<serde_json::Value>,
    plots_dir: &Path,
    outcome: CaseOutcome<'_>,
) -> Result<()> {
    let case_id = outcome.case_id;
    ensure_same_length(case_id, &outcome.candidate, &outcome.baseline)?;
    ensure_same_length(case_id, &outcome.candidate, &outcome.py.output)?;

    let overlay = plots_dir.join(format!("{case_id}_overlay.png"));
    let residual = plots_dir.join(format!("{case_id}_residual.png"));

    let reference = &outcome.py.output;
    rows.push(ContractRow {
        case_id: case_id.to_string(),
        shape: outcome.shape.to_vec(),
        pearson_r: pearson(&outcome.candidate, reference),
        mae: mean_abs_error(&outcome.candidate, reference),
        rmse: root_mean_squared_error(&outcome.candidate, reference),
        max_abs: max_abs_error(&outcome.candidate, reference),
        baseline_max_abs: max_abs_error(&outcome.candidate, &outcome.baseline),
        rust_candidate_ns: outcome.candidate_ns,
        rust_baseline_ns: outcome.baseline_ns,
        python_ns: outcome.py.avg_ns,
        speedup_vs_baseline: outcome.baseline_ns / outcome.candidate_ns,
        speedup_vs_python: outcome.py.avg_ns / outcome.candidate_ns,
        overlay_plot: overlay.to_string_lossy().into_owned(),
        residual_plot: residual.to_string_lossy().into_owned(),
    });

    case_plot_payload.push(json!({
        "case_id": case_id,
        "rust_candidate": outcome.candidate,
        "python_reference": outcome.py.output,
        "overlay_plot": overlay.to_string_lossy(),
        "residual_plot": residual.to_string_lossy()
    }));

    Ok(())
}

fn ensure_same_length(case_id: &str, a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        bail!(
            "case {case_id} has mismatched output lengths: left={}, right={}",
            a.len(),
            b.len()
        );
    }
    Ok(())
}

fn benchmark_avg_ns<F>(iters: usize, mut f: F) -> Result<f64>
where
    F: FnMut() -> Result<()>,
{
    let start = Instant::now();
    for _ in 0..iters {
        f()?;
    }
    Ok(start.elapsed().as_nanos() as f64 / iters as f64)
}

fn abs_diffs<'a>(a: &'a [f64], b: &'a [f64]) -> impl Iterator<Item = f64> + 'a {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs())
}

fn mean_abs_error(a: &[f64], b: &[f64]) -> f64 {
    abs_diffs(a, b).sum::<f64>() / a.len() as f64
}

fn root_mean_squared_error(a: &[f64], b: &[f64]) -> f64 {
    (abs_diffs(a, b).map(|d| d * d).sum::<f64>() / a.len() as f64).sqrt()
}

fn max_abs_error(a: &[f64], b: &[f64]) -> f64 {
    abs_diffs(a, b).fold(0.0, f64::max)
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let (cov, var_a, var_b) = a.iter().zip(b.iter()).fold(
        (0.0, 0.0, 0.0),
        |(cov, var_a, var_b), (x, y)| {
            let (da, db) = (x - mean_a, y - mean_b);
            (cov + da * db, var_a + da * da, var_b + db * db)
        },
    );
    if var_a == 0.0 || var_b == 0.0 {
        if a == b {
            1.0
        } else {
            0.0
        }
    } else {
        cov / (var_a.sqrt() * var_b.sqrt())
    }
}

fn write_summary_csv(path: &Path, rows: &[ContractRow]) -> Result<()> {
    let mut out = String::from(
        "case_id,shape,pearson_r,mae,rmse,max_abs,baseline_max_abs,rust_candidate_ns,\
         rust_baseline_ns,python_ns,speedup_vs_baseline,speedup_vs_python,overlay_plot,\
         residual_plot\n",
    );
    for row in rows {
        let shape = row
            .shape
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("x");
        out.push_str(&format!(
            "{},{},{:.12},{:.12},{:.12},{:.12},{:.12},{:.3},{:.3},{:.3},{:.6},{:.6},{},{}\n",
            row.case_id,
            shape,
            row.pearson_r,
            row.mae,
            row.rmse,
            row.max_abs,
            row.baseline_max_abs,
            row.rust_candidate_ns,
            row.rust_baseline_ns,
            row.python_ns,
            row.speedup_vs_baseline,
            row.speedup_vs_python,
            row.overlay_plot,
            row.residual_plot
        ));
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

fn generate_plots_and_pdf(
    python_bin: &Path,
    case_payload: &[serde_json::Value],
    report_pdf: &Path,
) -> Result<()> {
    let payload = json!({
        "cases": case_payload,
        "report_pdf": report_pdf.to_string_lossy()
    });
    let script = r#"
import json
import sys
import matplotlib
matplotlib.use("Agg")
import matplotlib.pyplot as plt
from matplotlib.backends.backend_pdf import PdfPages

payload = json.loads(sys.stdin.read())

def _page(pdf, path, title, ylabel, series):
    fig = plt.figure(figsize=(10, 4))
    ax = fig.add_subplot(1, 1, 1)
    for label, values, style in series:
        ax.plot(range(len(values)), values, label=label, **style)
    ax.set_title(title)
    ax.set_xlabel("flat index")
    ax.set_ylabel(ylabel)
    ax.legend()
    fig.tight_layout()
    fig.savefig(path, dpi=150)
    pdf.savefig(fig)
    plt.close(fig)

with PdfPages(payload["report_pdf"]) as pdf:
    for case in payload["cases"]:
        case_id = case["case_id"]
        rust = case["rust_candidate"]
        py = case["python_reference"]
        _page(pdf, case["overlay_plot"], f"{case_id} :: overlay", "value", [
            ("numpy.fft", py, {"linewidth": 1.6}),
            ("sci-rfft", rust, {"linewidth": 1.0, "alpha": 0.8}),
        ])
        _page(pdf, case["residual_plot"], f"{case_id} :: residual", "error", [
            ("sci-rfft - numpy", [r - p for r, p in zip(rust, py)], {"color": "tab:red"}),
        ])
"#;

    spawn_python(python_bin, script, &payload).context("plot/pdf generation failed")?;
    Ok(())
}
