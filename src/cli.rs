use crate::{
    config::Config,
    dashboard::Dashboard,
    normalize::normalize,
    proof,
    query::QueryOutcome,
    render::HtmlRenderer,
    report::ReportSource,
    staging::{is_known_extension, StagedFile},
    surface::ConsoleSurface,
    transport::http::HttpTransport,
    util::{ensure_dir, now_rfc3339, sha256_hex},
};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "forensight")]
#[command(about = "Evidence upload and forensic report client (verification API + RAG queries)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./forensight.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the effective endpoints and probe the server.
    Doctor {},
    /// Upload evidence files and write the rendered forensic report.
    Analyze {
        /// Evidence file; repeat for several.
        #[arg(long = "file", required = true)]
        files: Vec<PathBuf>,
        /// Free-text instructions for the analysis.
        #[arg(long)]
        instructions: Option<String>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Ask the knowledge base a question.
    Query {
        #[arg(long)]
        text: String,
        #[arg(long)]
        case_id: Option<String>,
    },
    /// Render a saved backend response without contacting the server.
    Render {
        #[arg(long)]
        input: PathBuf,
        /// Output HTML file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = match resolve_config_path(args.config.as_deref())? {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    match &args.cmd {
        Command::Doctor {} => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            doctor(&cfg)
        }
        Command::Analyze {
            files,
            instructions,
            out_dir,
        } => analyze(&args, &cfg, files, instructions.as_deref(), out_dir.as_deref()),
        Command::Query { text, case_id } => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            query(&cfg, text, case_id.as_deref())
        }
        Command::Render { input, out } => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            render(&cfg, input, out.as_deref())
        }
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(p) = user {
        return Ok(Some(p.to_path_buf()));
    }
    for candidate in ["forensight.toml", "forensight.example.toml"] {
        let p = PathBuf::from(candidate);
        if p.exists() {
            return Ok(Some(p));
        }
    }
    Ok(None)
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn doctor(cfg: &Config) -> Result<()> {
    let transport = HttpTransport::new(cfg)?;
    let (reachable, detail) = match transport.ping() {
        Ok(code) => (true, format!("HTTP {code}")),
        Err(err) => (false, err.to_string()),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "base_url": cfg.server.base_url,
            "primary": cfg.endpoint(&cfg.server.primary_path),
            "legacy": cfg.endpoint(&cfg.server.legacy_path),
            "query": cfg.endpoint(&cfg.server.query_path),
            "reachable": reachable,
            "detail": detail,
        }))?
    );
    Ok(())
}

fn analyze(
    args: &Args,
    cfg: &Config,
    inputs: &[PathBuf],
    instructions: Option<&str>,
    out_override: Option<&Path>,
) -> Result<()> {
    let mut staged = Vec::with_capacity(inputs.len());
    let mut notices = Vec::new();
    for input in inputs {
        notices.extend(validate_input(cfg, input)?);
        staged.push(StagedFile::from_path(input)?);
    }

    let total: u64 = staged.iter().map(|f| f.size).sum();
    if total > cfg.limits.max_upload_bytes {
        bail!(
            "evidence exceeds max_upload_bytes ({} > {})",
            total,
            cfg.limits.max_upload_bytes
        );
    }

    let instructions = instructions
        .unwrap_or(cfg.upload.default_instructions.as_str())
        .to_string();

    let started = now_rfc3339();
    let fingerprint = staged
        .iter()
        .map(|f| format!("{}:{}", f.name, f.size))
        .collect::<Vec<_>>()
        .join("|");
    let job_id = sha256_hex(format!("{started}|{fingerprint}|{instructions}").as_bytes());

    let out_root = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.output.out_dir));
    let job_dir = out_root.join(&job_id);
    ensure_dir(&job_dir)?;

    let log_path = resolve_log_path(cfg, Some(&job_dir));
    let _guard = init_logging(args, cfg, log_path.as_deref())?;

    info!("job_id={job_id} out={}", job_dir.display());
    for notice in &notices {
        warn!("{notice}");
    }

    let transport = HttpTransport::new(cfg)?;
    let mut dashboard = Dashboard::new(cfg, transport, ConsoleSurface::new());
    let requested = staged.len();
    let added = dashboard.add_files(staged);
    if added < requested {
        warn!("skipped {} duplicate file(s) (same name and size)", requested - added);
    }

    let submission = dashboard.submit(&instructions)?;
    let renderer = dashboard.renderer().clone();
    let page = dashboard.into_surface().into_page(&renderer);

    if cfg.output.write_html {
        std::fs::write(job_dir.join(&cfg.output.html_filename), page)?;
    }

    if cfg.output.write_report_json {
        std::fs::write(
            job_dir.join(&cfg.output.report_filename),
            serde_json::to_string_pretty(&submission.report)?,
        )?;
    }

    if cfg.output.write_raw_json {
        if let Some(raw) = &submission.raw {
            std::fs::write(
                job_dir.join(&cfg.output.raw_filename),
                serde_json::to_string_pretty(raw)?,
            )?;
        }
    }

    if cfg.output.write_index_json {
        let index = serde_json::json!({
            "job_id": job_id,
            "started": started,
            "finished": now_rfc3339(),
            "source": submission.report.source,
            "report_html": cfg.output.html_filename,
            "report_json": cfg.output.report_filename,
            "raw_json": submission.raw.as_ref().map(|_| &cfg.output.raw_filename),
        });
        std::fs::write(job_dir.join("index.json"), serde_json::to_string_pretty(&index)?)?;
    }

    if cfg.output.print_summary {
        let status = match submission.report.source {
            ReportSource::Simulated => "simulated",
            _ => "ok",
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "job_id": job_id,
                "job_dir": job_dir,
                "source": submission.report.source,
                "results": submission.report.results.len(),
                "proof": submission.proof,
                "status": status,
            }))?
        );
    }

    Ok(())
}

fn query(cfg: &Config, text: &str, case_id: Option<&str>) -> Result<()> {
    let transport = HttpTransport::new(cfg)?;
    let mut dashboard = Dashboard::new(cfg, transport, ConsoleSurface::new());
    match dashboard.query(text, case_id) {
        QueryOutcome::Answered(answer) => {
            println!("{}", answer.answer);
            for source in &answer.sources {
                println!("- {source}");
            }
            Ok(())
        }
        QueryOutcome::Errored(message) => Err(anyhow!("query failed: {message}")),
        QueryOutcome::Rejected => Err(anyhow!("query text is empty")),
    }
}

fn render(cfg: &Config, input: &Path, out: Option<&Path>) -> Result<()> {
    let raw_text = std::fs::read_to_string(input)
        .with_context(|| format!("reading report: {}", input.display()))?;
    let raw: serde_json::Value =
        serde_json::from_str(&raw_text).with_context(|| "parsing report JSON")?;
    let report = normalize(&raw, ReportSource::Offline)
        .map_err(|e| anyhow!("{}: {e}", input.display()))?;
    let check = proof::verify(&raw);

    let renderer = HtmlRenderer::new(&cfg.render);
    let cards: String = report.results.iter().map(|r| renderer.card(r)).collect();
    let page = renderer.document(&[
        renderer.summary(&report, Some(&check)),
        format!("<section class=\"grid\">\n{cards}</section>\n"),
    ]);

    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                ensure_dir(parent)?;
            }
            std::fs::write(path, page)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {} ({} card(s))", path.display(), report.results.len());
        }
        None => print!("{page}"),
    }
    Ok(())
}

/// Rejects unusable evidence paths. Returns a notice for inputs that are usable
/// but likely to be refused by the backend; the caller logs it once logging is up.
pub fn validate_input(cfg: &Config, input: &Path) -> Result<Option<String>> {
    let input_str = input.display().to_string();

    if cfg.security.reject_url_inputs && looks_like_url(&input_str) {
        return Err(anyhow!("URL inputs are disabled: {input_str}"));
    }

    if !input.is_file() {
        return Err(anyhow!("evidence file does not exist: {}", input.display()));
    }

    if cfg.limits.warn_on_unknown_extension && !is_known_extension(&input_str) {
        return Ok(Some(format!(
            "extension not accepted by the backend, upload may be rejected: {}",
            input.display()
        )));
    }

    Ok(None)
}

fn looks_like_url(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}

fn resolve_log_path(cfg: &Config, job_dir: Option<&Path>) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    if let Some(job_dir) = job_dir {
        return Some(job_dir.join("forensight.log"));
    }

    Some(PathBuf::from(&cfg.output.out_dir).join("forensight.log"))
}
