use crate::cli::config::{AppConfig, ProfileCommands};
use crate::dom::document::Document;
use crate::fill::engine::FillEngine;
use crate::protocol::client::{field_line, CompletionService, HeuristicService, OpenAiService};
use crate::report::console::format_console_report;
use crate::report::report_model::SuiteReport;
use crate::scan::extractor::scan;
use crate::scan::field_model::FillMode;
use crate::scenario::runner::ScenarioRunner;
use crate::scenario::scenario_model::Scenario;
use crate::store::credentials::ProfileStore;
use crate::trace::logger::TraceLogger;

// ============================================================================
// scan subcommand
// ============================================================================

pub fn cmd_scan(
    doc_path: &str,
    mode: &str,
    format: &str,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let mode = parse_mode(mode)?;
    let doc = Document::load(doc_path)?;
    let descriptors = scan(&doc, mode);

    if verbose > 0 {
        eprintln!(
            "Scanned {}: {} eligible field(s)",
            doc_path,
            descriptors.len()
        );
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&descriptors)?),
        "console" => {
            for descriptor in &descriptors {
                println!("{}", field_line(descriptor));
            }
        }
        other => {
            return Err(format!("Unknown format '{}' (expected console or json)", other).into());
        }
    }

    Ok(())
}

// ============================================================================
// fill subcommand
// ============================================================================

/// Fill a snapshot and return whether the run ended in a success status.
pub fn cmd_fill(
    doc_path: &str,
    output: Option<&str>,
    mode: &str,
    service_name: &str,
    endpoint: Option<&str>,
    model: Option<&str>,
    config: &AppConfig,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mode = parse_mode(mode)?;
    let mut doc = Document::load(doc_path)?;
    let store = ProfileStore::load(&config.fill.store);
    let tracer = build_tracer(config);
    let service = build_service(service_name, endpoint, model, &store, config)?;

    let engine = FillEngine::new(service.as_ref());
    let outcome = engine.fill_document(&mut doc, &store.user_data, mode, 0, &tracer);

    // Status goes to stderr so stdout stays a clean snapshot.
    eprintln!("{}", outcome.detail);
    if verbose > 0 {
        eprintln!(
            "filled={} skipped={} misses={} failed={}",
            outcome.filled, outcome.skipped, outcome.misses, outcome.failed
        );
    }

    match output {
        Some(path) => std::fs::write(path, doc.to_json())?,
        None => println!("{}", doc.to_json()),
    }

    Ok(outcome.is_success())
}

// ============================================================================
// run subcommand
// ============================================================================

/// Run scenarios and return whether all passed.
pub fn cmd_run(
    scenario_path: &str,
    service_name: &str,
    endpoint: Option<&str>,
    model: Option<&str>,
    config: &AppConfig,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let scenarios = load_scenarios(scenario_path)?;

    if scenarios.is_empty() {
        eprintln!("No scenarios found at: {}", scenario_path);
        return Ok(true);
    }

    if verbose > 0 {
        eprintln!("Running {} scenarios...", scenarios.len());
    }

    let store = ProfileStore::load(&config.fill.store);
    let tracer = build_tracer(config);
    let service = build_service(service_name, endpoint, model, &store, config)?;

    let start = std::time::Instant::now();
    let mut results = Vec::new();
    for scenario in &scenarios {
        if verbose > 0 {
            eprintln!("  Running: {}", scenario.name);
        }
        let result = ScenarioRunner::run(scenario, service.as_ref(), &tracer);
        results.push(result);
    }
    let duration = start.elapsed().as_millis();

    let report = SuiteReport::from_results("CLI Run", results).with_duration(duration);
    print!("{}", format_console_report(&report));

    Ok(report.all_passed())
}

/// Load scenarios from a single YAML file or a directory of YAML files.
pub fn load_scenarios(path: &str) -> Result<Vec<Scenario>, Box<dyn std::error::Error>> {
    let metadata = std::fs::metadata(path)?;
    if metadata.is_dir() {
        let mut scenarios = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let p = entry.path();
            if p.extension().map_or(false, |e| e == "yaml" || e == "yml") {
                scenarios.push(Scenario::load(&p.to_string_lossy())?);
            }
        }
        // Sort by name for deterministic order
        scenarios.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(scenarios)
    } else {
        Ok(vec![Scenario::load(path)?])
    }
}

// ============================================================================
// profile subcommand
// ============================================================================

pub fn cmd_profile(
    command: &ProfileCommands,
    store_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        ProfileCommands::Set {
            api_key,
            data,
            data_file,
        } => {
            let mut store = ProfileStore::load(store_path);
            if let Some(key) = api_key {
                store.api_key = key.clone();
            }
            if let Some(text) = data {
                store.user_data = text.clone();
            }
            if let Some(file) = data_file {
                store.user_data = std::fs::read_to_string(file)
                    .map_err(|e| format!("Cannot read data file '{}': {}", file, e))?;
            }
            store.save(store_path)?;
            println!("Profile store updated: {}", store_path);
        }
        ProfileCommands::Show => {
            let store = ProfileStore::load(store_path);
            // Never print the key itself.
            let key_state = if store.api_key.trim().is_empty() {
                "(absent)"
            } else {
                "(set)"
            };
            println!("api_key: {}", key_state);
            if store.user_data.trim().is_empty() {
                println!("user_data: (empty)");
            } else {
                println!("user_data:\n{}", store.user_data);
            }
        }
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_mode(name: &str) -> Result<FillMode, Box<dyn std::error::Error>> {
    match name {
        "only_empty" => Ok(FillMode::OnlyEmpty),
        "all_eligible" => Ok(FillMode::AllEligible),
        other => {
            Err(format!("Unknown mode '{}' (expected only_empty or all_eligible)", other).into())
        }
    }
}

/// Build the appropriate CompletionService based on name.
fn build_service(
    name: &str,
    endpoint: Option<&str>,
    model: Option<&str>,
    store: &ProfileStore,
    config: &AppConfig,
) -> Result<Box<dyn CompletionService>, Box<dyn std::error::Error>> {
    match name {
        "openai" => {
            let api_key = store.require_api_key()?;
            let endpoint = endpoint
                .map(str::to_string)
                .unwrap_or_else(|| config.openai.endpoint_or_default());
            let model = model
                .map(str::to_string)
                .unwrap_or_else(|| config.openai.model_or_default());
            let service = OpenAiService::new(&endpoint, &model, &api_key)
                .with_timeout_ms(config.openai.timeout_or_default());
            Ok(Box::new(service))
        }
        "heuristic" => Ok(Box::new(HeuristicService)),
        other => {
            Err(format!("Unknown service '{}' (expected heuristic or openai)", other).into())
        }
    }
}

fn build_tracer(config: &AppConfig) -> TraceLogger {
    if config.trace.enabled {
        TraceLogger::new(&config.trace.file)
    } else {
        TraceLogger::disabled()
    }
}
