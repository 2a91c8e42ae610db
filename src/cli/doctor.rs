//! `switchboard doctor` - manual connectivity smoke test.
//!
//! Validates the configured provider setup end to end: env file presence,
//! configuration load, credential presence, one live chat completion
//! against the fast model, and (with `--research`) one sample research
//! prompt against the smart model. Each check reports pass/fail with
//! actionable guidance; `--strict` exits non-zero when anything failed.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::{Provider, RuntimeConfig};
use crate::envfile::EnvFile;
use crate::llm::{ChatClient, ChatMessage, CompletionParams};

const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);
const RESEARCH_TIMEOUT: Duration = Duration::from_secs(300);

/// A sample report below this length is suspicious rather than a pass.
const MIN_REPORT_CHARS: usize = 200;

/// Doctor options.
#[derive(Debug, Clone, Default)]
pub struct DoctorOptions {
    /// Also run a sample end-to-end research prompt (slow, costs tokens).
    pub research: bool,
    /// Exit non-zero when any check fails.
    pub strict: bool,
    /// Env file path override (default: `./.env`).
    pub env_file: Option<PathBuf>,
}

enum CheckResult {
    Pass(String),
    Fail(String),
    Skip(String),
}

fn check(name: &str, result: CheckResult, passed: &mut u32, failed: &mut u32) {
    match result {
        CheckResult::Pass(detail) => {
            *passed += 1;
            println!("  [pass] {name}: {detail}");
        }
        CheckResult::Fail(detail) => {
            *failed += 1;
            println!("  [FAIL] {name}: {detail}");
        }
        CheckResult::Skip(reason) => {
            println!("  [skip] {name}: {reason}");
        }
    }
}

/// Run the smoke test.
pub async fn run(opts: &DoctorOptions) -> anyhow::Result<()> {
    println!("Switchboard Doctor");
    println!("==================\n");

    let mut passed = 0u32;
    let mut failed = 0u32;

    check(
        "Env file",
        check_env_file(&opts.env_file),
        &mut passed,
        &mut failed,
    );

    let config = RuntimeConfig::load();
    check(
        "Configuration",
        match &config {
            Ok(config) => CheckResult::Pass(format!(
                "fast={} smart={} strategic={}",
                config.fast_llm, config.smart_llm, config.strategic_llm
            )),
            Err(e) => CheckResult::Fail(e.to_string()),
        },
        &mut passed,
        &mut failed,
    );

    if let Ok(ref config) = config {
        for provider in config.providers() {
            check(
                &format!("{} credentials", provider.as_str()),
                check_credentials(config, provider),
                &mut passed,
                &mut failed,
            );
        }

        check(
            "OpenRouter rate limit",
            check_rate_limit(config),
            &mut passed,
            &mut failed,
        );

        check(
            "Chat completion",
            probe_completion(config).await,
            &mut passed,
            &mut failed,
        );

        if opts.research {
            check(
                "Sample research run",
                probe_research(config).await,
                &mut passed,
                &mut failed,
            );
        }
    } else if opts.research {
        check(
            "Sample research run",
            CheckResult::Skip("configuration did not load".to_string()),
            &mut passed,
            &mut failed,
        );
    }

    println!();
    println!("  {passed} passed, {failed} failed");

    if failed > 0 {
        println!("\n  Some checks failed. Run `switchboard switch` to reapply a preset,");
        println!("  then add any missing API keys to your env file.");
        if opts.strict {
            anyhow::bail!("doctor strict mode failed with {failed} check(s)");
        }
    } else {
        println!("\n  Your research agent is ready to use this provider setup.");
    }

    Ok(())
}

// ── Individual checks ───────────────────────────────────────

fn check_env_file(env_file: &Option<PathBuf>) -> CheckResult {
    let file = EnvFile::new(env_file.clone().unwrap_or_else(EnvFile::default_path));
    if file.exists() {
        CheckResult::Pass(format!("{}", file.path().display()))
    } else {
        CheckResult::Skip(format!(
            "{} not found; relying on the process environment",
            file.path().display()
        ))
    }
}

fn check_credentials(config: &RuntimeConfig, provider: Provider) -> CheckResult {
    let Some(var) = provider.api_key_var() else {
        return CheckResult::Pass("no API key required".to_string());
    };

    match config.api_key_for(provider) {
        Some(key) => CheckResult::Pass(format!("{var} found: {}", mask_api_key(&key))),
        None => CheckResult::Fail(format!(
            "{var} is unset or blank; add it to your env file"
        )),
    }
}

fn check_rate_limit(config: &RuntimeConfig) -> CheckResult {
    if !config.providers().contains(&Provider::OpenRouter) {
        return CheckResult::Skip("no OpenRouter models configured".to_string());
    }
    CheckResult::Pass(format!(
        "{} requests per second",
        config.openrouter_limit_rps
    ))
}

async fn probe_completion(config: &RuntimeConfig) -> CheckResult {
    let client = match ChatClient::new(COMPLETION_TIMEOUT) {
        Ok(client) => client,
        Err(e) => return CheckResult::Fail(format!("cannot construct HTTP client: {e}")),
    };

    let messages = [ChatMessage::user(
        "Hello! Please respond with 'connection successful' to confirm the API is working.",
    )];
    let params = CompletionParams {
        temperature: 0.3,
        max_tokens: 50,
    };

    match client
        .complete(config, &config.fast_llm, &messages, params)
        .await
    {
        Ok(text) => CheckResult::Pass(format!(
            "{} replied: {}",
            config.fast_llm,
            text.trim().lines().next().unwrap_or("").trim()
        )),
        Err(e) => CheckResult::Fail(format!("{} call failed: {e}", config.fast_llm)),
    }
}

async fn probe_research(config: &RuntimeConfig) -> CheckResult {
    println!("     Starting sample research run; this may take a few minutes...");

    let client = match ChatClient::new(RESEARCH_TIMEOUT) {
        Ok(client) => client,
        Err(e) => return CheckResult::Fail(format!("cannot construct HTTP client: {e}")),
    };

    let messages = [ChatMessage::user(
        "Write a brief research report (3-4 paragraphs with a short summary) on: \
         What are the latest developments in AI research?",
    )];
    let params = CompletionParams {
        temperature: 0.4,
        max_tokens: 1500,
    };

    match client
        .complete(config, &config.smart_llm, &messages, params)
        .await
    {
        Ok(report) => describe_report(&report),
        Err(e) => CheckResult::Fail(format!("{} research run failed: {e}", config.smart_llm)),
    }
}

fn describe_report(report: &str) -> CheckResult {
    let report = report.trim();
    if report.len() >= MIN_REPORT_CHARS {
        CheckResult::Pass(format!(
            "report of {} characters; preview: {}",
            report.len(),
            preview(report)
        ))
    } else {
        CheckResult::Fail(format!(
            "report seems short ({} characters)",
            report.len()
        ))
    }
}

fn preview(report: &str) -> String {
    let flat = report.split_whitespace().collect::<Vec<_>>().join(" ");
    let cut: String = flat.chars().take(120).collect();
    if cut.len() < flat.len() {
        format!("{cut}...")
    } else {
        cut
    }
}

fn mask_api_key(key: &str) -> String {
    let prefix: String = key.chars().take(8).collect();
    if key.chars().count() <= 8 {
        "*".repeat(key.chars().count())
    } else {
        format!("{prefix}...")
    }
}
