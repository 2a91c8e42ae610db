//! `switchboard switch` - apply a provider preset to the env file.
//!
//! Interactive flow: list presets with readiness status, take a numbered
//! selection (re-prompting on invalid input), confirm when credentials are
//! missing, then back up and rewrite the env file. `--preset`/`--yes` skip
//! the menu for scripted use. `switchboard check` reuses the same status
//! listing without mutating anything.

use std::path::PathBuf;

use crate::cli::prompts::{
    self, Selection, confirm, input, print_error, print_header, print_info, print_success,
};
use crate::envfile::EnvFile;
use crate::presets::{self, Preset};

/// Options for the switch flow.
#[derive(Debug, Clone, Default)]
pub struct SwitchOptions {
    /// Apply this preset id directly instead of showing the menu.
    pub preset: Option<String>,
    /// Skip the missing-credentials confirmation.
    pub yes: bool,
    /// Env file path override (default: `./.env`).
    pub env_file: Option<PathBuf>,
}

fn env_file_from(path: &Option<PathBuf>) -> EnvFile {
    EnvFile::new(path.clone().unwrap_or_else(EnvFile::default_path))
}

/// Missing required keys for one preset against the current file content.
/// A file that does not exist yet reports nothing missing.
fn missing_keys_for(file: &EnvFile, preset: &Preset) -> anyhow::Result<Vec<String>> {
    Ok(file.missing_keys(&preset.required_keys)?)
}

fn print_catalog(file: &EnvFile, catalog: &[Preset]) -> anyhow::Result<()> {
    println!("\nAvailable configurations:");
    for (i, preset) in catalog.iter().enumerate() {
        let missing = missing_keys_for(file, preset)?;
        let status = if missing.is_empty() {
            "ready".to_string()
        } else {
            format!("missing keys: {}", missing.join(", "))
        };
        println!("{:2}. {} - {}", i + 1, preset.name, status);
        println!("     {}", preset.description);
        println!();
    }
    Ok(())
}

/// `switchboard check`: print preset readiness and exit.
pub fn run_check(catalog: &[Preset], env_file: &Option<PathBuf>) -> anyhow::Result<()> {
    let file = env_file_from(env_file);
    print_header("Provider preset readiness");
    if !file.exists() {
        print_info(&format!(
            "No env file at {}; switching will create one from scratch.",
            file.path().display()
        ));
    }
    print_catalog(&file, catalog)
}

/// `switchboard switch`: interactive or scripted preset application.
pub fn run(catalog: &[Preset], opts: &SwitchOptions) -> anyhow::Result<()> {
    let file = env_file_from(&opts.env_file);

    if let Some(ref id) = opts.preset {
        let preset = presets::find(catalog, id)
            .ok_or_else(|| anyhow::anyhow!("unknown preset '{id}' (see `switchboard check`)"))?;
        apply(&file, preset, opts.yes)?;
        return Ok(());
    }

    print_header("LLM provider configuration switcher");
    print_catalog(&file, catalog)?;

    loop {
        let prompt = format!("Select configuration (1-{}) or 'q' to quit: ", catalog.len());
        let Some(raw) = input(&prompt)? else {
            println!("\nGoodbye!");
            return Ok(());
        };

        match prompts::parse_selection(&raw, catalog.len()) {
            Selection::Quit => {
                println!("Goodbye!");
                return Ok(());
            }
            Selection::Invalid => {
                print_error("Invalid choice. Please enter a number or 'q'.");
            }
            Selection::Pick(idx) => {
                if apply(&file, &catalog[idx], false)? {
                    return Ok(());
                }
                // User declined the missing-credentials warning; back to menu.
            }
        }
    }
}

fn apply(file: &EnvFile, preset: &Preset, assume_yes: bool) -> anyhow::Result<bool> {
    let missing = missing_keys_for(file, preset)?;

    if !missing.is_empty() && !assume_yes {
        println!();
        print_error(&format!(
            "Warning: missing required API keys: {}",
            missing.join(", ")
        ));
        print_info("You'll need to add these to your env file manually.");
        if !confirm("Continue anyway?")? {
            return Ok(false);
        }
    }

    if let Some(backup) = file.backup()? {
        print_success(&format!("Created backup: {}", backup.display()));
    }

    print_info(&format!("Applying {}...", preset.name));
    let entries = preset.entries.iter().copied();
    // Backup already taken above; write through the document directly.
    let mut doc = file.load()?;
    doc.upsert_all(entries);
    file.save(&doc)?;
    tracing::debug!(preset = preset.id, path = %file.path().display(), "preset applied");
    print_success("Configuration updated successfully!");

    println!();
    print_success(&format!("Successfully configured for {}!", preset.name));
    if !missing.is_empty() {
        println!("\nDon't forget to add your API key(s):");
        for key in &missing {
            println!("   {key}=your_key_here");
        }
    }
    println!("\nTest your configuration with: switchboard doctor");

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::catalog;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn options(dir: &tempfile::TempDir, preset: &str) -> SwitchOptions {
        SwitchOptions {
            preset: Some(preset.to_string()),
            yes: true,
            env_file: Some(dir.path().join(".env")),
        }
    }

    #[test]
    fn scripted_switch_applies_preset_and_backs_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "# keep me\nFAST_LLM=old\nTAVILY_API_KEY=t\n").unwrap();

        let catalog = catalog();
        run(&catalog, &options(&dir, "openai")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "# keep me\nFAST_LLM=openai:gpt-4o-mini\nTAVILY_API_KEY=t\nSMART_LLM=openai:gpt-4o\nSTRATEGIC_LLM=openai:o1-mini\n"
        );

        let backup = std::fs::read_to_string(dir.path().join(".env.backup")).unwrap();
        assert_eq!(backup, "# keep me\nFAST_LLM=old\nTAVILY_API_KEY=t\n");
    }

    #[test]
    fn scripted_switch_creates_env_file_when_absent() {
        let dir = tempdir().unwrap();
        let catalog = catalog();
        run(&catalog, &options(&dir, "ollama")).unwrap();

        let content = std::fs::read_to_string(dir.path().join(".env")).unwrap();
        assert!(content.starts_with("FAST_LLM=ollama:llama3\n"));
        assert!(content.contains("OLLAMA_BASE_URL=http://localhost:11434\n"));
        assert!(!dir.path().join(".env.backup").exists());
    }

    #[test]
    fn scripted_switch_rejects_unknown_preset() {
        let dir = tempdir().unwrap();
        let catalog = catalog();
        let err = run(&catalog, &options(&dir, "nope")).unwrap_err();
        assert!(err.to_string().contains("unknown preset"));
        assert!(!dir.path().join(".env").exists());
    }

    #[test]
    fn absent_env_file_reports_nothing_missing() {
        let dir = tempdir().unwrap();
        let catalog = catalog();
        let file = EnvFile::new(dir.path().join(".env"));
        let openrouter = presets::find(&catalog, "openrouter").unwrap();

        assert!(missing_keys_for(&file, openrouter).unwrap().is_empty());
    }

    #[test]
    fn switch_on_fresh_directory_needs_no_confirmation() {
        // With no file there is nothing to inspect, so the scripted path
        // must not stop at the missing-credentials prompt even without
        // --yes.
        let dir = tempdir().unwrap();
        let catalog = catalog();
        let opts = SwitchOptions {
            preset: Some("openrouter".to_string()),
            yes: false,
            env_file: Some(dir.path().join(".env")),
        };

        run(&catalog, &opts).unwrap();

        let content = std::fs::read_to_string(dir.path().join(".env")).unwrap();
        assert!(content.starts_with("FAST_LLM=openrouter:anthropic/claude-3.5-haiku\n"));
    }

    #[test]
    fn missing_keys_reflect_current_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "OPENROUTER_API_KEY=sk-or-123\n").unwrap();

        let catalog = catalog();
        let file = EnvFile::new(&path);
        let openrouter = presets::find(&catalog, "openrouter").unwrap();
        let anthropic = presets::find(&catalog, "anthropic").unwrap();

        assert!(missing_keys_for(&file, openrouter).unwrap().is_empty());
        assert_eq!(
            missing_keys_for(&file, anthropic).unwrap(),
            vec!["ANTHROPIC_API_KEY"]
        );
    }
}
