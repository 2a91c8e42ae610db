//! Provider preset catalog.
//!
//! Each preset bundles the `FAST_LLM`/`SMART_LLM`/`STRATEGIC_LLM` settings
//! (plus provider-specific extras) for one way of running the research
//! agent. The values are opaque to this tool; the agent's own configuration
//! loader interprets them.

/// A named bundle of configuration entries for one provider setup.
#[derive(Debug, Clone)]
pub struct Preset {
    /// Unique catalog identifier, usable with `switch --preset <id>`.
    pub id: &'static str,
    /// Human-readable display name.
    pub name: &'static str,
    /// Entries applied to the env file, in order.
    pub entries: Vec<(&'static str, &'static str)>,
    /// Credential keys that must carry a non-empty value for this preset
    /// to actually work.
    pub required_keys: Vec<&'static str>,
    pub description: &'static str,
}

/// Build the catalog of available presets.
///
/// Constructed once at startup and passed to whatever needs it; there is no
/// module-level mutable state.
pub fn catalog() -> Vec<Preset> {
    vec![
        Preset {
            id: "openrouter",
            name: "OpenRouter (Latest Anthropic)",
            entries: vec![
                ("FAST_LLM", "openrouter:anthropic/claude-3.5-haiku"),
                ("SMART_LLM", "openrouter:anthropic/claude-sonnet-4"),
                ("STRATEGIC_LLM", "openrouter:anthropic/claude-opus-4.1"),
                ("OPENROUTER_LIMIT_RPS", "2.0"),
            ],
            required_keys: vec!["OPENROUTER_API_KEY"],
            description:
                "Uses OpenRouter with the latest Anthropic models (Opus 4.1, Sonnet 4, Haiku 3.5).",
        },
        Preset {
            id: "openrouter_budget",
            name: "OpenRouter (Budget)",
            entries: vec![
                ("FAST_LLM", "openrouter:anthropic/claude-3-haiku"),
                ("SMART_LLM", "openrouter:anthropic/claude-3.5-sonnet"),
                ("STRATEGIC_LLM", "openrouter:anthropic/claude-3.7-sonnet"),
                ("OPENROUTER_LIMIT_RPS", "1.0"),
            ],
            required_keys: vec!["OPENROUTER_API_KEY"],
            description:
                "Cost-optimized OpenRouter configuration with older but reliable Anthropic models.",
        },
        Preset {
            id: "openrouter_premium",
            name: "OpenRouter (Premium)",
            entries: vec![
                ("FAST_LLM", "openrouter:anthropic/claude-sonnet-4"),
                ("SMART_LLM", "openrouter:anthropic/claude-opus-4"),
                ("STRATEGIC_LLM", "openrouter:anthropic/claude-opus-4.1"),
                ("OPENROUTER_LIMIT_RPS", "2.0"),
            ],
            required_keys: vec!["OPENROUTER_API_KEY"],
            description:
                "High-performance OpenRouter configuration with the absolute latest Anthropic models.",
        },
        Preset {
            id: "openai",
            name: "OpenAI (Direct)",
            entries: vec![
                ("FAST_LLM", "openai:gpt-4o-mini"),
                ("SMART_LLM", "openai:gpt-4o"),
                ("STRATEGIC_LLM", "openai:o1-mini"),
            ],
            required_keys: vec!["OPENAI_API_KEY"],
            description: "Direct OpenAI API access with their latest models.",
        },
        Preset {
            id: "ollama",
            name: "Ollama (Local)",
            entries: vec![
                ("FAST_LLM", "ollama:llama3"),
                ("SMART_LLM", "ollama:llama3"),
                ("STRATEGIC_LLM", "ollama:llama3"),
                ("OLLAMA_BASE_URL", "http://localhost:11434"),
            ],
            required_keys: vec![],
            description: "Local Ollama models (requires Ollama to be running locally).",
        },
        Preset {
            id: "anthropic",
            name: "Anthropic (Direct)",
            entries: vec![
                ("FAST_LLM", "anthropic:claude-3-haiku-20240307"),
                ("SMART_LLM", "anthropic:claude-3-5-sonnet-20241022"),
                ("STRATEGIC_LLM", "anthropic:claude-3-opus-20240229"),
            ],
            required_keys: vec!["ANTHROPIC_API_KEY"],
            description: "Direct Anthropic API access with Claude models.",
        },
    ]
}

/// Find a preset by catalog id.
pub fn find<'a>(catalog: &'a [Preset], id: &str) -> Option<&'a Preset> {
    catalog.iter().find(|preset| preset.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        let catalog = catalog();
        let mut ids: Vec<_> = catalog.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn every_preset_sets_the_model_triple() {
        for preset in catalog() {
            for key in ["FAST_LLM", "SMART_LLM", "STRATEGIC_LLM"] {
                assert!(
                    preset.entries.iter().any(|(k, _)| *k == key),
                    "{} is missing {key}",
                    preset.id
                );
            }
        }
    }

    #[test]
    fn entry_keys_are_unique_within_a_preset() {
        for preset in catalog() {
            let mut keys: Vec<_> = preset.entries.iter().map(|(k, _)| *k).collect();
            keys.sort_unstable();
            keys.dedup();
            assert_eq!(keys.len(), preset.entries.len(), "{}", preset.id);
        }
    }

    #[test]
    fn find_resolves_known_and_unknown_ids() {
        let catalog = catalog();
        assert_eq!(find(&catalog, "ollama").map(|p| p.name), Some("Ollama (Local)"));
        assert!(find(&catalog, "nope").is_none());
    }

    #[test]
    fn ollama_needs_no_credentials() {
        let catalog = catalog();
        assert!(find(&catalog, "ollama").unwrap().required_keys.is_empty());
    }
}
