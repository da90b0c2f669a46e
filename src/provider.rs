//! Provider Detector (§4.3): derives the set of targeted AI-agent providers
//! from declared manifest metadata and filesystem evidence.
//!
//! The taxonomy is closed by design (§9): adding a provider is a code change,
//! not a data change, so detection stays a table lookup rather than an open
//! plugin surface.

use std::fmt;

/// A single entry in the closed provider taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Provider {
    Antigravity,
    Claude,
    Codex,
    Copilot,
    Cursor,
    Gemini,
    Generic,
    Windsurf,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Claude => "claude",
            Provider::Gemini => "gemini",
            Provider::Codex => "codex",
            Provider::Copilot => "copilot",
            Provider::Cursor => "cursor",
            Provider::Windsurf => "windsurf",
            Provider::Antigravity => "antigravity",
            Provider::Generic => "generic",
        }
    }

    pub fn parse(s: &str) -> Option<Provider> {
        match s {
            "claude" => Some(Provider::Claude),
            "gemini" => Some(Provider::Gemini),
            "codex" => Some(Provider::Codex),
            "copilot" => Some(Provider::Copilot),
            "cursor" => Some(Provider::Cursor),
            "windsurf" => Some(Provider::Windsurf),
            "antigravity" => Some(Provider::Antigravity),
            "generic" => Some(Provider::Generic),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct ProviderIndicators {
    provider: Provider,
    compat_keywords: &'static [&'static str],
    path_indicators: &'static [&'static str],
}

/// One row per provider: its compatibility-string keywords and its
/// filesystem path indicators. Path indicators ending in `/` are prefix
/// matches against directories; others are exact file matches.
const TAXONOMY: &[ProviderIndicators] = &[
    ProviderIndicators {
        provider: Provider::Claude,
        compat_keywords: &["claude"],
        path_indicators: &[".claude/", "CLAUDE.md"],
    },
    ProviderIndicators {
        provider: Provider::Gemini,
        compat_keywords: &["gemini"],
        path_indicators: &[".gemini/", "GEMINI.md"],
    },
    ProviderIndicators {
        provider: Provider::Codex,
        compat_keywords: &["codex", "openai"],
        path_indicators: &[".codex/", "AGENTS.md"],
    },
    ProviderIndicators {
        provider: Provider::Copilot,
        compat_keywords: &["copilot"],
        path_indicators: &[
            ".github/copilot-instructions.md",
            ".github/skills/",
            ".github/agents/",
        ],
    },
    ProviderIndicators {
        provider: Provider::Cursor,
        compat_keywords: &["cursor"],
        path_indicators: &[".cursor/", ".cursorrules"],
    },
    ProviderIndicators {
        provider: Provider::Windsurf,
        compat_keywords: &["windsurf", "codeium"],
        path_indicators: &[".windsurf/", ".windsurfrules"],
    },
    ProviderIndicators {
        provider: Provider::Antigravity,
        compat_keywords: &["antigravity"],
        path_indicators: &[".antigravity/"],
    },
];

fn normalize_member_path(path: &str) -> &str {
    let mut p = path;
    while let Some(stripped) = p.strip_prefix("./") {
        p = stripped;
    }
    p
}

fn path_matches(indicator: &str, normalized: &str) -> bool {
    if let Some(dir) = indicator.strip_suffix('/') {
        normalized.starts_with(indicator) || normalized == dir
    } else {
        normalized == indicator
    }
}

/// Detect the sorted, deduplicated set of providers targeted by a bundle.
///
/// `compatibility` is the manifest's optional `compatibility` string;
/// `member_paths` is the bundle's full list of archive member paths.
/// Returns `["generic"]` when neither source matches anything.
pub fn detect(compatibility: Option<&str>, member_paths: &[String]) -> Vec<String> {
    let mut hits: Vec<Provider> = Vec::new();

    if let Some(compat) = compatibility {
        let lower = compat.to_lowercase();
        for entry in TAXONOMY {
            if entry.compat_keywords.iter().any(|kw| lower.contains(kw)) {
                hits.push(entry.provider);
            }
        }
    }

    for path in member_paths {
        let normalized = normalize_member_path(path);
        for entry in TAXONOMY {
            if entry
                .path_indicators
                .iter()
                .any(|indicator| path_matches(indicator, normalized))
            {
                hits.push(entry.provider);
            }
        }
    }

    if hits.is_empty() {
        return vec![Provider::Generic.to_string()];
    }

    hits.sort();
    hits.dedup();
    hits.into_iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_union_is_generic() {
        assert_eq!(detect(None, &[]), vec!["generic".to_string()]);
    }

    #[test]
    fn compat_keyword_match() {
        assert_eq!(
            detect(Some("Designed for Claude Code"), &[]),
            vec!["claude".to_string()]
        );
    }

    #[test]
    fn compat_keyword_match_is_case_insensitive() {
        assert_eq!(detect(Some("CLAUDE"), &[]), vec!["claude".to_string()]);
    }

    #[test]
    fn codex_matches_openai_alias() {
        assert_eq!(detect(Some("built for OpenAI"), &[]), vec!["codex".to_string()]);
    }

    #[test]
    fn path_indicator_directory_prefix() {
        let paths = vec![".claude/settings.json".to_string()];
        assert_eq!(detect(None, &paths), vec!["claude".to_string()]);
    }

    #[test]
    fn path_indicator_exact_file() {
        let paths = vec!["CLAUDE.md".to_string()];
        assert_eq!(detect(None, &paths), vec!["claude".to_string()]);
    }

    #[test]
    fn path_indicator_strips_leading_dot_slash() {
        let paths = vec!["./CLAUDE.md".to_string()];
        assert_eq!(detect(None, &paths), vec!["claude".to_string()]);
    }

    #[test]
    fn union_of_compat_and_paths_is_sorted_and_deduped() {
        let paths = vec![".cursor/rules.json".to_string(), "CLAUDE.md".to_string()];
        assert_eq!(
            detect(Some("also works with Gemini"), &paths),
            vec!["claude".to_string(), "cursor".to_string(), "gemini".to_string()]
        );
    }

    #[test]
    fn detector_is_deterministic_under_path_shuffle() {
        let mut paths = vec![
            ".cursor/rules.json".to_string(),
            "CLAUDE.md".to_string(),
            ".windsurfrules".to_string(),
        ];
        let first = detect(None, &paths);
        paths.reverse();
        let second = detect(None, &paths);
        assert_eq!(first, second);
    }

    #[test]
    fn non_matching_directory_name_prefix_is_not_a_false_positive() {
        // ".cursorsettings" shares a prefix with ".cursor" but is not inside it.
        let paths = vec![".cursorsettings".to_string()];
        assert_eq!(detect(None, &paths), vec!["generic".to_string()]);
    }
}
