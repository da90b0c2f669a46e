//! Manifest Parser (§4.1): extracts and validates YAML frontmatter from `SKILL.md`.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::ManifestError;

/// A `SKILL.md` manifest, parsed and field-validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedManifest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub tags: Vec<String>,
    pub license: Option<String>,
    pub min_agent_version: Option<String>,
    pub compatibility: Option<String>,
    /// The Markdown body following the frontmatter block.
    pub body: String,
    /// The full frontmatter mapping, unknown keys preserved verbatim.
    pub metadata: BTreeMap<String, Value>,
}

/// Split a `SKILL.md` buffer into its YAML frontmatter and Markdown body.
///
/// Frontmatter is delimited by `---` lines at the very top of the file.
fn split_frontmatter(content: &str) -> Result<(&str, &str), ManifestError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
        .ok_or(ManifestError::MissingFrontmatter)?;

    // Scan line-by-line for a closing `---` (or `...`) delimiter.
    let mut end = None;
    let mut offset = 0usize;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed == "---" || trimmed == "..." {
            end = Some(offset);
            offset += line.len();
            break;
        }
        offset += line.len();
    }

    let close_at = end.ok_or(ManifestError::MissingFrontmatter)?;
    let frontmatter = &rest[..close_at];
    let body = rest.get(offset..).unwrap_or("");
    Ok((frontmatter, body.trim_start_matches(['\n', '\r'])))
}

fn validate_name(name: &str) -> Result<(), ManifestError> {
    if name.len() < 3 || name.len() > 64 {
        return Err(ManifestError::NameLength(name.len()));
    }
    if !name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(ManifestError::NameCharset);
    }
    if name.contains("--") {
        return Err(ManifestError::NameConsecutiveHyphens);
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(ManifestError::NameHyphenEdge);
    }
    Ok(())
}

fn validate_version(version: &str) -> Result<(), ManifestError> {
    semver::Version::parse(version)
        .map(|_| ())
        .map_err(|_| ManifestError::InvalidSemver(version.to_string()))
}

fn validate_description(description: &str) -> Result<(), ManifestError> {
    let len = description.chars().count();
    if len < 1 || len > 256 {
        return Err(ManifestError::DescriptionLength(len));
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<(), ManifestError> {
    if tags.len() > 10 {
        return Err(ManifestError::TooManyTags(tags.len()));
    }
    let tag_re_ok = |t: &str| {
        (1..=32).contains(&t.len())
            && t.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    };
    for tag in tags {
        if !tag_re_ok(tag) {
            return Err(ManifestError::InvalidTag(tag.clone()));
        }
    }
    Ok(())
}

fn as_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

/// Parse and validate a full `SKILL.md` buffer.
pub fn parse_manifest(content: &str) -> Result<ParsedManifest, ManifestError> {
    let (frontmatter, body) = split_frontmatter(content)?;

    let yaml_value: serde_yml::Value = serde_yml::from_str(frontmatter)
        .map_err(|e| ManifestError::InvalidYaml(e.to_string()))?;
    let json_value: Value = serde_json::to_value(&yaml_value)
        .map_err(|e| ManifestError::InvalidYaml(e.to_string()))?;
    let metadata: BTreeMap<String, Value> = match json_value {
        Value::Object(map) => map.into_iter().collect(),
        _ => return Err(ManifestError::InvalidYaml("frontmatter must be a mapping".to_string())),
    };

    let name = as_str(metadata.get("name")).ok_or(ManifestError::MissingName)?.to_string();
    validate_name(&name)?;

    let version = as_str(metadata.get("version"))
        .ok_or(ManifestError::MissingVersion)?
        .to_string();
    validate_version(&version)?;

    let description = as_str(metadata.get("description"))
        .ok_or(ManifestError::MissingDescription)?
        .to_string();
    validate_description(&description)?;

    let author = as_str(metadata.get("author")).ok_or(ManifestError::MissingAuthor)?.to_string();

    let tags: Vec<String> = match metadata.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    validate_tags(&tags)?;

    let license = as_str(metadata.get("license")).map(str::to_string);
    let min_agent_version = as_str(metadata.get("min_agent_version")).map(str::to_string);
    let compatibility = as_str(metadata.get("compatibility")).map(str::to_string);

    Ok(ParsedManifest {
        name,
        version,
        description,
        author,
        tags,
        license,
        min_agent_version,
        compatibility,
        body: body.to_string(),
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(name: &str, version: &str) -> String {
        format!(
            "---\nname: \"{name}\"\nversion: \"{version}\"\ndescription: \"a test skill\"\nauthor: \"dev\"\n---\n# Body\n"
        )
    }

    #[test]
    fn parses_minimal_manifest() {
        let m = parse_manifest(&minimal("test-skill", "1.0.0")).unwrap();
        assert_eq!(m.name, "test-skill");
        assert_eq!(m.version, "1.0.0");
        assert_eq!(m.description, "a test skill");
        assert_eq!(m.author, "dev");
        assert!(m.tags.is_empty());
        assert_eq!(m.body.trim(), "# Body");
    }

    #[test]
    fn preserves_unknown_frontmatter_keys() {
        let content = "---\nname: \"test-skill\"\nversion: \"1.0.0\"\ndescription: \"d\"\nauthor: \"dev\"\ncustom_field: \"keep me\"\n---\nbody\n";
        let m = parse_manifest(content).unwrap();
        assert_eq!(
            m.metadata.get("custom_field").and_then(Value::as_str),
            Some("keep me")
        );
    }

    #[test]
    fn rejects_missing_frontmatter() {
        let err = parse_manifest("# just markdown, no frontmatter\n").unwrap_err();
        assert_eq!(err, ManifestError::MissingFrontmatter);
    }

    #[test]
    fn name_too_short() {
        let err = parse_manifest(&minimal("ab", "1.0.0")).unwrap_err();
        assert!(err.to_string().contains("3-64"));
    }

    #[test]
    fn name_bad_charset() {
        let err = parse_manifest(&minimal("Test_Skill", "1.0.0")).unwrap_err();
        assert!(err.to_string().contains("[a-z0-9-]"));
    }

    #[test]
    fn name_consecutive_hyphens() {
        let err = parse_manifest(&minimal("test--skill", "1.0.0")).unwrap_err();
        assert!(err.to_string().contains("consecutive"));
    }

    #[test]
    fn name_leading_hyphen() {
        let err = parse_manifest(&minimal("-test-skill", "1.0.0")).unwrap_err();
        assert!(err.to_string().contains("hyphen"));
    }

    #[test]
    fn version_not_semver() {
        let err = parse_manifest(&minimal("test-skill", "1.0")).unwrap_err();
        assert!(err.to_string().contains("semver"));
    }

    #[test]
    fn description_too_long() {
        let long_desc = "a".repeat(257);
        let content = format!(
            "---\nname: \"test-skill\"\nversion: \"1.0.0\"\ndescription: \"{long_desc}\"\nauthor: \"dev\"\n---\nbody\n"
        );
        let err = parse_manifest(&content).unwrap_err();
        assert!(matches!(err, ManifestError::DescriptionLength(257)));
    }

    #[test]
    fn tags_over_limit() {
        let tags: Vec<String> = (0..11).map(|i| format!("tag{i}")).collect();
        let tags_yaml = tags
            .iter()
            .map(|t| format!("\"{t}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let content = format!(
            "---\nname: \"test-skill\"\nversion: \"1.0.0\"\ndescription: \"d\"\nauthor: \"dev\"\ntags: [{tags_yaml}]\n---\nbody\n"
        );
        let err = parse_manifest(&content).unwrap_err();
        assert!(matches!(err, ManifestError::TooManyTags(11)));
    }

    #[test]
    fn tag_bad_charset() {
        let content = "---\nname: \"test-skill\"\nversion: \"1.0.0\"\ndescription: \"d\"\nauthor: \"dev\"\ntags: [\"Bad Tag!\"]\n---\nbody\n";
        let err = parse_manifest(content).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidTag(_)));
    }

    #[test]
    fn optional_fields_pass_through() {
        let content = "---\nname: \"test-skill\"\nversion: \"1.0.0\"\ndescription: \"d\"\nauthor: \"dev\"\nlicense: \"MIT\"\ncompatibility: \"Designed for Claude Code\"\n---\nbody\n";
        let m = parse_manifest(content).unwrap();
        assert_eq!(m.license.as_deref(), Some("MIT"));
        assert_eq!(m.compatibility.as_deref(), Some("Designed for Claude Code"));
        assert_eq!(m.min_agent_version, None);
    }

    #[test]
    fn frontmatter_roundtrip_preserves_metadata() {
        let content = minimal("roundtrip-skill", "2.1.0");
        let first = parse_manifest(&content).unwrap();
        let second = parse_manifest(&content).unwrap();
        assert_eq!(first.metadata, second.metadata);
    }
}
