//! Bundle Extractor (§4.2): safely unpacks an untrusted `.tar.gz` into a
//! request-scoped temporary workspace.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use tempfile::TempDir;

use crate::error::BundleError;

/// The result of a successful extraction: a scoped temp directory (removed
/// on drop), the manifest's on-disk path, and the full normalized member list
/// handed to the Provider Detector.
pub struct ExtractedBundle {
    pub tmpdir: TempDir,
    pub manifest_path: PathBuf,
    pub member_paths: Vec<String>,
}

fn normalize(path: &str) -> String {
    let mut p = path;
    while let Some(stripped) = p.strip_prefix("./") {
        p = stripped;
    }
    p.to_string()
}

/// Reject a member whose resolved path would escape `root`.
fn safe_join(root: &Path, member_name: &str) -> Result<PathBuf, BundleError> {
    let joined = root.join(member_name);
    // The member doesn't exist on disk yet, so canonicalize its parent and
    // re-append the final component — real-path resolution without
    // requiring the target itself to exist.
    let parent = joined.parent().unwrap_or(root);
    fs::create_dir_all(parent).map_err(|e| BundleError::Io(e.to_string()))?;
    let canon_parent = parent
        .canonicalize()
        .map_err(|e| BundleError::Io(e.to_string()))?;
    let canon_root = root
        .canonicalize()
        .map_err(|e| BundleError::Io(e.to_string()))?;
    if !canon_parent.starts_with(&canon_root) {
        return Err(BundleError::PathTraversal(member_name.to_string()));
    }
    let file_name = joined
        .file_name()
        .ok_or_else(|| BundleError::PathTraversal(member_name.to_string()))?;
    Ok(canon_parent.join(file_name))
}

/// Extract `bytes` (a gzip-compressed tar) into a fresh temp workspace,
/// enforcing path-traversal and decompressed-size limits, then locate
/// `SKILL.md` at depth 0 or 1.
pub fn extract_bundle(bytes: &[u8], max_decompressed: u64) -> Result<ExtractedBundle, BundleError> {
    let tmpdir = tempfile::tempdir().map_err(|e| BundleError::Io(e.to_string()))?;
    let root = tmpdir.path();

    // First pass: validate every member's path and accumulate sizes before
    // writing anything, so a hostile archive can't exhaust disk first.
    let mut archive = Archive::new(GzDecoder::new(bytes));
    let entries = archive.entries().map_err(|_| BundleError::InvalidArchive)?;

    let mut member_paths = Vec::new();
    let mut total_size: u64 = 0;
    let mut validated: Vec<(PathBuf, Vec<u8>, bool)> = Vec::new();

    for entry in entries {
        let mut entry = entry.map_err(|_| BundleError::InvalidArchive)?;
        let header = entry.header().clone();
        let name = entry
            .path()
            .map_err(|_| BundleError::InvalidArchive)?
            .to_string_lossy()
            .into_owned();

        let target = safe_join(root, &name)?;
        member_paths.push(normalize(&name));

        let is_file = header.entry_type().is_file();
        let mut contents = Vec::new();
        if is_file {
            let size = header.size().map_err(|_| BundleError::InvalidArchive)?;
            total_size = total_size.saturating_add(size);
            if total_size > max_decompressed {
                return Err(BundleError::DecompressedTooLarge {
                    max: max_decompressed,
                });
            }
            entry
                .read_to_end(&mut contents)
                .map_err(|e| BundleError::Io(e.to_string()))?;
        }
        validated.push((target, contents, is_file));
    }

    // Second pass: only directory-creation and plain-file writes — no
    // device nodes, no symlinks, matching the "data" extraction filter.
    for (target, contents, is_file) in validated {
        if is_file {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| BundleError::Io(e.to_string()))?;
            }
            fs::write(&target, contents).map_err(|e| BundleError::Io(e.to_string()))?;
        } else {
            fs::create_dir_all(&target).map_err(|e| BundleError::Io(e.to_string()))?;
        }
    }

    let manifest_path = find_manifest(root)?;

    Ok(ExtractedBundle {
        tmpdir,
        manifest_path,
        member_paths,
    })
}

/// Search for `SKILL.md` at depth 0 or 1 relative to `root`.
fn find_manifest(root: &Path) -> Result<PathBuf, BundleError> {
    let direct = root.join("SKILL.md");
    if direct.is_file() {
        return Ok(direct);
    }

    let entries = fs::read_dir(root).map_err(|e| BundleError::Io(e.to_string()))?;
    for entry in entries {
        let entry = entry.map_err(|e| BundleError::Io(e.to_string()))?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            let candidate = entry.path().join("SKILL.md");
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    Err(BundleError::ManifestNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn make_tar_gz(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, contents) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *contents).unwrap();
        }
        let tar_bytes = builder.into_inner().unwrap();
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&tar_bytes).unwrap();
        encoder.finish().unwrap()
    }

    const MANIFEST: &[u8] =
        b"---\nname: \"test-skill\"\nversion: \"1.0.0\"\ndescription: \"d\"\nauthor: \"dev\"\n---\nbody\n";

    #[test]
    fn finds_manifest_at_root() {
        let bytes = make_tar_gz(&[("SKILL.md", MANIFEST)]);
        let extracted = extract_bundle(&bytes, 10_000_000).unwrap();
        assert!(extracted.manifest_path.ends_with("SKILL.md"));
        assert_eq!(extracted.member_paths, vec!["SKILL.md".to_string()]);
    }

    #[test]
    fn finds_manifest_one_level_deep() {
        let bytes = make_tar_gz(&[("my-skill/SKILL.md", MANIFEST)]);
        let extracted = extract_bundle(&bytes, 10_000_000).unwrap();
        assert!(extracted.manifest_path.ends_with("my-skill/SKILL.md"));
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let bytes = make_tar_gz(&[("README.md", b"hi")]);
        let err = extract_bundle(&bytes, 10_000_000).unwrap_err();
        assert_eq!(err, BundleError::ManifestNotFound);
    }

    #[test]
    fn invalid_gzip_stream_is_rejected() {
        let err = extract_bundle(b"not a gzip stream at all", 10_000_000).unwrap_err();
        assert_eq!(err, BundleError::InvalidArchive);
    }

    #[test]
    fn decompressed_size_limit_is_enforced() {
        let bytes = make_tar_gz(&[("SKILL.md", MANIFEST), ("big.bin", &vec![0u8; 1000])]);
        let err = extract_bundle(&bytes, 500).unwrap_err();
        assert!(err.to_string().contains("Decompressed"));
    }

    #[test]
    fn member_paths_are_normalized() {
        let bytes = make_tar_gz(&[("./SKILL.md", MANIFEST)]);
        let extracted = extract_bundle(&bytes, 10_000_000).unwrap();
        assert_eq!(extracted.member_paths, vec!["SKILL.md".to_string()]);
    }

    #[test]
    fn path_traversal_member_is_rejected() {
        let bytes = make_tar_gz(&[("../escape", b"evil")]);
        let err = extract_bundle(&bytes, 10_000_000).unwrap_err();
        assert!(err.to_string().contains("traversal"));
    }

    #[test]
    fn nested_directory_members_extract_cleanly() {
        let bytes = make_tar_gz(&[
            (".claude/settings.json", b"{}"),
            ("SKILL.md", MANIFEST),
        ]);
        let extracted = extract_bundle(&bytes, 10_000_000).unwrap();
        assert!(extracted.member_paths.contains(&".claude/settings.json".to_string()));
    }
}
