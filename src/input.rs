//! Parsers for the three input files of spec.md §6: the roots file, the
//! exclusion file, and the UID/GID mapping file. Treated by the spec as
//! external collaborators whose only contract with the core is the data they
//! deliver — so their grammars are implemented plainly, without trying to be
//! anything more than what spec.md §6 describes.

use crate::exclude::ExclusionFilter;
use crate::logging::Logger;
use crate::mapping::IdMapping;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

fn read_lines(path: &Path) -> std::io::Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents.lines().map(str::to_owned).collect())
}

/// Loads one absolute path per line. Blank and `#` lines are ignored;
/// duplicates are warned and dropped, keeping the first occurrence.
pub fn load_roots(path: &Path, logger: &Logger) -> std::io::Result<Vec<PathBuf>> {
    let mut roots = Vec::new();
    for raw in read_lines(path)? {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let candidate = PathBuf::from(line);
        if roots.contains(&candidate) {
            logger.warning(&format!("duplicate root ignored: {line}"));
            continue;
        }
        roots.push(candidate);
    }
    Ok(roots)
}

/// Loads one basename/path per line, matched later by byte equality against a
/// directory entry's basename.
pub fn load_exclusions(path: &Path, logger: &Logger) -> std::io::Result<ExclusionFilter> {
    let mut entries: Vec<Box<OsStr>> = Vec::new();
    for raw in read_lines(path)? {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let candidate: Box<OsStr> = Box::from(OsStr::new(line));
        if entries.iter().any(|e| e.as_ref() == candidate.as_ref()) {
            logger.warning(&format!("duplicate exclusion ignored: {line}"));
            continue;
        }
        entries.push(candidate);
    }
    Ok(ExclusionFilter::new(entries))
}

/// Parses a `u:<old> <new>` / `g:<old> <new>` mapping file (spec.md §6).
///
/// Tag recognition is case-insensitive; the separator between old and new ids
/// is any run of whitespace or commas. Malformed lines are logged as
/// `WARNING` and skipped rather than failing the whole load.
pub fn load_mapping(
    path: &Path,
    logger: &Logger,
) -> std::io::Result<(IdMapping, IdMapping)> {
    let mut uid_map = IdMapping::default();
    let mut gid_map = IdMapping::default();

    for (lineno, raw) in read_lines(path)?.into_iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((tag, rest)) = line.split_once(':') else {
            logger.warning(&format!("malformed mapping line {}: {line}", lineno + 1));
            continue;
        };

        let fields: Vec<&str> = rest
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .collect();

        let (Some(old_raw), Some(new_raw)) = (fields.first(), fields.get(1)) else {
            logger.warning(&format!("malformed mapping line {}: {line}", lineno + 1));
            continue;
        };

        let (Ok(old), Ok(new)) = (old_raw.parse::<u32>(), new_raw.parse::<u32>()) else {
            logger.warning(&format!("malformed mapping line {}: {line}", lineno + 1));
            continue;
        };

        match tag.to_ascii_lowercase().as_str() {
            "u" => {
                if !uid_map.try_insert(old, new) {
                    logger.warning(&format!("duplicate uid mapping for {old}, keeping first"));
                }
            }
            "g" => {
                if !gid_map.try_insert(old, new) {
                    logger.warning(&format!("duplicate gid mapping for {old}, keeping first"));
                }
            }
            _ => {
                logger.warning(&format!("malformed mapping line {}: {line}", lineno + 1));
            }
        }
    }

    Ok((uid_map, gid_map))
}
