use crate::error::{CollectorError, Result};
use crate::file_source::FileSource;
use crate::source::{PairIter, PairSource};
use ignore::WalkBuilder;
use std::io;
use std::path::{Path, PathBuf};

const DATASET_EXTENSIONS: &[&str] = &["json", "jsonl", "ndjson"];

/// A `name=path` or bare `path` source argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub name: Option<String>,
    pub path: PathBuf,
}

impl SourceSpec {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CollectorError::invalid_source("empty source argument"));
        }
        if let Some((name, path)) = raw.split_once('=') {
            let name = name.trim();
            let path = path.trim();
            if name.is_empty() || path.is_empty() {
                return Err(CollectorError::invalid_source(format!(
                    "expected NAME=PATH, got '{raw}'"
                )));
            }
            return Ok(Self {
                name: Some(name.to_string()),
                path: PathBuf::from(path),
            });
        }
        Ok(Self {
            name: None,
            path: PathBuf::from(raw),
        })
    }
}

/// Finds dataset files under a directory (.gitignore aware, sorted).
pub struct SourceScanner {
    root: PathBuf,
}

impl SourceScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .require_git(false);

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }
                    let path = entry.path();
                    if Self::is_dataset_file(path) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort();
        log::info!(
            "Found {} dataset files under {}",
            files.len(),
            self.root.display()
        );
        files
    }

    fn is_dataset_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_ascii_lowercase();
                DATASET_EXTENSIONS.iter().any(|candidate| *candidate == ext)
            })
    }
}

/// A path that does not exist; it fails on open like any unreachable source.
struct MissingSource {
    name: String,
    path: PathBuf,
}

impl MissingSource {
    fn new(spec: &SourceSpec) -> Self {
        let name = spec.name.clone().unwrap_or_else(|| match spec.path.file_stem() {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => spec.path.display().to_string(),
        });
        Self {
            name,
            path: spec.path.clone(),
        }
    }
}

impl PairSource for MissingSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn pairs(&self, _max_take: usize) -> Result<PairIter<'_>> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", self.path.display()),
        )
        .into())
    }
}

/// Resolve source arguments into readers, expanding directories.
///
/// A named directory gives every file inside it the same source name. A path
/// that does not exist becomes a source that fails on open, so the build
/// warns and continues; an existing file that is not JSON/JSONL is an error.
pub fn open_sources(specs: &[SourceSpec]) -> Result<Vec<Box<dyn PairSource>>> {
    let mut sources: Vec<Box<dyn PairSource>> = Vec::new();
    for spec in specs {
        if !spec.path.exists() {
            log::warn!("Source {} does not exist", spec.path.display());
            sources.push(Box::new(MissingSource::new(spec)));
            continue;
        }
        if spec.path.is_dir() {
            let files = SourceScanner::new(&spec.path).scan();
            if files.is_empty() {
                log::warn!("No dataset files under {}", spec.path.display());
            }
            for file in files {
                let source = match &spec.name {
                    Some(name) => FileSource::new(name.clone(), &file)?,
                    None => FileSource::from_path(&file)?,
                };
                sources.push(Box::new(source));
            }
            continue;
        }

        let source = match &spec.name {
            Some(name) => FileSource::new(name.clone(), &spec.path)?,
            None => FileSource::from_path(&spec.path)?,
        };
        sources.push(Box::new(source));
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_named_and_bare_specs() {
        assert_eq!(
            SourceSpec::parse("alpaca=data/alpaca.jsonl").unwrap(),
            SourceSpec {
                name: Some("alpaca".to_string()),
                path: PathBuf::from("data/alpaca.jsonl"),
            }
        );
        assert_eq!(
            SourceSpec::parse(" data/dolly.json ").unwrap(),
            SourceSpec {
                name: None,
                path: PathBuf::from("data/dolly.json"),
            }
        );
        assert!(SourceSpec::parse("").is_err());
        assert!(SourceSpec::parse("=x.jsonl").is_err());
        assert!(SourceSpec::parse("name=").is_err());
    }

    #[test]
    fn scan_finds_sorted_dataset_files() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::write(root.join("b.jsonl"), "").unwrap();
        fs::write(root.join("a.json"), "[]").unwrap();
        fs::write(root.join("nested/c.jsonl"), "").unwrap();
        fs::write(root.join("readme.md"), "#").unwrap();
        fs::write(root.join(".hidden.jsonl"), "").unwrap();

        let files = SourceScanner::new(root).scan();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.json", "b.jsonl", "nested/c.jsonl"]);
    }

    #[test]
    fn open_sources_expands_directories() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::write(root.join("one.jsonl"), "").unwrap();
        fs::write(root.join("two.jsonl"), "").unwrap();

        let specs = vec![
            SourceSpec {
                name: None,
                path: root.to_path_buf(),
            },
            SourceSpec {
                name: Some("pinned".to_string()),
                path: root.join("one.jsonl"),
            },
        ];
        let sources = open_sources(&specs).unwrap();
        let names: Vec<_> = sources.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["one", "two", "pinned"]);
    }

    #[test]
    fn missing_paths_fail_on_open_instead_of_aborting() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::write(root.join("notes.txt"), "hello").unwrap();

        let specs = vec![
            SourceSpec {
                name: None,
                path: root.join("data/alpaca"),
            },
            SourceSpec {
                name: Some("dolly".to_string()),
                path: root.join("dolly.jsonl"),
            },
        ];
        let sources = open_sources(&specs).unwrap();
        let names: Vec<_> = sources.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["alpaca", "dolly"]);
        assert!(sources.iter().all(|source| source.pairs(10).is_err()));

        let existing = vec![SourceSpec {
            name: None,
            path: root.join("notes.txt"),
        }];
        assert!(open_sources(&existing).is_err());
    }
}
