//! Runs one rebase from the command line.

use crate::cli::Args;
use crate::config::RebaseConfig;
use crate::error::CliError;
use crate::output::format_report;
use camino::{Utf8Path, Utf8PathBuf};
use css_rebaser::{RebaseOptions, Rebaser};
use std::io::Write;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// What a run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Number of rewritten references.
    pub rebased: usize,
    /// Whether a source map was written.
    pub map_written: bool,
}

/// Rebases the input named by `args` and writes the outputs.
pub async fn run(args: Args) -> Result<Summary, CliError> {
    let cwd = std::env::current_dir()
        .ok()
        .and_then(|dir| Utf8PathBuf::try_from(dir).ok())
        .ok_or(CliError::WorkingDir)?;
    run_in(args, &cwd).await
}

/// Like [`run`], resolving relative paths against `cwd`.
pub async fn run_in(args: Args, cwd: &Utf8Path) -> Result<Summary, CliError> {
    let config = RebaseConfig::load(args.config.as_deref(), cwd)?;
    debug!(?config, "loaded config");

    let input = cwd.join(&args.input);
    let css = read_to_string(&input).await?;

    let map_output = match (&args.map_output, &args.output) {
        (Some(path), _) => Some(cwd.join(path)),
        (None, Some(output)) if config.emit_map == Some(true) => {
            Some(cwd.join(format!("{output}.map")))
        }
        (None, None) if config.emit_map == Some(true) => {
            warn!("emitMap is set but the stylesheet goes to stdout; no map written");
            None
        }
        _ => None,
    };

    let options = RebaseOptions {
        emit_map: map_output.is_some(),
        base_dir: args
            .base_dir
            .as_ref()
            .map(|dir| cwd.join(dir))
            .or(config.base_dir.clone())
            .or_else(|| Some(cwd.to_path_buf())),
    };
    let policy = config
        .policy()
        .map_err(|e| CliError::Rebase(e.into()))?;

    let mut rebaser = Rebaser::new().with_policy(policy).with_options(options);
    if let Some(map) = &args.map {
        let path = cwd.join(map);
        let json = tokio::fs::read(&path)
            .await
            .map_err(|source| CliError::Read { path, source })?;
        rebaser = rebaser.with_map_json(&json).map_err(CliError::Rebase)?;
    }

    let result = rebaser
        .rebase(&css)
        .await
        .map_err(|e| CliError::rebase(e, &input, &css))?;

    // Nothing is written unless every output is ready.
    let map_json = match &map_output {
        Some(_) => result.map_json().map_err(CliError::Rebase)?,
        None => None,
    };
    let staged_map = match (&map_output, &map_json) {
        (Some(path), Some(json)) => Some(Staged::new(path, json.as_bytes())?),
        _ => None,
    };
    let staged_css = match &args.output {
        Some(output) => Some(Staged::new(&cwd.join(output), result.css.as_bytes())?),
        None => None,
    };

    match staged_css {
        Some(staged) => staged.commit()?,
        None => write_stdout(result.css.as_bytes())
            .await
            .map_err(|source| CliError::Write {
                path: Utf8PathBuf::from("<stdout>"),
                source,
            })?,
    }
    let map_written = match staged_map {
        Some(staged) => {
            staged.commit()?;
            true
        }
        None => false,
    };

    eprint!("{}", format_report(&result.rebases, args.report));

    Ok(Summary {
        rebased: result.rebases.len(),
        map_written,
    })
}

async fn read_to_string(path: &Utf8Path) -> Result<String, CliError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })
}

async fn write_stdout(contents: &[u8]) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(contents).await?;
    stdout.flush().await
}

/// An output written to a temporary file next to its destination.
struct Staged {
    file: NamedTempFile,
    path: Utf8PathBuf,
}

impl Staged {
    fn new(path: &Utf8Path, contents: &[u8]) -> Result<Self, CliError> {
        let write_error = |source| CliError::Write {
            path: path.to_path_buf(),
            source,
        };
        let dir = path
            .parent()
            .filter(|dir| !dir.as_str().is_empty())
            .unwrap_or(Utf8Path::new("."));

        let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
        file.write_all(contents).map_err(write_error)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Moves the staged file into place.
    fn commit(self) -> Result<(), CliError> {
        self.file
            .persist(&self.path)
            .map_err(|e| CliError::Write {
                path: self.path.clone(),
                source: e.error,
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ReportFormat;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::fs;

    const CSS: &str = ".btn{background:url(../img/a.png)}\n.icon{mask:url(#m)}\n";
    const MAP: &str = r#"{"version":3,"sources":["src/components/button.scss"],"names":[],"mappings":"AAAA;AACA"}"#;

    fn project() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        fs::write(root.join("app.css"), CSS).unwrap();
        fs::write(root.join("app.css.map"), MAP).unwrap();
        (dir, root)
    }

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["css-rebaser", "app.css", "--map", "app.css.map"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[tokio::test]
    async fn test_writes_rebased_stylesheet() {
        let (_dir, root) = project();
        let summary = run_in(args(&["-o", "out.css"]), &root).await.unwrap();

        assert_eq!(
            summary,
            Summary {
                rebased: 1,
                map_written: false,
            }
        );
        assert_eq!(
            fs::read_to_string(root.join("out.css")).unwrap(),
            ".btn{background:url(src/img/a.png)}\n.icon{mask:url(#m)}\n"
        );
        assert!(!root.join("out.css.map").exists());
    }

    #[tokio::test]
    async fn test_absolute_sources_are_relative_to_working_directory() {
        let (_dir, root) = project();
        let map = format!(
            r#"{{"version":3,"sources":["{root}/src/components/button.scss"],"names":[],"mappings":"AAAA;AACA"}}"#
        );
        fs::write(root.join("app.css.map"), map).unwrap();

        let summary = run_in(args(&["-o", "out.css"]), &root).await.unwrap();
        assert_eq!(summary.rebased, 1);
        assert_eq!(
            fs::read_to_string(root.join("out.css")).unwrap(),
            ".btn{background:url(src/img/a.png)}\n.icon{mask:url(#m)}\n"
        );
    }

    #[tokio::test]
    async fn test_writes_projected_map() {
        let (_dir, root) = project();
        let summary = run_in(
            args(&["-o", "out.css", "--map-output", "maps/out.css.map"]),
            &root,
        )
        .await;
        // The map directory does not exist yet, so nothing is written.
        assert!(matches!(summary, Err(CliError::Write { .. })));
        assert!(!root.join("out.css").exists());

        fs::create_dir(root.join("maps")).unwrap();
        let summary = run_in(
            args(&["-o", "out.css", "--map-output", "maps/out.css.map"]),
            &root,
        )
        .await
        .unwrap();
        assert!(summary.map_written);

        let map: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(root.join("maps/out.css.map")).unwrap())
                .unwrap();
        assert_eq!(map["sources"][0], "src/components/button.scss");
    }

    #[tokio::test]
    async fn test_config_drives_policy_and_map() {
        let (_dir, root) = project();
        fs::write(
            root.join("css-rebase.json"),
            r#"{ "emitMap": true, "rewrites": [{ "from": "src/", "to": "/static/" }] }"#,
        )
        .unwrap();

        let summary = run_in(args(&["-o", "out.css", "--report", "json"]), &root)
            .await
            .unwrap();
        assert_eq!(summary.rebased, 1);
        assert!(summary.map_written);
        assert!(root.join("out.css.map").is_file());
        assert_eq!(
            fs::read_to_string(root.join("out.css")).unwrap(),
            ".btn{background:url(/static/img/a.png)}\n.icon{mask:url(#m)}\n"
        );
    }

    #[tokio::test]
    async fn test_excluded_references_are_kept() {
        let (_dir, root) = project();
        fs::write(root.join("rules.json"), r#"{ "exclude": ["**/*.png"] }"#).unwrap();

        let summary = run_in(args(&["-o", "out.css", "-c", "rules.json"]), &root)
            .await
            .unwrap();
        assert_eq!(summary.rebased, 0);
        assert_eq!(fs::read_to_string(root.join("out.css")).unwrap(), CSS);
    }

    #[tokio::test]
    async fn test_missing_map_fails() {
        let (_dir, root) = project();
        let args = Args::parse_from(["css-rebaser", "app.css", "-o", "out.css"]);
        assert_eq!(args.report, ReportFormat::Human);

        let err = run_in(args, &root).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Rebase(css_rebaser::RebaseError::MissingSourceMap)
        ));
        assert!(!root.join("out.css").exists());
    }

    #[tokio::test]
    async fn test_parse_failure_carries_source() {
        let (_dir, root) = project();
        fs::write(root.join("app.css"), ".a{background:url(x.png)").unwrap();

        let err = run_in(args(&["-o", "out.css"]), &root).await.unwrap_err();
        let CliError::Syntax { message, .. } = err else {
            panic!("expected a syntax error, got {err:?}");
        };
        assert!(message.starts_with("failed to parse stylesheet: "));
    }

    #[tokio::test]
    async fn test_missing_input() {
        let (_dir, root) = project();
        let args = Args::parse_from(["css-rebaser", "nope.css", "--map", "app.css.map"]);
        let err = run_in(args, &root).await.unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
    }
}
