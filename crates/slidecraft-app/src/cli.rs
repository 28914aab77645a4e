//! Command line for the native replay runner.

use crate::replay::{self, ReplayResult};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "slidecraft",
    about = "Replay a scripted drag gesture and print the resulting slide as JSON",
    version
)]
pub struct Cli {
    /// Path to the replay script (JSON).
    pub script: PathBuf,
}

pub fn run_from_env() -> ReplayResult<String> {
    let cli = Cli::parse();
    run(&cli)
}

/// Replay `cli.script` and render the report as pretty JSON.
pub fn run(cli: &Cli) -> ReplayResult<String> {
    log::info!("Replaying {}", cli.script.display());
    replay::run_file(&cli.script)?.to_json()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::{ReplayError, ReplayReport};
    use clap::error::ErrorKind;
    use std::ffi::OsStr;
    use std::io::Write;

    #[test]
    fn test_help_is_not_a_path() {
        let err = Cli::try_parse_from(["slidecraft", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["slidecraft", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_script_argument() {
        let cli = Cli::try_parse_from(["slidecraft", "drag.json"]).unwrap();
        assert_eq!(cli.script, PathBuf::from("drag.json"));
    }

    #[test]
    fn test_missing_script() {
        let err = Cli::try_parse_from(["slidecraft"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_unknown_flag() {
        let err = Cli::try_parse_from(["slidecraft", "--frames", "drag.json"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_run_prints_report() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{
                "container": { "x0": 0, "y0": 0, "x1": 960, "y1": 540 },
                "elements": [{ "id": "a", "x": 100, "y": 100, "width": 50, "height": 50 }],
                "steps": [
                    { "op": "down", "element": "a", "x": 110, "y": 110 },
                    { "op": "move", "x": 171, "y": 110 },
                    { "op": "up" }
                ]
            }"#,
        )
        .unwrap();

        let args = [OsStr::new("slidecraft"), file.path().as_os_str()];
        let cli = Cli::try_parse_from(args).unwrap();
        let report: ReplayReport = serde_json::from_str(&run(&cli).unwrap()).unwrap();
        assert_eq!(report.commits.len(), 1);
        assert!((report.element("a").unwrap().x - 160.0).abs() < 1e-9);
    }

    #[test]
    fn test_run_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli {
            script: dir.path().join("missing.json"),
        };
        assert!(matches!(run(&cli), Err(ReplayError::Io(_))));
    }
}
