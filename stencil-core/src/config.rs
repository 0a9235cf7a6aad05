//! Run configuration.
//!
//! A [`Config`] is what both the CLI and library callers hand to the run
//! entry point. Unset list fields are empty and unset scalars are `None`;
//! defaults (`-` for stdin/stdout, `.` for the output directory, `{{`/`}}`
//! delimiters) are applied by the accessor methods, never stored.
//!
//! The same struct deserializes from YAML, so a config file can supply a base
//! that command-line flags override field by field:
//!
//! ```yaml
//! input-dir: templates
//! output-map: "out/{{ input | replace('.tmpl', '') }}"
//! datasources:
//!   - config=config.yaml
//! exclude:
//!   - "*.bak"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Argument meaning "standard input" for `--file` and "standard output" for `--out`.
pub const STDIO_ARG: &str = "-";

pub const DEFAULT_LEFT_DELIM: &str = "{{";
pub const DEFAULT_RIGHT_DELIM: &str = "}}";

const DEFAULT_OUTPUT_DIR: &str = ".";

/// Everything one render run needs to know.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Inline template text (`--in`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Template files (`--file`), `-` for stdin.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub input_files: Vec<String>,
    /// Directory scanned recursively for templates (`--input-dir`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    /// Output files paired with `input_files` (`--out`), `-` for stdout.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub output_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Mapping template computing each output path in directory mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_map: Option<String>,
    /// Auxiliary template arguments in `alias=path` or `path` form.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub datasources: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub datasource_headers: Vec<String>,
    /// Data sources pre-loaded into the template context.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_delim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_delim: Option<String>,
}

/// The addressing mode a validated [`Config`] selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode<'a> {
    /// A single literal template string.
    Inline {
        template: &'a str,
        output: Option<&'a str>,
    },
    /// Explicit input files, each paired with the output at the same index.
    Files {
        files: Vec<&'a str>,
        outputs: Vec<&'a str>,
    },
    /// Recursive scan of `input_dir`.
    Directory {
        input_dir: &'a Path,
        output_dir: &'a Path,
        output_map: Option<&'a str>,
    },
}

impl Config {
    /// Load a config file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Layer `overrides` on top of `self`. Every field set in `overrides`
    /// (non-empty list, `Some` scalar) replaces the base value wholesale.
    pub fn merge(mut self, overrides: Config) -> Config {
        fn list(base: &mut Vec<String>, over: Vec<String>) {
            if !over.is_empty() {
                *base = over;
            }
        }
        fn scalar<T>(base: &mut Option<T>, over: Option<T>) {
            if over.is_some() {
                *base = over;
            }
        }

        scalar(&mut self.input, overrides.input);
        list(&mut self.input_files, overrides.input_files);
        scalar(&mut self.input_dir, overrides.input_dir);
        list(&mut self.exclude, overrides.exclude);
        list(&mut self.include, overrides.include);
        list(&mut self.output_files, overrides.output_files);
        scalar(&mut self.output_dir, overrides.output_dir);
        scalar(&mut self.output_map, overrides.output_map);
        list(&mut self.templates, overrides.templates);
        list(&mut self.datasources, overrides.datasources);
        list(&mut self.datasource_headers, overrides.datasource_headers);
        list(&mut self.contexts, overrides.contexts);
        scalar(&mut self.left_delim, overrides.left_delim);
        scalar(&mut self.right_delim, overrides.right_delim);
        self
    }

    /// Reject mutually exclusive or inconsistent settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let has_in = self.input.is_some();
        let has_files = !self.input_files.is_empty();
        let has_outs = !self.output_files.is_empty();
        let has_input_dir = self.input_dir.is_some();

        if has_in && has_files {
            return Err(ConfigError::InputWithFiles);
        }

        if !has_input_dir {
            let files = self.input_files().len();
            let outputs = self.output_files().len();
            if files != outputs {
                return Err(ConfigError::OutputCountMismatch { files, outputs });
            }
        }

        if has_input_dir && (has_in || has_files) {
            return Err(ConfigError::InputDirWithInputs);
        }

        if self.output_dir.is_some() {
            if has_outs {
                return Err(ConfigError::OutputDirWithOut);
            }
            if !has_input_dir {
                return Err(ConfigError::OutputDirWithoutInputDir);
            }
        }

        if self.output_map.is_some() {
            if has_outs || self.output_dir.is_some() {
                return Err(ConfigError::OutputMapConflict);
            }
            if !has_input_dir {
                return Err(ConfigError::OutputMapWithoutInputDir);
            }
        }

        if has_input_dir && has_outs {
            return Err(ConfigError::OutWithInputDir);
        }
        Ok(())
    }

    /// Input files with the stdin default applied.
    pub fn input_files(&self) -> Vec<&str> {
        with_stdio_default(&self.input_files)
    }

    /// Output files with the stdout default applied.
    pub fn output_files(&self) -> Vec<&str> {
        with_stdio_default(&self.output_files)
    }

    pub fn output_dir(&self) -> &Path {
        self.output_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_DIR))
    }

    pub fn left_delim(&self) -> &str {
        self.left_delim.as_deref().unwrap_or(DEFAULT_LEFT_DELIM)
    }

    pub fn right_delim(&self) -> &str {
        self.right_delim.as_deref().unwrap_or(DEFAULT_RIGHT_DELIM)
    }

    /// The addressing mode this configuration selects. Assumes [`validate`](Self::validate)
    /// has passed.
    pub fn input_mode(&self) -> InputMode<'_> {
        if let Some(template) = self.input.as_deref() {
            return InputMode::Inline {
                template,
                output: self.output_files.first().map(String::as_str),
            };
        }
        if let Some(input_dir) = self.input_dir.as_deref() {
            return InputMode::Directory {
                input_dir,
                output_dir: self.output_dir(),
                output_map: self.output_map.as_deref(),
            };
        }
        InputMode::Files {
            files: self.input_files(),
            outputs: self.output_files(),
        }
    }

    /// Gitignore-style exclusion rules for directory mode.
    ///
    /// `--include` globs are shorthand for "exclude everything, then
    /// re-include these": with includes present the list starts with `*`
    /// followed by one negated (`!`) rule per include. Explicit excludes
    /// follow.
    pub fn exclude_rules(&self) -> Vec<String> {
        let mut rules = Vec::with_capacity(self.include.len() + self.exclude.len() + 1);
        if !self.include.is_empty() {
            rules.push("*".to_string());
            rules.extend(self.include.iter().map(|glob| format!("!{glob}")));
        }
        rules.extend(self.exclude.iter().cloned());
        rules
    }

    /// All data-source declarations: general ones followed by context ones.
    pub fn all_datasources(&self) -> Vec<String> {
        self.datasources
            .iter()
            .chain(self.contexts.iter())
            .cloned()
            .collect()
    }
}

fn with_stdio_default(args: &[String]) -> Vec<&str> {
    if args.is_empty() {
        vec![STDIO_ARG]
    } else {
        args.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_config_is_valid_and_reads_stdin_to_stdout() {
        let config = Config::default();
        config.validate().expect("default config is valid");
        assert_eq!(
            config.input_mode(),
            InputMode::Files {
                files: vec!["-"],
                outputs: vec!["-"],
            }
        );
        assert_eq!(config.left_delim(), "{{");
        assert_eq!(config.right_delim(), "}}");
    }

    #[rstest]
    #[case::in_and_file(
        Config { input: Some("x".into()), input_files: strings(&["a"]), ..Config::default() },
        "--in and --file"
    )]
    #[case::count_mismatch(
        Config { input_files: strings(&["a", "b"]), output_files: strings(&["x"]), ..Config::default() },
        "same number of --out (1) as --file (2)"
    )]
    #[case::dir_with_file(
        Config { input_dir: Some("in".into()), input_files: strings(&["a"]), output_files: strings(&["b"]), ..Config::default() },
        "--input-dir can not be used"
    )]
    #[case::output_dir_with_out(
        Config { input_dir: Some("in".into()), output_dir: Some("out".into()), output_files: strings(&["b"]), ..Config::default() },
        "--output-dir can not be used together with --out"
    )]
    #[case::output_dir_alone(
        Config { output_dir: Some("out".into()), ..Config::default() },
        "--input-dir must be set when --output-dir"
    )]
    #[case::map_with_dir(
        Config { input_dir: Some("in".into()), output_dir: Some("out".into()), output_map: Some("x".into()), ..Config::default() },
        "--output-map can not be used"
    )]
    #[case::map_alone(
        Config { output_map: Some("x".into()), ..Config::default() },
        "--input-dir must be set when --output-map"
    )]
    #[case::out_with_dir(
        Config { input_dir: Some("in".into()), output_files: strings(&["b"]), ..Config::default() },
        "--out can not be used together with --input-dir"
    )]
    fn invalid_configs_are_rejected(#[case] config: Config, #[case] expected: &str) {
        let err = config.validate().expect_err("config should be rejected");
        assert!(err.to_string().contains(expected), "got: {err}");
    }

    #[test]
    fn inline_input_uses_first_output() {
        let config = Config {
            input: Some("hello".into()),
            output_files: strings(&["out.txt"]),
            ..Config::default()
        };
        config.validate().unwrap();
        assert_eq!(
            config.input_mode(),
            InputMode::Inline {
                template: "hello",
                output: Some("out.txt"),
            }
        );
    }

    #[test]
    fn directory_mode_defaults_output_dir_to_cwd() {
        let config = Config {
            input_dir: Some("in".into()),
            ..Config::default()
        };
        config.validate().unwrap();
        match config.input_mode() {
            InputMode::Directory {
                output_dir,
                output_map,
                ..
            } => {
                assert_eq!(output_dir, Path::new("."));
                assert!(output_map.is_none());
            }
            other => panic!("unexpected mode: {other:?}"),
        }
    }

    #[test]
    fn includes_become_blanket_exclude_with_negations() {
        let config = Config {
            include: strings(&["keep.tmpl", "*.md"]),
            exclude: strings(&["*.tmpl"]),
            ..Config::default()
        };
        assert_eq!(
            config.exclude_rules(),
            strings(&["*", "!keep.tmpl", "!*.md", "*.tmpl"])
        );
    }

    #[test]
    fn excludes_alone_pass_through() {
        let config = Config {
            exclude: strings(&["*.bak"]),
            ..Config::default()
        };
        assert_eq!(config.exclude_rules(), strings(&["*.bak"]));
    }

    #[test]
    fn merge_overrides_only_set_fields() {
        let base = Config {
            input_dir: Some("templates".into()),
            datasources: strings(&["a=a.json"]),
            left_delim: Some("<<".into()),
            ..Config::default()
        };
        let flags = Config {
            datasources: strings(&["b=b.json"]),
            ..Config::default()
        };
        let merged = base.merge(flags);
        assert_eq!(merged.input_dir, Some(PathBuf::from("templates")));
        assert_eq!(merged.datasources, strings(&["b=b.json"]));
        assert_eq!(merged.left_delim(), "<<");
    }

    #[test]
    fn all_datasources_appends_contexts() {
        let config = Config {
            datasources: strings(&["a=a.json"]),
            contexts: strings(&["b=b.json"]),
            ..Config::default()
        };
        assert_eq!(config.all_datasources(), strings(&["a=a.json", "b=b.json"]));
    }
}
