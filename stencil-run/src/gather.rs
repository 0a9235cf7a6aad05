//! Template gathering: turn a validated [`Config`] into an ordered list of
//! [`TemplateDescriptor`]s, each with its contents loaded and its destination
//! resolved.

use std::io::Read;
use std::path::{Path, PathBuf};

use stencil_core::{Config, InputMode, Target, TemplateDescriptor, STDIO_ARG};

use crate::error::{io_err, RunError};
use crate::filter::ExcludeMatcher;
use crate::namer::OutputNamer;

/// Name given to the template passed inline with `--in`.
pub const INLINE_NAME: &str = "<arg>";

/// Gather every template the configuration addresses.
///
/// `namer` is only consulted in directory mode. Any I/O failure aborts the
/// whole gather; no partial list is returned.
pub fn gather_templates(
    config: &Config,
    namer: &dyn OutputNamer,
) -> Result<Vec<TemplateDescriptor>, RunError> {
    match config.input_mode() {
        InputMode::Inline { template, output } => {
            let target = output.map(Target::from_arg).unwrap_or(Target::Stdout);
            Ok(vec![TemplateDescriptor::new(INLINE_NAME, template, target)])
        }
        InputMode::Files { files, outputs } => files
            .iter()
            .zip(outputs.iter())
            .map(|(file, out)| {
                let contents = read_input(file)?;
                Ok(TemplateDescriptor::new(*file, contents, Target::from_arg(out)))
            })
            .collect(),
        InputMode::Directory { input_dir, .. } => {
            let matcher = ExcludeMatcher::new(&config.exclude_rules())?;
            walk_dir(input_dir, &matcher, namer)
        }
    }
}

fn read_input(arg: &str) -> Result<String, RunError> {
    if arg == STDIO_ARG {
        let mut contents = String::new();
        std::io::stdin()
            .read_to_string(&mut contents)
            .map_err(|e| io_err("<stdin>", e))?;
        return Ok(contents);
    }
    std::fs::read_to_string(arg).map_err(|e| io_err(arg, e))
}

/// Recursively collect regular files under `input_dir`, sorted by name at
/// every level.
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RunError> {
    let mut entries = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| io_err(dir, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let meta = std::fs::metadata(&path).map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn walk_dir(
    input_dir: &Path,
    matcher: &ExcludeMatcher,
    namer: &dyn OutputNamer,
) -> Result<Vec<TemplateDescriptor>, RunError> {
    let mut files = Vec::new();
    collect_files(input_dir, &mut files)?;

    let mut templates = Vec::with_capacity(files.len());
    for path in files {
        let rel = relative_name(input_dir, &path);
        if matcher.is_excluded(&rel) {
            tracing::debug!("excluded: {rel}");
            continue;
        }

        let output = namer.output_path(&rel)?;
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        tracing::debug!("gathered: {} -> {}", path.display(), output.display());
        templates.push(TemplateDescriptor::new(
            path.to_string_lossy(),
            contents,
            Target::File(output),
        ));
    }
    Ok(templates)
}

/// Forward-slash relative path of `path` under `root`.
fn relative_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namer::StaticNamer;
    use std::fs;
    use tempfile::TempDir;

    fn dir_config(input_dir: &Path, output_dir: &Path) -> Config {
        Config {
            input_dir: Some(input_dir.to_path_buf()),
            output_dir: Some(output_dir.to_path_buf()),
            ..Config::default()
        }
    }

    #[test]
    fn inline_goes_to_stdout_by_default() {
        let config = Config {
            input: Some("hello".into()),
            ..Config::default()
        };
        let templates = gather_templates(&config, &StaticNamer::new(".")).unwrap();
        assert_eq!(
            templates,
            vec![TemplateDescriptor::new(INLINE_NAME, "hello", Target::Stdout)]
        );
    }

    #[test]
    fn inline_honours_single_out() {
        let config = Config {
            input: Some("hello".into()),
            output_files: vec!["result.txt".into()],
            ..Config::default()
        };
        let templates = gather_templates(&config, &StaticNamer::new(".")).unwrap();
        assert_eq!(templates[0].target, Target::File("result.txt".into()));
    }

    #[test]
    fn file_list_pairs_inputs_with_outputs() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.t");
        let b = tmp.path().join("b.t");
        fs::write(&a, "A").unwrap();
        fs::write(&b, "B").unwrap();

        let config = Config {
            input_files: vec![a.display().to_string(), b.display().to_string()],
            output_files: vec!["-".into(), "b.out".into()],
            ..Config::default()
        };
        let templates = gather_templates(&config, &StaticNamer::new(".")).unwrap();

        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].contents, "A");
        assert_eq!(templates[0].target, Target::Stdout);
        assert_eq!(templates[1].name, b.display().to_string());
        assert_eq!(templates[1].target, Target::File("b.out".into()));
    }

    #[test]
    fn missing_input_file_aborts() {
        let config = Config {
            input_files: vec!["/definitely/not/here.t".into()],
            output_files: vec!["-".into()],
            ..Config::default()
        };
        let err = gather_templates(&config, &StaticNamer::new(".")).unwrap_err();
        assert!(matches!(err, RunError::Io { .. }), "got {err:?}");
    }

    #[test]
    fn directory_scan_is_sorted_and_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        let output = tmp.path().join("out");
        fs::create_dir_all(input.join("nested")).unwrap();
        fs::write(input.join("b.t"), "b").unwrap();
        fs::write(input.join("a.t"), "a").unwrap();
        fs::write(input.join("nested").join("c.t"), "c").unwrap();

        let config = dir_config(&input, &output);
        let templates = gather_templates(&config, &StaticNamer::new(&output)).unwrap();

        let targets: Vec<_> = templates
            .iter()
            .map(|t| t.target.path().unwrap().to_path_buf())
            .collect();
        assert_eq!(
            targets,
            vec![
                output.join("a.t"),
                output.join("b.t"),
                output.join("nested").join("c.t"),
            ]
        );
        assert!(output.join("nested").is_dir());
        assert!(!output.join("a.t").exists(), "gathering never writes outputs");
    }

    #[test]
    fn directory_scan_applies_include_and_exclude() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        fs::create_dir_all(&input).unwrap();
        for name in ["keep.tmpl", "skip.tmpl", "other.txt"] {
            fs::write(input.join(name), name).unwrap();
        }

        let mut config = dir_config(&input, tmp.path());
        config.exclude = vec!["*.tmpl".into()];
        config.include = vec!["keep.tmpl".into()];

        let templates = gather_templates(&config, &StaticNamer::new(tmp.path())).unwrap();
        let names: Vec<_> = templates.iter().map(|t| t.contents.as_str()).collect();
        assert_eq!(names, vec!["keep.tmpl"]);
    }

    #[test]
    fn missing_input_dir_aborts() {
        let tmp = TempDir::new().unwrap();
        let config = dir_config(&tmp.path().join("absent"), tmp.path());
        assert!(gather_templates(&config, &StaticNamer::new(tmp.path())).is_err());
    }

    #[test]
    fn relative_names_use_forward_slashes() {
        let root = Path::new("in");
        let path = Path::new("in").join("a").join("b.t");
        assert_eq!(relative_name(root, &path), "a/b.t");
    }
}
