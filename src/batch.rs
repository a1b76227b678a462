use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::{BitmapTracer, Color, VectorizationOption, VectorizeError, VectorizeResult, Vectorizer};

/// Name of the directory batch output is written to, inside the input directory.
pub const OUTPUT_DIR: &str = "svg_output";

/// How each file in a batch picks its vectorization option.
#[derive(Debug, Clone)]
pub enum OptionSelection {
    /// Inspect every file and take the option at this index, or the last one.
    Auto(usize),
    /// Use the same option for every file.
    Fixed(VectorizationOption),
}

impl OptionSelection {
    /// The option to convert `input` with.
    pub fn resolve<T: BitmapTracer>(
        &self,
        vectorizer: &Vectorizer<T>,
        input: &Path,
    ) -> VectorizeResult<VectorizationOption> {
        match self {
            OptionSelection::Fixed(option) => Ok(option.clone()),
            OptionSelection::Auto(index) => {
                let mut options = vectorizer.inspect(input)?;
                if options.is_empty() {
                    return Ok(VectorizationOption::monochrome(Color::BLACK));
                }
                let index = (*index).min(options.len() - 1);
                Ok(options.swap_remove(index))
            }
        }
    }
}

/// Outcome of converting a directory.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    /// Written SVG files.
    pub converted: Vec<PathBuf>,
    /// Input files that failed, with the error message.
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn succeeded_count(&self) -> usize {
        self.converted.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// PNG files directly inside `dir`, sorted by name. The extension match ignores case.
pub fn find_png_files(dir: &Path) -> VectorizeResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|err| VectorizeError::Io(io::Error::other(err)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_png = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if is_png {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Convert every PNG in `dir` into `dir/svg_output/<stem>.svg`.
///
/// The tracer is checked once up front. A file that fails is recorded in the
/// report and the batch moves on.
pub fn convert_directory<T: BitmapTracer>(
    vectorizer: &Vectorizer<T>,
    dir: impl AsRef<Path>,
    selection: &OptionSelection,
) -> VectorizeResult<BatchReport> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(VectorizeError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("not a directory: {}", dir.display()),
        )));
    }
    vectorizer.tracer().check_available()?;

    let files = find_png_files(dir)?;
    let output_dir = dir.join(OUTPUT_DIR);
    let mut report = BatchReport {
        output_dir: output_dir.clone(),
        ..Default::default()
    };
    if files.is_empty() {
        warn!(dir = %dir.display(), "no PNG files found");
        return Ok(report);
    }

    std::fs::create_dir_all(&output_dir)?;
    info!(count = files.len(), output = %output_dir.display(), "converting directory");

    for (i, input) in files.iter().enumerate() {
        let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
        name.push(".svg");
        let output = output_dir.join(name);
        let result = selection
            .resolve(vectorizer, input)
            .and_then(|option| vectorizer.convert_file(input, &output, &option));
        match result {
            Ok(()) => {
                info!(file = %input.display(), "[{}/{}] converted", i + 1, files.len());
                report.converted.push(output);
            }
            Err(err) => {
                warn!(file = %input.display(), error = %err, "[{}/{}] conversion failed", i + 1, files.len());
                report.failed.push((input.clone(), err.to_string()));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BoxTracer, BrokenTracer};
    use image::{Rgb, RgbImage};

    fn write_png(dir: &Path, name: &str) {
        RgbImage::from_fn(20, 20, |x, _| if x < 10 { Rgb([200, 0, 0]) } else { Rgb([255; 3]) })
            .save_with_format(dir.join(name), image::ImageFormat::Png)
            .unwrap();
    }

    mod find_png_files {
        use super::*;

        #[test]
        fn sorted_case_insensitive_top_level_only() {
            let dir = tempfile::tempdir().unwrap();
            write_png(dir.path(), "b.PNG");
            write_png(dir.path(), "a.png");
            std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
            std::fs::create_dir(dir.path().join("nested")).unwrap();
            write_png(&dir.path().join("nested"), "c.png");

            let files = find_png_files(dir.path()).unwrap();
            let names: Vec<_> = files
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect();
            assert_eq!(names, vec!["a.png", "b.PNG"]);
        }
    }

    mod convert_directory {
        use super::*;

        #[test]
        fn writes_into_output_dir() {
            let dir = tempfile::tempdir().unwrap();
            write_png(dir.path(), "one.png");
            write_png(dir.path(), "two.PNG");

            let report =
                convert_directory(&Vectorizer::new(BoxTracer), dir.path(), &OptionSelection::Auto(0))
                    .unwrap();

            assert!(report.is_success());
            assert_eq!(report.succeeded_count(), 2);
            assert!(dir.path().join("svg_output/one.svg").is_file());
            assert!(dir.path().join("svg_output/two.svg").is_file());
        }

        #[test]
        fn auto_index_is_clamped() {
            let dir = tempfile::tempdir().unwrap();
            write_png(dir.path(), "one.png");

            let report = convert_directory(
                &Vectorizer::new(BoxTracer),
                dir.path(),
                &OptionSelection::Auto(99),
            )
            .unwrap();
            assert_eq!(report.succeeded_count(), 1);
        }

        #[test]
        fn bad_file_does_not_stop_batch() {
            let dir = tempfile::tempdir().unwrap();
            write_png(dir.path(), "good.png");
            std::fs::write(dir.path().join("bad.png"), b"not a png").unwrap();

            let selection = OptionSelection::Fixed(VectorizationOption::monochrome(Color::BLACK));
            let report =
                convert_directory(&Vectorizer::new(BoxTracer), dir.path(), &selection).unwrap();

            assert_eq!(report.succeeded_count(), 1);
            assert_eq!(report.failed_count(), 1);
            assert!(report.failed[0].0.ends_with("bad.png"));
        }

        #[test]
        fn unavailable_tracer_fails_before_any_file() {
            let dir = tempfile::tempdir().unwrap();
            write_png(dir.path(), "one.png");

            let err = convert_directory(
                &Vectorizer::new(BrokenTracer { available: false }),
                dir.path(),
                &OptionSelection::Auto(0),
            )
            .unwrap_err();
            assert!(matches!(err, VectorizeError::ToolUnavailable { .. }));
            assert!(!dir.path().join(OUTPUT_DIR).exists());
        }

        #[test]
        fn empty_directory_is_empty_report() {
            let dir = tempfile::tempdir().unwrap();
            let report =
                convert_directory(&Vectorizer::new(BoxTracer), dir.path(), &OptionSelection::Auto(0))
                    .unwrap();
            assert_eq!(report.succeeded_count() + report.failed_count(), 0);
        }

        #[test]
        fn missing_directory_is_error() {
            let dir = tempfile::tempdir().unwrap();
            let missing = dir.path().join("nope");
            assert!(
                convert_directory(&Vectorizer::new(BoxTracer), &missing, &OptionSelection::Auto(0))
                    .is_err()
            );
        }
    }
}
