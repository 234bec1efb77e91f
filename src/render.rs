use crate::chart::PieChart;
use crate::errors::{RenderError, ReportError};
use resvg::{tiny_skia, usvg};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Turns chart markup on disk into PNG bytes.
pub trait Rasterizer {
    fn rasterize(&self, markup: &Path) -> Result<Vec<u8>, RenderError>;
}

/// Rasterizes SVG markup with resvg, using whatever fonts the system has.
pub struct SvgRasterizer {
    options: usvg::Options<'static>,
}

impl SvgRasterizer {
    pub fn new() -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        debug!(fonts = options.fontdb.len(), "loaded system fonts");

        Self { options }
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for SvgRasterizer {
    fn rasterize(&self, markup: &Path) -> Result<Vec<u8>, RenderError> {
        let data = fs::read(markup)?;
        let tree = usvg::Tree::from_data(&data, &self.options)?;

        let size = tree.size().to_int_size();
        let mut pixmap =
            tiny_skia::Pixmap::new(size.width(), size.height()).ok_or(RenderError::Canvas {
                width: size.width(),
                height: size.height(),
            })?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|err| RenderError::Encoding(err.to_string()))
    }
}

/// The location of the intermediate markup written next to `output`.
pub fn markup_path(output: &Path) -> PathBuf {
    output.with_extension("svg")
}

/// Writes `chart` to `output` as a PNG image.
///
/// The chart is first written out as SVG markup beside `output` and handed
/// to the rasterizer. The markup is not part of the published output and is
/// always deleted afterwards; failing to delete it fails the whole write.
pub fn write_chart<R: Rasterizer + ?Sized>(
    chart: &PieChart,
    rasterizer: &R,
    output: &Path,
) -> Result<(), ReportError> {
    let markup = markup_path(output);
    fs::write(&markup, chart.to_svg()).map_err(|source| ReportError::WriteArtifact {
        path: markup.clone(),
        source,
    })?;

    let image = match rasterizer.rasterize(&markup) {
        Ok(image) => image,
        Err(source) => {
            // The render error is the one worth reporting, so a failed
            // removal here is only logged.
            if let Err(err) = fs::remove_file(&markup) {
                warn!(path = %markup.display(), error = %err, "unable to remove chart markup");
            }
            return Err(ReportError::Render {
                path: output.to_path_buf(),
                source,
            });
        }
    };

    fs::write(output, &image).map_err(|source| ReportError::WriteArtifact {
        path: output.to_path_buf(),
        source,
    })?;

    fs::remove_file(&markup).map_err(|source| ReportError::ArtifactCleanup {
        path: markup.clone(),
        source,
    })?;

    info!(path = %output.display(), slices = chart.slices().len(), "wrote chart");
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::chart::ChartOptions;
    use crate::series::LabeledProportion;
    use std::cell::RefCell;

    /// Records the markup it was given and returns fixed bytes.
    #[derive(Default)]
    pub(crate) struct FakeRasterizer {
        pub(crate) seen: RefCell<Vec<String>>,
    }

    impl Rasterizer for FakeRasterizer {
        fn rasterize(&self, markup: &Path) -> Result<Vec<u8>, RenderError> {
            self.seen.borrow_mut().push(fs::read_to_string(markup)?);
            Ok(b"png".to_vec())
        }
    }

    /// Removes the markup itself, so the cleanup step has nothing to delete.
    struct EagerRasterizer;

    impl Rasterizer for EagerRasterizer {
        fn rasterize(&self, markup: &Path) -> Result<Vec<u8>, RenderError> {
            fs::remove_file(markup)?;
            Ok(b"png".to_vec())
        }
    }

    struct BrokenRasterizer;

    impl Rasterizer for BrokenRasterizer {
        fn rasterize(&self, _markup: &Path) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::Canvas {
                width: 0,
                height: 0,
            })
        }
    }

    fn chart() -> PieChart {
        let series = vec![
            LabeledProportion {
                label: String::from("Food: £12.50"),
                value: 12.5,
            },
            LabeledProportion {
                label: String::from("Rent: £800.00"),
                value: 800.0,
            },
        ];
        PieChart::new(ChartOptions::default(), &series)
    }

    #[test]
    fn should_derive_markup_path_from_output() {
        assert_eq!(
            markup_path(Path::new("out/committed-spending.png")),
            PathBuf::from("out/committed-spending.svg")
        );
    }

    #[test]
    fn should_write_image_and_remove_markup() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("committed-spending.png");
        let rasterizer = FakeRasterizer::default();

        write_chart(&chart(), &rasterizer, &output).unwrap();

        assert_eq!(fs::read(&output).unwrap(), b"png");
        assert!(!markup_path(&output).exists());
        assert_eq!(rasterizer.seen.borrow().len(), 1);
        assert!(rasterizer.seen.borrow()[0].contains("Rent: £800.00"));
    }

    #[test]
    fn should_fail_when_markup_cannot_be_removed() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("income-breakdown.png");

        let err = write_chart(&chart(), &EagerRasterizer, &output).unwrap_err();

        assert!(matches!(err, ReportError::ArtifactCleanup { .. }));
        assert!(err.to_string().contains("income-breakdown.svg"));
    }

    #[test]
    fn should_clean_up_markup_when_rasterizing_fails() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("committed-spending.png");

        let err = write_chart(&chart(), &BrokenRasterizer, &output).unwrap_err();

        assert!(matches!(err, ReportError::Render { .. }));
        assert!(!output.exists());
        assert!(!markup_path(&output).exists());
    }

    #[test]
    fn should_fail_when_output_directory_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("committed-spending.png");

        let err = write_chart(&chart(), &FakeRasterizer::default(), &output).unwrap_err();
        assert!(matches!(err, ReportError::WriteArtifact { .. }));
    }

    #[test]
    fn should_rasterize_markup_to_png() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("committed-spending.png");

        write_chart(&chart(), &SvgRasterizer::new(), &output).unwrap();

        let image = fs::read(&output).unwrap();
        assert!(image.starts_with(b"\x89PNG\r\n\x1a\n"));
        assert!(!markup_path(&output).exists());
    }
}
