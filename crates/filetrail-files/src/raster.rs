//! Raster image handle exposing a decoded RGB buffer.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader, RgbImage};
use serde::{Deserialize, Serialize};

use filetrail_core::{FileError, FileKind, FileOptions, TypedFile, require_regular_file};

/// An image file, decoded to 8-bit RGB on access.
///
/// The decoded buffer owns its pixels; no file handle outlives the decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageFile {
    path: PathBuf,
}

impl ImageFile {
    /// Decode the image into a memory-resident RGB buffer.
    pub fn image(&self) -> Result<RgbImage, FileError> {
        decode(&self.path).map(DynamicImage::into_rgb8)
    }

    /// Width and height, read from the header only.
    pub fn dimensions(&self) -> Result<(u32, u32), FileError> {
        read_dimensions(&self.path)
    }
}

fn decode(path: &Path) -> Result<DynamicImage, FileError> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| FileError::io(path, e))?;
    reader.decode().map_err(|e| FileError::Image {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read_dimensions(path: &Path) -> Result<(u32, u32), FileError> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| FileError::io(path, e))?;
    reader.into_dimensions().map_err(|e| FileError::Image {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

impl TypedFile for ImageFile {
    const KIND: FileKind = FileKind::Image;
    type Options = FileOptions;
    type View = RgbImage;

    fn open(path: impl Into<PathBuf>, options: &FileOptions) -> Result<Self, FileError> {
        let path = path.into();
        require_regular_file(&path)?;
        if options.validate && !Self::validate(&path) {
            return Err(FileError::ValidationFailed {
                path,
                kind: Self::KIND.as_str(),
            });
        }
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Decodes the whole image, so a corrupt body fails here rather than
    /// on first access.
    fn validate(path: &Path) -> bool {
        decode(path).is_ok()
    }

    fn access<R, E>(&self, f: impl FnOnce(&mut RgbImage) -> Result<R, E>) -> Result<R, E>
    where
        E: From<FileError>,
    {
        let mut img = self.image()?;
        f(&mut img)
    }

    fn create(path: impl Into<PathBuf>) -> Result<Self, FileError> {
        Err(FileError::CreateUnsupported {
            path: path.into(),
            kind: Self::KIND.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::fs;
    use tempfile::TempDir;

    fn write_png(path: &Path) {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(1, 1, Rgb([10, 20, 30]));
        img.save(path).unwrap();
    }

    #[test]
    fn test_access_yields_decoded_pixels() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pic.png");
        write_png(&path);

        let file = ImageFile::open(&path, &FileOptions::validated()).unwrap();
        let pixel = file
            .access(|img| Ok::<_, FileError>(*img.get_pixel(1, 1)))
            .unwrap();

        assert_eq!(pixel, Rgb([10, 20, 30]));
        assert_eq!(file.dimensions().unwrap(), (3, 2));
    }

    #[test]
    fn test_image_outlives_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pic.png");
        write_png(&path);

        let file = ImageFile::open(&path, &FileOptions::default()).unwrap();
        let img = file.image().unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(img.dimensions(), (3, 2));
    }

    #[test]
    fn test_validation_rejects_non_image() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fake.png");
        fs::write(&path, "definitely not a png").unwrap();

        assert!(ImageFile::open(&path, &FileOptions::default()).is_ok());
        assert!(matches!(
            ImageFile::open(&path, &FileOptions::validated()),
            Err(FileError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_corrupt_pixel_data() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.png");
        RgbImage::from_pixel(64, 64, Rgb([200, 100, 50]))
            .save(&path)
            .unwrap();

        let mut bytes = fs::read(&path).unwrap();
        let idat = bytes.windows(4).position(|w| w == b"IDAT").unwrap();
        let len = u32::from_be_bytes(bytes[idat - 4..idat].try_into().unwrap()) as usize;
        for byte in &mut bytes[idat + 4..idat + 4 + len] {
            *byte = !*byte;
        }
        fs::write(&path, &bytes).unwrap();

        // The header is intact, only the pixel data is damaged.
        let unchecked = ImageFile::open(&path, &FileOptions::default()).unwrap();
        assert_eq!(unchecked.dimensions().unwrap(), (64, 64));
        assert!(unchecked.image().is_err());

        assert!(matches!(
            ImageFile::open(&path, &FileOptions::validated()),
            Err(FileError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_create_always_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("new.png");

        assert!(matches!(
            ImageFile::create(&path),
            Err(FileError::CreateUnsupported { .. })
        ));
        assert!(!path.exists());
    }
}
