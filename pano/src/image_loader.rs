//! Image loader

// Imports
use {
	crate::fetch::{Fetch, FetchError},
	image::ImageReader,
	pano_util::Size,
	std::io::{self, Cursor},
};

/// Image loader
///
/// Only the header of each image is parsed, to get its natural size.
#[derive(Clone, Debug)]
pub struct ImageLoader<F> {
	/// Fetcher
	fetcher: F,
}

impl<F: Fetch> ImageLoader<F> {
	/// Creates a new image loader
	pub fn new(fetcher: F) -> Self {
		Self { fetcher }
	}

	/// Loads the image at `url`, returning its natural size
	pub async fn load(&self, url: &str) -> Result<Size, ImageLoadError> {
		let bytes = self.fetcher.get(url).await?;
		let size = self::read_size(&bytes)?;
		if size.is_empty() {
			return Err(ImageLoadError::Empty);
		}

		tracing::debug!(url, %size, "Loaded image");
		Ok(size)
	}
}

/// Reads the size of an encoded image
pub fn read_size(bytes: &[u8]) -> Result<Size, ImageLoadError> {
	let (width, height) = ImageReader::new(Cursor::new(bytes))
		.with_guessed_format()
		.map_err(ImageLoadError::Format)?
		.into_dimensions()
		.map_err(ImageLoadError::Decode)?;

	Ok(Size::new(width, height))
}

/// Image load error
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
	/// Unable to fetch the image
	#[error("Unable to fetch image")]
	Fetch(#[from] FetchError),

	/// Unable to guess the format
	#[error("Unable to guess image format")]
	Format(#[source] io::Error),

	/// Unable to read the image header
	#[error("Unable to read image header")]
	Decode(#[source] image::ImageError),

	/// Image has no pixels
	#[error("Image is empty")]
	Empty,
}

#[cfg(test)]
pub mod test {
	use {
		super::*,
		crate::fetch::test::FakeFetcher,
		image::{ImageFormat, RgbImage},
	};

	/// Encodes a blank png of `width`x`height`
	pub fn png(width: u32, height: u32) -> Vec<u8> {
		let mut bytes = Cursor::new(vec![]);
		RgbImage::new(width, height)
			.write_to(&mut bytes, ImageFormat::Png)
			.expect("Unable to encode test image");
		bytes.into_inner()
	}

	#[tokio::test]
	async fn reads_natural_size() {
		let fetcher = FakeFetcher::default();
		fetcher.set_body("https://x/pano.png", self::png(64, 8));

		let size = ImageLoader::new(fetcher)
			.load("https://x/pano.png")
			.await
			.expect("Unable to load image");
		assert_eq!(size, Size::new(64, 8), "Natural size");
	}

	#[tokio::test]
	async fn garbage_is_rejected() {
		let fetcher = FakeFetcher::default();
		fetcher.set_body("https://x/pano.jpg", b"<html>not found</html>".to_vec());
		let loader = ImageLoader::new(fetcher);

		let err = loader.load("https://x/pano.jpg").await.expect_err("Garbage should fail");
		assert!(matches!(err, ImageLoadError::Decode(_)), "Unexpected error: {err:?}");

		let err = loader.load("https://x/missing.jpg").await.expect_err("Missing image should fail");
		assert!(matches!(err, ImageLoadError::Fetch(_)), "Unexpected error: {err:?}");
	}
}
