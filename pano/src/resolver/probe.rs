//! Archive probing

// Imports
use {
	crate::{
		fetch::{Fetch, HeadResponse},
		slot,
	},
	chrono::NaiveDateTime,
};

/// Returns the archive url of the image at `slot`
#[must_use]
pub fn archive_url(base_url: &str, slot: NaiveDateTime) -> String {
	format!("{base_url}/{}.jpg", slot::calendar_path(slot))
}

/// Returns if `response` describes a usable image.
///
/// Archives serve small placeholders for missing captures, so the
/// reported length must be above `min_bytes`, not just present.
#[must_use]
pub fn is_valid_image(response: &HeadResponse, min_bytes: u64) -> bool {
	response.is_success() && response.content_length.is_some_and(|len| len > min_bytes)
}

/// Checks whether a valid image exists at `url`.
///
/// Any failure to reach the archive counts as the image not existing.
pub async fn image_exists<F: Fetch>(fetcher: &F, url: &str, min_bytes: u64) -> bool {
	match fetcher.head(url).await {
		Ok(response) => {
			let valid = self::is_valid_image(&response, min_bytes);
			tracing::trace!(url, ?response, valid, "Probed image");
			valid
		},
		Err(err) => {
			tracing::debug!(url, "Unable to probe image: {err:?}");
			false
		},
	}
}

#[cfg(test)]
mod test {
	use {super::*, crate::fetch::test::FakeFetcher, chrono::NaiveDate};

	#[test]
	fn url_scheme() {
		let slot = NaiveDate::from_ymd_opt(2024, 3, 5)
			.and_then(|date| date.and_hms_opt(9, 0, 0))
			.expect("Invalid test slot");
		assert_eq!(
			archive_url("https://x/cam", slot),
			"https://x/cam/2024/03/05/09-00.jpg",
			"Url mismatch"
		);
	}

	#[test]
	fn size_threshold() {
		let response = |status, content_length| HeadResponse { status, content_length };

		assert!(is_valid_image(&response(200, Some(50_001)), 50_000), "Above threshold");
		assert!(!is_valid_image(&response(200, Some(50_000)), 50_000), "At threshold");
		assert!(!is_valid_image(&response(200, Some(1_024)), 50_000), "Placeholder");
		assert!(!is_valid_image(&response(200, None), 50_000), "No content length");
		assert!(!is_valid_image(&response(404, Some(100_000)), 50_000), "Failed status");
	}

	#[tokio::test]
	async fn missing_image() {
		let fetcher = FakeFetcher::default();
		fetcher.set_head("https://x/a.jpg", 200, Some(80_000));

		assert!(image_exists(&fetcher, "https://x/a.jpg", 50_000).await, "Image should exist");
		assert!(!image_exists(&fetcher, "https://x/b.jpg", 50_000).await, "Image should be missing");
	}
}
