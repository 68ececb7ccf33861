//! Weather
//!
//! Fetches the current weather at a source's location, for display only.

// Imports
use {
	crate::{
		fetch::{Fetch, FetchError},
		source::GeoLocation,
	},
	core::fmt::{self, Write},
};

/// Current weather
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct CurrentWeather {
	/// Temperature, in degrees celsius
	pub temperature: f64,

	/// WMO weather code
	pub weather_code: u32,

	/// Whether it's daytime
	pub is_day: bool,

	/// Elevation of the forecast grid cell, in meters
	pub elevation: Option<f64>,
}

impl CurrentWeather {
	/// Returns the display label
	#[must_use]
	pub fn label(&self) -> String {
		let mut label = format!(
			"{:.1}°C, {}, {}",
			self.temperature,
			self::describe_code(self.weather_code),
			match self.is_day {
				true => "day",
				false => "night",
			}
		);
		if let Some(elevation) = self.elevation {
			_ = write!(label, ", {elevation:.0} m");
		}

		label
	}
}

impl fmt::Display for CurrentWeather {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.pad(&self.label())
	}
}

/// Returns a short description of a WMO weather code
#[must_use]
pub fn describe_code(code: u32) -> &'static str {
	match code {
		0 => "clear sky",
		1 => "mainly clear",
		2 => "partly cloudy",
		3 => "overcast",
		45 | 48 => "fog",
		51 | 53 | 55 => "drizzle",
		56 | 57 => "freezing drizzle",
		61 | 63 | 65 => "rain",
		66 | 67 => "freezing rain",
		71 | 73 | 75 => "snow",
		77 => "snow grains",
		80..=82 => "rain showers",
		85 | 86 => "snow showers",
		95 => "thunderstorm",
		96 | 99 => "thunderstorm with hail",
		_ => "unknown",
	}
}

/// Weather client
#[derive(Clone, Debug)]
pub struct WeatherClient<F> {
	/// Fetcher
	fetcher: F,

	/// Current weather endpoint
	endpoint: String,
}

impl<F: Fetch> WeatherClient<F> {
	/// Creates a new client
	pub fn new(fetcher: F, endpoint: impl Into<String>) -> Self {
		Self {
			fetcher,
			endpoint: endpoint.into(),
		}
	}

	/// Returns the request url for `location`
	#[must_use]
	pub fn request_url(&self, location: &GeoLocation) -> String {
		format!(
			"{}?latitude={}&longitude={}&current=temperature_2m,weather_code,is_day",
			self.endpoint, location.latitude, location.longitude
		)
	}

	/// Fetches the current weather at `location`
	pub async fn current(&self, location: &GeoLocation) -> Result<CurrentWeather, WeatherError> {
		let url = self.request_url(location);
		let body = self.fetcher.get(&url).await?;
		let response = serde_json::from_slice::<ser::Response>(&body).map_err(WeatherError::Parse)?;

		let weather = CurrentWeather {
			temperature:  response.current.temperature_2m,
			weather_code: response.current.weather_code,
			is_day:       response.current.is_day != 0,
			elevation:    response.elevation,
		};
		tracing::debug!(?location, ?weather, "Fetched weather");

		Ok(weather)
	}
}

/// Weather error
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
	/// Unable to fetch
	#[error("Unable to fetch weather")]
	Fetch(#[from] FetchError),

	/// Unable to parse the response
	#[error("Unable to parse weather response")]
	Parse(#[source] serde_json::Error),
}

/// Serialized response
mod ser {
	#[derive(Debug)]
	#[derive(serde::Deserialize)]
	pub struct Response {
		#[serde(default)]
		pub elevation: Option<f64>,
		pub current:   Current,
	}

	#[derive(Debug)]
	#[derive(serde::Deserialize)]
	pub struct Current {
		pub temperature_2m: f64,
		pub weather_code:   u32,
		pub is_day:         u8,
	}
}

#[cfg(test)]
mod test {
	use {super::*, crate::fetch::test::FakeFetcher};

	const LOCATION: GeoLocation = GeoLocation {
		latitude:  45.9419,
		longitude: 6.4283,
	};

	#[tokio::test]
	async fn current_weather() {
		let fetcher = FakeFetcher::default();
		let client = WeatherClient::new(fetcher.clone(), "https://weather/v1/forecast");
		let url = client.request_url(&LOCATION);
		assert_eq!(
			url,
			"https://weather/v1/forecast?latitude=45.9419&longitude=6.4283&current=temperature_2m,weather_code,is_day",
			"Request url"
		);

		fetcher.set_body(
			&url,
			r#"{"latitude": 45.94, "longitude": 6.43, "elevation": 1012.0,
			   "current": {"time": "2024-03-05T14:30", "temperature_2m": -2.4, "weather_code": 73, "is_day": 1}}"#,
		);
		let weather = client.current(&LOCATION).await.expect("Unable to fetch weather");

		assert_eq!(weather.weather_code, 73, "Weather code");
		assert!(weather.is_day, "Should be day");
		assert_eq!(weather.label(), "-2.4°C, snow, day, 1012 m", "Label");
	}

	#[test]
	fn label_without_elevation() {
		let weather = CurrentWeather {
			temperature:  11.0,
			weather_code: 2,
			is_day:       false,
			elevation:    None,
		};
		assert_eq!(weather.to_string(), "11.0°C, partly cloudy, night", "Label");
	}

	#[tokio::test]
	async fn invalid_response() {
		let fetcher = FakeFetcher::default();
		let client = WeatherClient::new(fetcher.clone(), "https://weather/v1/forecast");
		fetcher.set_body(&client.request_url(&LOCATION), r#"{"error": true}"#);

		let err = client.current(&LOCATION).await.expect_err("Response should fail to parse");
		assert!(matches!(err, WeatherError::Parse(_)), "Unexpected error: {err:?}");
	}
}
