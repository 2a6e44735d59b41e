/// Looping icon animation shown on cards and forecast tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconAnimation {
    pub asset: &'static str,
}

const FALLBACK_ASSET: &str = "Weather-sunny.json";

impl IconAnimation {
    /// Pick the animation for an OpenWeather icon code such as "10n".
    pub fn for_icon(icon_code: &str) -> Self {
        let asset = match icon_code {
            "01d" => "Weather-sunny.json",
            "01n" => "Weather-night-clear.json",
            "02d" => "Weather-partly-cloudy.json",
            "02n" | "03n" | "04n" => "Weather-night-partly-cloudy.json",
            "03d" | "04d" => "Weather-cloudy.json",
            "09d" | "10d" => "Weather-rain.json",
            "09n" | "10n" => "Weather-night-rain.json",
            "11d" => "Weather-storm.json",
            "11n" => "Weather-night-storm.json",
            "13d" => "Weather-snow.json",
            "13n" => "Weather-night-snow.json",
            "50d" => "Weather-mist.json",
            "50n" => "Weather-night-mist.json",
            _ => FALLBACK_ASSET,
        };
        Self { asset }
    }

    /// Asset path relative to the front end's static root.
    pub fn path(&self) -> String {
        format!("lottie/{}", self.asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn night_codes_pick_night_assets() {
        assert_eq!(IconAnimation::for_icon("10n").asset, "Weather-night-rain.json");
        assert_eq!(IconAnimation::for_icon("04d").asset, "Weather-cloudy.json");
    }

    #[test]
    fn unknown_code_falls_back_to_sunny() {
        let anim = IconAnimation::for_icon("99x");
        assert_eq!(anim.path(), "lottie/Weather-sunny.json");
    }
}
