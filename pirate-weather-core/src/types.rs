use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Measurement-unit system the provider reports values in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Chosen by the provider from the requested location.
    #[default]
    Auto,
    Ca,
    Uk2,
    Us,
    Si,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Auto => "auto",
            Units::Ca => "ca",
            Units::Uk2 => "uk2",
            Units::Us => "us",
            Units::Si => "si",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Auto, Units::Ca, Units::Uk2, Units::Us, Units::Si]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.to_lowercase();

        Units::all()
            .iter()
            .copied()
            .find(|u| u.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!("Unknown units '{value}'. Supported units: {}.", join(Units::all()))
            })
    }
}

/// A named section of the forecast response.
///
/// Used both to exclude blocks from the response and, for `Hourly`, as the
/// value of the `extend` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Currently,
    Minutely,
    Hourly,
    Daily,
    Alerts,
    Flags,
}

impl Weather {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Currently => "currently",
            Weather::Minutely => "minutely",
            Weather::Hourly => "hourly",
            Weather::Daily => "daily",
            Weather::Alerts => "alerts",
            Weather::Flags => "flags",
        }
    }

    pub const fn all() -> &'static [Weather] {
        &[
            Weather::Currently,
            Weather::Minutely,
            Weather::Hourly,
            Weather::Daily,
            Weather::Alerts,
            Weather::Flags,
        ]
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weather {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.trim().to_lowercase();

        Weather::all()
            .iter()
            .copied()
            .find(|w| w.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown data block '{value}'. Supported blocks: {}.",
                    join(Weather::all())
                )
            })
    }
}

macro_rules! languages {
    ($($variant:ident => $code:literal),+ $(,)?) => {
        /// Language of the text summaries in the response.
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Language {
            #[default]
            #[serde(rename = "en")]
            English,
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl Language {
            pub fn as_str(&self) -> &'static str {
                match self {
                    Language::English => "en",
                    $(Language::$variant => $code,)+
                }
            }

            pub const fn all() -> &'static [Language] {
                &[Language::English, $(Language::$variant,)+]
            }
        }
    };
}

languages! {
    Arabic => "ar",
    Azerbaijani => "az",
    Belarusian => "be",
    Bulgarian => "bg",
    Bengali => "bn",
    Bosnian => "bs",
    Catalan => "ca",
    Czech => "cs",
    Welsh => "cy",
    Danish => "da",
    German => "de",
    Greek => "el",
    Esperanto => "eo",
    Spanish => "es",
    Estonian => "et",
    Persian => "fa",
    Finnish => "fi",
    French => "fr",
    Irish => "ga",
    ScottishGaelic => "gd",
    Hebrew => "he",
    Hindi => "hi",
    Croatian => "hr",
    Hungarian => "hu",
    Indonesian => "id",
    Icelandic => "is",
    Italian => "it",
    Japanese => "ja",
    Georgian => "ka",
    Kannada => "kn",
    Korean => "ko",
    Cornish => "kw",
    Latvian => "lv",
    Malayalam => "ml",
    Marathi => "mr",
    Dutch => "nl",
    Norwegian => "no",
    Punjabi => "pa",
    Polish => "pl",
    Portuguese => "pt",
    Romanian => "ro",
    Russian => "ru",
    Slovak => "sk",
    Slovenian => "sl",
    Serbian => "sr",
    Swedish => "sv",
    Tamil => "ta",
    Telugu => "te",
    Tetum => "tet",
    Turkish => "tr",
    Ukrainian => "uk",
    Urdu => "ur",
    PigLatin => "x-pig-latin",
    ChineseSimplified => "zh",
    ChineseTraditional => "zh-tw",
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.to_lowercase();

        Language::all()
            .iter()
            .copied()
            .find(|l| l.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!("Unknown language '{value}'. Supported languages: {}.", join(Language::all()))
            })
    }
}

fn join<T: fmt::Display>(values: &[T]) -> String {
    values.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
