use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Language codes the game ships localization folders for.
///
/// `code` is the token used in file names and on the command line,
/// `display_name` is the human-readable name spliced into the system
/// instruction sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// `braz_por`
    BrazPor,
    /// `english`
    English,
    /// `french`
    French,
    /// `german`
    German,
    /// `japanese`
    Japanese,
    /// `korean`
    Korean,
    /// `polish`
    Polish,
    /// `russian`
    Russian,
    /// `simp_chinese`
    SimpChinese,
    /// `spanish`
    Spanish,
    /// `turkish`
    Turkish,
}

impl Language {
    /// Every supported language, in code order.
    pub const ALL: [Language; 11] = [
        Language::BrazPor,
        Language::English,
        Language::French,
        Language::German,
        Language::Japanese,
        Language::Korean,
        Language::Polish,
        Language::Russian,
        Language::SimpChinese,
        Language::Spanish,
        Language::Turkish,
    ];

    /// The code used in localization file and directory names, eg `simp_chinese`.
    pub fn code(&self) -> &'static str {
        match self {
            Language::BrazPor => "braz_por",
            Language::English => "english",
            Language::French => "french",
            Language::German => "german",
            Language::Japanese => "japanese",
            Language::Korean => "korean",
            Language::Polish => "polish",
            Language::Russian => "russian",
            Language::SimpChinese => "simp_chinese",
            Language::Spanish => "spanish",
            Language::Turkish => "turkish",
        }
    }

    /// The name used inside the translation instruction, eg `Simplified Chinese`.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::BrazPor => "Brazilian Portuguese",
            Language::English => "English",
            Language::French => "French",
            Language::German => "German",
            Language::Japanese => "Japanese",
            Language::Korean => "Korean",
            Language::Polish => "Polish",
            Language::Russian => "Russian",
            Language::SimpChinese => "Simplified Chinese",
            Language::Spanish => "Spanish",
            Language::Turkish => "Turkish",
        }
    }

    /// The root key a localization file for this language nests under, eg `l_french`.
    pub fn root_key(&self) -> String {
        format!("l_{}", self.code())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|l| l.code() == s)
            .ok_or_else(|| Error::UnsupportedLanguage(s.to_string()))
    }
}

#[test]
fn parses_supported_codes() {
    for lang in Language::ALL {
        assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
    }
    assert_eq!(
        "simp_chinese".parse::<Language>().unwrap(),
        Language::SimpChinese
    );
    assert_eq!(Language::SimpChinese.display_name(), "Simplified Chinese");
    assert_eq!(Language::BrazPor.root_key(), "l_braz_por");
}

#[test]
fn rejects_unknown_codes() {
    let err = "trad_chinese".parse::<Language>().unwrap_err();
    assert!(matches!(err, Error::UnsupportedLanguage(code) if code == "trad_chinese"));
}
