// Locale module
// Bundled UI strings; the name data itself is not translated

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "cs")]
    Czech,
    #[serde(rename = "en")]
    English,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleStrings {
    pub loading: &'static str,
    pub read_error: &'static str,
    pub missing: &'static str,
    pub today_heading: &'static str,
    pub tomorrow_heading: &'static str,
    pub launch_at_login: &'static str,
    pub quit: &'static str,
}

static CZECH: LocaleStrings = LocaleStrings {
    loading: "Načítám…",
    read_error: "Chyba čtení",
    missing: "–",
    today_heading: "Dnes má svátek:",
    tomorrow_heading: "Zítra bude mít svátek:",
    launch_at_login: "Otevřít po startu",
    quit: "Ukončit",
};

static ENGLISH: LocaleStrings = LocaleStrings {
    loading: "Loading…",
    read_error: "Read error",
    missing: "–",
    today_heading: "Name day today:",
    tomorrow_heading: "Name day tomorrow:",
    launch_at_login: "Open at login",
    quit: "Quit",
};

impl Locale {
    pub fn strings(&self) -> &'static LocaleStrings {
        match self {
            Locale::Czech => &CZECH,
            Locale::English => &ENGLISH,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::Czech => "cs",
            Locale::English => "en",
        }
    }
}
