//! Country reference data for the shipping form.
//!
//! Each supported country has one [`CountryProfile`] bundling its dial
//! code, phone pattern and `region -> cities` table. Everything that varies
//! by country goes through [`CountryCode::profile`]; nothing else in the
//! crate branches on country codes.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Supported shipping countries (ISO 3166-1 alpha-2).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum CountryCode {
    #[default]
    PT,
    ES,
    FR,
    IT,
}

impl CountryCode {
    /// Every supported country, in display order.
    pub const ALL: [Self; 4] = [Self::PT, Self::ES, Self::FR, Self::IT];

    /// Two-letter code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PT => "PT",
            Self::ES => "ES",
            Self::FR => "FR",
            Self::IT => "IT",
        }
    }

    /// Reference data for this country.
    #[must_use]
    pub fn profile(self) -> &'static CountryProfile {
        match self {
            Self::PT => &*PORTUGAL,
            Self::ES => &*SPAIN,
            Self::FR => &*FRANCE,
            Self::IT => &*ITALY,
        }
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unsupported country code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported country: {0}")]
pub struct UnsupportedCountry(pub String);

impl std::str::FromStr for CountryCode {
    type Err = UnsupportedCountry;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == upper)
            .ok_or_else(|| UnsupportedCountry(s.to_owned()))
    }
}

/// First-level administrative subdivision and its selectable cities.
#[derive(Debug)]
pub struct Region {
    pub name: &'static str,
    pub cities: &'static [&'static str],
}

impl Region {
    /// Whether `city` is one of this region's cities.
    #[must_use]
    pub fn has_city(&self, city: &str) -> bool {
        self.cities.contains(&city)
    }
}

/// Everything the shipping form needs to know about one country.
#[derive(Debug)]
pub struct CountryProfile {
    pub code: CountryCode,
    pub name: &'static str,
    /// International dialing prefix without the `+` (e.g. `351`).
    pub dial_code: &'static str,
    /// Trunk prefix dropped when writing the number internationally.
    pub trunk_prefix: Option<char>,
    /// Placeholder shown in the phone input.
    pub phone_placeholder: &'static str,
    /// Pattern the national significant number must match.
    pub phone_pattern: Regex,
    pub regions: &'static [Region],
}

impl CountryProfile {
    /// Look up a region by exact name.
    #[must_use]
    pub fn region(&self, name: &str) -> Option<&'static Region> {
        self.regions.iter().find(|region| region.name == name)
    }

    /// Region names in display order.
    pub fn region_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.regions.iter().map(|region| region.name)
    }

    /// Cities of `region`, or an empty slice for an unknown region.
    #[must_use]
    pub fn cities(&self, region: &str) -> &'static [&'static str] {
        self.region(region).map_or(&[], |region| region.cities)
    }

    /// Strip formatting and an optional international prefix from a raw
    /// phone input, returning the national digits if they match this
    /// country's pattern.
    ///
    /// Accepts `912 345 678`, `912-345-678`, `+351 912345678` and
    /// `00351912345678` alike for Portugal.
    #[must_use]
    pub fn national_number(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        let international = trimmed.starts_with('+');
        let digits: String = trimmed
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')' | '+'))
            .collect();

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let national = if international {
            digits.strip_prefix(self.dial_code)?.to_owned()
        } else if let Some(rest) = digits
            .strip_prefix("00")
            .and_then(|rest| rest.strip_prefix(self.dial_code))
        {
            rest.to_owned()
        } else {
            digits
        };

        self.phone_pattern
            .is_match(&national)
            .then_some(national)
    }

    /// Whether `raw` is a valid phone number for this country.
    #[must_use]
    pub fn is_valid_phone(&self, raw: &str) -> bool {
        self.national_number(raw).is_some()
    }
}

/// All country profiles, in display order.
pub fn profiles() -> impl Iterator<Item = &'static CountryProfile> {
    CountryCode::ALL.into_iter().map(CountryCode::profile)
}

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("Invalid phone pattern")
}

static PORTUGAL: LazyLock<CountryProfile> = LazyLock::new(|| CountryProfile {
    code: CountryCode::PT,
    name: "Portugal",
    dial_code: "351",
    trunk_prefix: None,
    phone_placeholder: "912 345 678",
    // Mobile numbers start with 9, landlines with 2; always nine digits.
    phone_pattern: pattern(r"^[29]\d{8}$"),
    regions: &[
        Region {
            name: "Aveiro",
            cities: &["Aveiro", "Águeda", "Ílhavo", "Ovar", "Santa Maria da Feira"],
        },
        Region {
            name: "Braga",
            cities: &["Braga", "Barcelos", "Guimarães", "Vila Nova de Famalicão"],
        },
        Region {
            name: "Coimbra",
            cities: &["Coimbra", "Cantanhede", "Figueira da Foz", "Lousã"],
        },
        Region {
            name: "Faro",
            cities: &["Faro", "Albufeira", "Lagos", "Loulé", "Portimão", "Tavira"],
        },
        Region {
            name: "Leiria",
            cities: &["Leiria", "Caldas da Rainha", "Marinha Grande", "Pombal"],
        },
        Region {
            name: "Lisboa",
            cities: &[
                "Lisboa", "Amadora", "Cascais", "Loures", "Odivelas", "Oeiras", "Sintra",
            ],
        },
        Region {
            name: "Porto",
            cities: &[
                "Porto",
                "Gondomar",
                "Maia",
                "Matosinhos",
                "Valongo",
                "Vila Nova de Gaia",
            ],
        },
        Region {
            name: "Setúbal",
            cities: &["Setúbal", "Almada", "Barreiro", "Palmela", "Seixal"],
        },
        Region {
            name: "Viseu",
            cities: &["Viseu", "Lamego", "Tondela"],
        },
        Region {
            name: "Região Autónoma da Madeira",
            cities: &["Funchal", "Câmara de Lobos", "Machico", "Santa Cruz"],
        },
        Region {
            name: "Região Autónoma dos Açores",
            cities: &["Ponta Delgada", "Angra do Heroísmo", "Horta", "Ribeira Grande"],
        },
    ],
});

static SPAIN: LazyLock<CountryProfile> = LazyLock::new(|| CountryProfile {
    code: CountryCode::ES,
    name: "España",
    dial_code: "34",
    trunk_prefix: None,
    phone_placeholder: "612 345 678",
    phone_pattern: pattern(r"^[6789]\d{8}$"),
    regions: &[
        Region {
            name: "Andalucía",
            cities: &["Sevilla", "Málaga", "Córdoba", "Granada", "Cádiz"],
        },
        Region {
            name: "Cataluña",
            cities: &["Barcelona", "Badalona", "Girona", "Tarragona", "Terrassa"],
        },
        Region {
            name: "Comunidad de Madrid",
            cities: &["Madrid", "Alcalá de Henares", "Getafe", "Móstoles"],
        },
        Region {
            name: "Comunidad Valenciana",
            cities: &["Valencia", "Alicante", "Castellón de la Plana", "Elche"],
        },
        Region {
            name: "Galicia",
            cities: &["A Coruña", "Lugo", "Ourense", "Pontevedra", "Vigo"],
        },
    ],
});

static FRANCE: LazyLock<CountryProfile> = LazyLock::new(|| CountryProfile {
    code: CountryCode::FR,
    name: "France",
    dial_code: "33",
    trunk_prefix: Some('0'),
    phone_placeholder: "06 12 34 56 78",
    // Ten digits with the trunk 0, or nine once it has been dropped.
    phone_pattern: pattern(r"^0?[1-9]\d{8}$"),
    regions: &[
        Region {
            name: "Auvergne-Rhône-Alpes",
            cities: &["Lyon", "Grenoble", "Saint-Étienne", "Annecy"],
        },
        Region {
            name: "Île-de-France",
            cities: &["Paris", "Boulogne-Billancourt", "Saint-Denis", "Versailles"],
        },
        Region {
            name: "Nouvelle-Aquitaine",
            cities: &["Bordeaux", "Limoges", "Poitiers", "La Rochelle"],
        },
        Region {
            name: "Occitanie",
            cities: &["Toulouse", "Montpellier", "Nîmes", "Perpignan"],
        },
        Region {
            name: "Provence-Alpes-Côte d'Azur",
            cities: &["Marseille", "Nice", "Toulon", "Avignon"],
        },
    ],
});

static ITALY: LazyLock<CountryProfile> = LazyLock::new(|| CountryProfile {
    code: CountryCode::IT,
    name: "Italia",
    dial_code: "39",
    trunk_prefix: None,
    phone_placeholder: "312 345 6789",
    // Mobile numbers start with 3; landlines keep their leading 0.
    phone_pattern: pattern(r"^(3\d{8,9}|0\d{5,10})$"),
    regions: &[
        Region {
            name: "Campania",
            cities: &["Napoli", "Salerno", "Caserta"],
        },
        Region {
            name: "Lazio",
            cities: &["Roma", "Latina", "Viterbo"],
        },
        Region {
            name: "Lombardia",
            cities: &["Milano", "Bergamo", "Brescia", "Monza"],
        },
        Region {
            name: "Piemonte",
            cities: &["Torino", "Novara", "Asti"],
        },
        Region {
            name: "Toscana",
            cities: &["Firenze", "Pisa", "Livorno", "Siena"],
        },
    ],
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_has_matching_profile() {
        for code in CountryCode::ALL {
            let profile = code.profile();
            assert_eq!(profile.code, code);
            assert!(!profile.regions.is_empty());
            assert!(profile.is_valid_phone(profile.phone_placeholder));
        }
    }

    #[test]
    fn test_every_region_has_cities() {
        for profile in profiles() {
            for region in profile.regions {
                assert!(!region.cities.is_empty(), "{} has no cities", region.name);
            }
        }
    }

    #[test]
    fn test_parse_country_code() {
        assert_eq!("pt".parse::<CountryCode>().unwrap(), CountryCode::PT);
        assert_eq!(" ES ".parse::<CountryCode>().unwrap(), CountryCode::ES);
        assert!("XX".parse::<CountryCode>().is_err());
    }

    #[test]
    fn test_portugal_phone() {
        let pt = CountryCode::PT.profile();
        assert!(pt.is_valid_phone("912345678"));
        assert!(pt.is_valid_phone("912 345 678"));
        assert!(pt.is_valid_phone("+351 912 345 678"));
        assert!(pt.is_valid_phone("00351912345678"));
        assert!(!pt.is_valid_phone("12345"));
        assert!(!pt.is_valid_phone("123"));
        assert!(!pt.is_valid_phone("812345678"));
        assert!(!pt.is_valid_phone("91234567a"));
        assert!(!pt.is_valid_phone(""));
    }

    #[test]
    fn test_national_number_strips_prefix() {
        let pt = CountryCode::PT.profile();
        assert_eq!(
            pt.national_number("+351 912-345-678").as_deref(),
            Some("912345678")
        );
        // Another country's prefix is not stripped.
        assert_eq!(pt.national_number("+34 612345678"), None);
    }

    #[test]
    fn test_other_country_phones() {
        assert!(CountryCode::ES.profile().is_valid_phone("612 345 678"));
        assert!(!CountryCode::ES.profile().is_valid_phone("512345678"));
        assert!(CountryCode::FR.profile().is_valid_phone("06 12 34 56 78"));
        assert!(CountryCode::FR.profile().is_valid_phone("+33 6 12 34 56 78"));
        assert!(CountryCode::IT.profile().is_valid_phone("3123456789"));
        assert!(!CountryCode::IT.profile().is_valid_phone("912345678"));
    }

    #[test]
    fn test_region_lookup() {
        let pt = CountryCode::PT.profile();
        assert!(pt.region("Lisboa").unwrap().has_city("Sintra"));
        assert!(pt.cities("Atlantis").is_empty());
        assert!(pt.region_names().any(|name| name == "Porto"));
    }
}
