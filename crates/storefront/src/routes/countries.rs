//! Country reference routes for the shipping form.

use axum::Json;
use axum::extract::Path;
use glyca_core::country::profiles;
use glyca_core::{CountryCode, CountryProfile};
use serde::Serialize;

use crate::error::{AppError, Result};

/// Entry in the country picker.
#[derive(Debug, Serialize)]
pub struct CountrySummary {
    pub code: CountryCode,
    pub name: &'static str,
    pub dial_code: &'static str,
}

/// Everything the shipping form needs for one country.
#[derive(Debug, Serialize)]
pub struct CountryView {
    pub code: CountryCode,
    pub name: &'static str,
    pub dial_code: &'static str,
    pub phone_placeholder: &'static str,
    pub phone_pattern: &'static str,
    pub regions: Vec<RegionView>,
}

#[derive(Debug, Serialize)]
pub struct RegionView {
    pub name: &'static str,
    pub cities: &'static [&'static str],
}

impl From<&'static CountryProfile> for CountryView {
    fn from(profile: &'static CountryProfile) -> Self {
        Self {
            code: profile.code,
            name: profile.name,
            dial_code: profile.dial_code,
            phone_placeholder: profile.phone_placeholder,
            phone_pattern: profile.phone_pattern.as_str(),
            regions: profile
                .regions
                .iter()
                .map(|region| RegionView {
                    name: region.name,
                    cities: region.cities,
                })
                .collect(),
        }
    }
}

/// `GET /api/countries`
pub async fn index() -> Json<Vec<CountrySummary>> {
    Json(
        profiles()
            .map(|profile| CountrySummary {
                code: profile.code,
                name: profile.name,
                dial_code: profile.dial_code,
            })
            .collect(),
    )
}

/// `GET /api/countries/{code}`
pub async fn show(Path(code): Path<String>) -> Result<Json<CountryView>> {
    let code: CountryCode = code
        .parse()
        .map_err(|_| AppError::NotFound(format!("country {code}")))?;
    Ok(Json(CountryView::from(code.profile())))
}
