use serde::Serialize;

use crate::cache::CachedConversion;
use crate::routes::timings::model::Source;

#[derive(Debug, Serialize)]
pub struct ConversionResponse {
    pub gregorian_date: String,
    pub hijri_date: String,
    pub hijri_month: String,
    pub hijri_year: String,
    pub holidays: Vec<String>,
    pub source: Source,
}

impl ConversionResponse {
    pub fn from_cached(cached: CachedConversion, source: Source) -> Self {
        ConversionResponse {
            gregorian_date: cached.gregorian_date,
            hijri_date: cached.hijri_date,
            hijri_month: cached.hijri_month,
            hijri_year: cached.hijri_year,
            holidays: cached.holidays,
            source,
        }
    }
}
