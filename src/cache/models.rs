use serde::{Deserialize, Serialize};

use crate::upstream::models::{ConversionData, TimingsData};

/// 礼拜时间记录：固定的六个时间点，加上公历/回历日期和计算方法
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrayerTimesRecord {
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
    pub gregorian_date: String,
    pub hijri_date: String,
    pub hijri_month: String,
    pub readable: String,
    pub method: u8,
}

impl From<&TimingsData> for PrayerTimesRecord {
    fn from(data: &TimingsData) -> Self {
        let timings = data.timings.normalized();
        PrayerTimesRecord {
            fajr: timings.fajr,
            sunrise: timings.sunrise,
            dhuhr: timings.dhuhr,
            asr: timings.asr,
            maghrib: timings.maghrib,
            isha: timings.isha,
            gregorian_date: data.date.gregorian.date.clone(),
            hijri_date: data.date.hijri.date.clone(),
            hijri_month: data.date.hijri.month.en.clone(),
            readable: data.date.readable.clone(),
            method: data.meta.method.id,
        }
    }
}

/// 缓存的礼拜时间条目
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CachedTimings {
    pub record: PrayerTimesRecord,
    pub cached_at: i64,  // Unix timestamp
    pub expires_at: i64, // 当地日期结束时刻
}

/// 缓存的公历转回历结果
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CachedConversion {
    pub gregorian_date: String,
    pub hijri_date: String,
    pub hijri_month: String,
    pub hijri_year: String,
    pub holidays: Vec<String>,
    pub cached_at: i64,
}

impl CachedConversion {
    pub fn from_conversion(data: &ConversionData, cached_at: i64) -> Self {
        CachedConversion {
            gregorian_date: data.gregorian.date.clone(),
            hijri_date: data.hijri.date.clone(),
            hijri_month: data.hijri.month.en.clone(),
            hijri_year: data.hijri.year.clone(),
            holidays: data.hijri.holidays.clone(),
            cached_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timings_data() -> TimingsData {
        serde_json::from_str(
            r#"{
                "timings": {
                    "Fajr": "04:12 (BST)",
                    "Sunrise": "05:46",
                    "Dhuhr": "12:24",
                    "Asr": "15:55",
                    "Maghrib": "19:01",
                    "Isha": "20:30 (BST)"
                },
                "date": {
                    "readable": "24 Apr 2024",
                    "gregorian": {
                        "date": "24-04-2024",
                        "format": "DD-MM-YYYY",
                        "day": "24",
                        "month": { "number": 4, "en": "April" },
                        "year": "2024"
                    },
                    "hijri": {
                        "date": "15-10-1445",
                        "format": "DD-MM-YYYY",
                        "day": "15",
                        "month": { "number": 10, "en": "Shawwāl", "ar": "شَوّال" },
                        "year": "1445",
                        "holidays": []
                    }
                },
                "meta": {
                    "latitude": 51.5,
                    "longitude": -0.13,
                    "timezone": "Europe/London",
                    "method": { "id": 3, "name": "Muslim World League" }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn record_maps_fixed_prayer_set_and_dates() {
        let record = PrayerTimesRecord::from(&timings_data());
        assert_eq!(record.fajr, "04:12");
        assert_eq!(record.sunrise, "05:46");
        assert_eq!(record.isha, "20:30");
        assert_eq!(record.gregorian_date, "24-04-2024");
        assert_eq!(record.hijri_date, "15-10-1445");
        assert_eq!(record.hijri_month, "Shawwāl");
        assert_eq!(record.method, 3);
    }

    #[test]
    fn cached_entry_roundtrips_through_json() {
        let record = PrayerTimesRecord::from(&timings_data());
        let entry = CachedTimings {
            record: record.clone(),
            cached_at: 1713942000,
            expires_at: 1713999600,
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: CachedTimings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.record, record);
        assert_eq!(back.expires_at, 1713999600);
    }
}
