use serde::{Deserialize, Serialize};

/// 上游接口的统一响应信封
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i32,
    pub status: String,
    pub data: T,
}

/// 单日礼拜时间数据（timings / timingsByCity / calendar 的元素）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingsData {
    pub timings: Timings,
    pub date: DateInfo,
    pub meta: UpstreamMeta,
}

/// 上游返回的时间表，只建模固定的六个时间点，其余键忽略
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timings {
    #[serde(rename = "Fajr")]
    pub fajr: String,
    #[serde(rename = "Sunrise")]
    pub sunrise: String,
    #[serde(rename = "Dhuhr")]
    pub dhuhr: String,
    #[serde(rename = "Asr")]
    pub asr: String,
    #[serde(rename = "Maghrib")]
    pub maghrib: String,
    #[serde(rename = "Isha")]
    pub isha: String,
}

impl Timings {
    /// 去掉上游偶尔附带的时区后缀，如 "04:39 (BST)" -> "04:39"
    pub fn normalized(&self) -> Timings {
        fn clean(value: &str) -> String {
            match value.split_once(' ') {
                Some((time, _)) => time.to_string(),
                None => value.to_string(),
            }
        }
        Timings {
            fajr: clean(&self.fajr),
            sunrise: clean(&self.sunrise),
            dhuhr: clean(&self.dhuhr),
            asr: clean(&self.asr),
            maghrib: clean(&self.maghrib),
            isha: clean(&self.isha),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateInfo {
    pub readable: String,
    pub gregorian: GregorianDate,
    pub hijri: HijriDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GregorianDate {
    pub date: String,
    pub format: String,
    pub day: String,
    pub month: MonthInfo,
    pub year: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HijriDate {
    pub date: String,
    pub format: String,
    pub day: String,
    pub month: MonthInfo,
    pub year: String,
    #[serde(default)]
    pub holidays: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthInfo {
    pub number: u8,
    pub en: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamMeta {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub method: MethodInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodInfo {
    pub id: u8,
    pub name: String,
}

/// gToH 转换结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionData {
    pub hijri: HijriDate,
    pub gregorian: GregorianDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMINGS_FIXTURE: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "04:12",
                "Sunrise": "05:46",
                "Dhuhr": "12:24",
                "Asr": "15:55",
                "Sunset": "19:01",
                "Maghrib": "19:01",
                "Isha": "20:30",
                "Imsak": "04:02",
                "Midnight": "00:24"
            },
            "date": {
                "readable": "24 Apr 2024",
                "timestamp": "1713942000",
                "gregorian": {
                    "date": "24-04-2024",
                    "format": "DD-MM-YYYY",
                    "day": "24",
                    "weekday": { "en": "Wednesday" },
                    "month": { "number": 4, "en": "April" },
                    "year": "2024"
                },
                "hijri": {
                    "date": "15-10-1445",
                    "format": "DD-MM-YYYY",
                    "day": "15",
                    "weekday": { "en": "Al Arba'a", "ar": "الاربعاء" },
                    "month": { "number": 10, "en": "Shawwāl", "ar": "شَوّال" },
                    "year": "1445",
                    "holidays": []
                }
            },
            "meta": {
                "latitude": 51.5194682,
                "longitude": -0.1360365,
                "timezone": "Europe/London",
                "method": { "id": 2, "name": "Islamic Society of North America (ISNA)" },
                "school": "STANDARD"
            }
        }
    }"#;

    #[test]
    fn timings_envelope_decodes_and_ignores_extra_keys() {
        let envelope: Envelope<TimingsData> = serde_json::from_str(TIMINGS_FIXTURE).unwrap();
        assert_eq!(envelope.code, 200);
        assert_eq!(envelope.status, "OK");

        let data = envelope.data;
        assert_eq!(data.timings.fajr, "04:12");
        assert_eq!(data.timings.isha, "20:30");
        assert_eq!(data.date.hijri.date, "15-10-1445");
        assert_eq!(data.date.hijri.month.number, 10);
        assert_eq!(data.meta.timezone, "Europe/London");
        assert_eq!(data.meta.method.id, 2);
    }

    #[test]
    fn error_envelope_decodes_with_string_data() {
        let raw = r#"{ "code": 400, "status": "BAD_REQUEST", "data": "Invalid date format" }"#;
        let envelope: Envelope<serde_json::Value> = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.code, 400);
        assert!(envelope.data.is_string());
    }

    #[test]
    fn conversion_data_decodes() {
        let raw = r#"{
            "code": 200,
            "status": "OK",
            "data": {
                "hijri": {
                    "date": "19-06-1446",
                    "format": "DD-MM-YYYY",
                    "day": "19",
                    "month": { "number": 6, "en": "Jumādá al-ākhirah", "ar": "جُمادى الآخرة" },
                    "year": "1446",
                    "holidays": []
                },
                "gregorian": {
                    "date": "20-12-2024",
                    "format": "DD-MM-YYYY",
                    "day": "20",
                    "month": { "number": 12, "en": "December" },
                    "year": "2024"
                }
            }
        }"#;
        let envelope: Envelope<ConversionData> = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.data.hijri.year, "1446");
        assert_eq!(envelope.data.gregorian.month.number, 12);
    }

    #[test]
    fn normalized_strips_timezone_suffix() {
        let timings = Timings {
            fajr: "04:39 (BST)".into(),
            sunrise: "05:46".into(),
            dhuhr: "12:24 (BST)".into(),
            asr: "15:55".into(),
            maghrib: "19:01".into(),
            isha: "20:30 (BST)".into(),
        };
        let clean = timings.normalized();
        assert_eq!(clean.fajr, "04:39");
        assert_eq!(clean.dhuhr, "12:24");
        assert_eq!(clean.isha, "20:30");
        assert_eq!(clean.sunrise, "05:46");
    }
}
