//! Religious-text lookups: Quran (equran.id), Hadith editions (fawazahmed0
//! CDN), prayer times (aladhan) and a static tahlil reading list.

use gateway_core::UpstreamError;
use serde_json::{json, Value};

use crate::config::Settings;

async fn get_json(http: &reqwest::Client, url: &str) -> Result<Value, UpstreamError> {
    let response = http.get(url).send().await?.error_for_status()?;
    Ok(response.json().await?)
}

pub async fn all_surahs(http: &reqwest::Client, settings: &Settings) -> Result<Value, UpstreamError> {
    get_json(http, &format!("{}/surat", settings.quran_base_url)).await
}

pub async fn surah_detail(
    http: &reqwest::Client,
    settings: &Settings,
    nomor: u32,
) -> Result<Value, UpstreamError> {
    get_json(http, &format!("{}/surat/{nomor}", settings.quran_base_url)).await
}

pub async fn hadith_editions(
    http: &reqwest::Client,
    settings: &Settings,
) -> Result<Value, UpstreamError> {
    get_json(http, &format!("{}/editions.json", settings.hadith_base_url)).await
}

/// Sections of one edition, e.g. `eng-bukhari`. The CDN answers 404 for
/// unknown editions.
pub async fn hadith_sections(
    http: &reqwest::Client,
    settings: &Settings,
    book: &str,
) -> Result<Value, UpstreamError> {
    let url = format!("{}/editions/{book}/sections.json", settings.hadith_base_url);
    let response = http.get(&url).send().await?;
    if response.status().as_u16() == 404 {
        return Err(UpstreamError::rejected(
            404,
            "Book/Edition not found".to_string(),
        ));
    }
    let response = response.error_for_status()?;
    Ok(response.json().await?)
}

/// Muslim World League calculation (method 3), date format DD-MM-YYYY.
pub async fn prayer_times(
    http: &reqwest::Client,
    settings: &Settings,
    lat: f64,
    long: f64,
    date: Option<String>,
) -> Result<Value, UpstreamError> {
    let date = date.unwrap_or_else(|| chrono::Local::now().format("%d-%m-%Y").to_string());
    let url = format!("{}/timings/{date}", settings.prayer_base_url);
    let response = http
        .get(&url)
        .query(&[
            ("latitude", lat.to_string()),
            ("longitude", long.to_string()),
            ("method", "3".to_string()),
        ])
        .send()
        .await?
        .error_for_status()?;
    Ok(response.json().await?)
}

pub fn tahlil() -> Value {
    json!({
        "data": [
            {
                "id": 1,
                "title": "Pengantar Al-Fatihah",
                "arabic": "بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ",
                "translation": "Dengan menyebut nama Allah Yang Maha Pengasih lagi Maha Penyayang."
            },
            {
                "id": 2,
                "title": "Surat Al-Ikhlas",
                "arabic": "قُلْ هُوَ ٱللَّهُ أَحَدٌ",
                "translation": "Katakanlah: Dialah Allah, Yang Maha Esa."
            },
            {
                "id": 3,
                "title": "Surat Al-Falaq",
                "arabic": "قُلْ أَعُوذُ بِرَبِّ ٱلْفَلَقِ",
                "translation": "Katakanlah: Aku berlindung kepada Tuhan Yang Menguasai subuh."
            },
            {
                "id": 4,
                "title": "Surat An-Nas",
                "arabic": "قُلْ أَعُوذُ بِرَبِّ ٱلنَّاسِ",
                "translation": "Katakanlah: Aku berlindung kepada Tuhan (yang memelihara dan menguasai) manusia."
            }
        ]
    })
}
