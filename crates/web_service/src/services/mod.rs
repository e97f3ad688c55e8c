pub mod bmkg_service;
pub mod converter_service;
pub mod image_service;
pub mod islamic_service;
pub mod ocr_service;
pub mod ytdlp_service;
