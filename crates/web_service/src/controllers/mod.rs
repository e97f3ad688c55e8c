pub mod bmkg_controller;
pub mod converter_controller;
pub mod copilot_controller;
pub mod downloader_controller;
pub mod gemini_controller;
pub mod image_controller;
pub mod islamic_controller;
pub mod meta_controller;
pub mod ocr_controller;
pub mod utils_controller;
