//! Outbound service clients: Cloudinary image storage and the AI prediction service

pub mod ai;
pub mod cloudinary;

pub use ai::{AiClient, AiClientError, DEFAULT_AI_SERVICE_URL};
pub use cloudinary::{
    CloudinaryClient, CloudinaryConfig, CloudinaryError, ImagePage, UploadedImage,
    DEFAULT_FOLDER, UPLOAD_TRANSFORMATION,
};
