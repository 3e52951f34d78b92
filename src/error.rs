#[derive(Debug, thiserror::Error)]
pub enum HunterError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Unexpected HTTP status {status} from {url}")]
    StatusError { url: String, status: u16 },
    #[error("Invalid price number: {0}")]
    PriceError(#[from] std::num::ParseIntError),
    #[error("IO error")]
    IoError(#[from] std::io::Error),
}
