use crate::utils::error::{FlowError, Result};
use url::Url;

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(FlowError::Config {
            message: format!("{}: URL cannot be empty", field_name),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(FlowError::Config {
                message: format!("{}: unsupported URL scheme '{}'", field_name, scheme),
            }),
        },
        Err(e) => Err(FlowError::Config {
            message: format!("{}: invalid URL '{}': {}", field_name, url_str, e),
        }),
    }
}
