use super::error::CoachError;

/// Map a non-success response to [`CoachError::Api`], keeping the body as
/// the message.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, CoachError> {
    if !resp.status().is_success() {
        return Err(CoachError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}
